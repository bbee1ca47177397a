// src/payroll_tests.rs

#[cfg(test)]
mod tests {
    use crate::payroll::*;
    use crate::period::YearMonth;
    use crate::snapshot::{employees_from_snapshot, Employee};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;

    // Helper to build an employee with a single month of hours
    fn create_test_employee(id: &str, salary: Decimal, month: &str, days: &[f64]) -> Employee {
        let mut employee = Employee {
            id: id.to_string(),
            name: format!("Employee {}", id),
            monthly_salary: salary,
            ..Default::default()
        };
        let record = days
            .iter()
            .enumerate()
            .map(|(i, h)| ((i + 1).to_string(), Decimal::try_from(*h).unwrap()))
            .collect();
        employee.work_records.insert(month.to_string(), record);
        employee
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_half_of_standard_hours_earns_half_salary() {
        let employee = create_test_employee("1", dec!(22000), "2024-03", &[]);
        let metrics = pay_metrics(&employee, dec!(110), &Baselines::default());

        assert_eq!(metrics.calculated_salary, dec!(11000.0));
        assert_eq!(metrics.hourly_rate, dec!(100.0));
        assert_eq!(metrics.efficiency, dec!(50.0));
        assert_eq!(metrics.working_days, 14); // 110 / 8 = 13.75
    }

    #[test]
    fn test_overtime_is_paid_proportionally_without_cap() {
        let employee = create_test_employee("1", dec!(22000), "2024-03", &[]);
        let metrics = pay_metrics(&employee, dec!(250), &Baselines::default());

        assert_eq!(metrics.working_days, 31);
        assert_eq!(metrics.calculated_salary, dec!(250) * dec!(22000) / dec!(220));
        assert!(metrics.calculated_salary > employee.monthly_salary);
        assert!(metrics.efficiency > dec!(100));
    }

    #[test]
    fn test_working_days_rounds_half_up() {
        let employee = create_test_employee("1", dec!(10000), "2024-03", &[]);
        let baselines = Baselines::default();
        assert_eq!(pay_metrics(&employee, dec!(4), &baselines).working_days, 1); // 0.5
        assert_eq!(pay_metrics(&employee, dec!(20), &baselines).working_days, 3); // 2.5
        assert_eq!(pay_metrics(&employee, dec!(3.9), &baselines).working_days, 0);
    }

    #[test]
    fn test_working_days_ignores_salary_baseline() {
        let employee = create_test_employee("1", dec!(10000), "2024-03", &[]);
        let baselines = Baselines {
            standard_monthly_hours: dec!(160),
            workday_hours: dec!(8),
        };
        assert_eq!(pay_metrics(&employee, dec!(250), &baselines).working_days, 31);
    }

    #[test]
    fn test_zero_hours_gives_zero_salary_and_efficiency() {
        let employee = create_test_employee("1", dec!(22000), "2024-03", &[]);
        let metrics = pay_metrics(&employee, Decimal::ZERO, &Baselines::default());

        assert_eq!(metrics.calculated_salary, Decimal::ZERO);
        assert_eq!(metrics.efficiency, Decimal::ZERO);
        assert_eq!(metrics.working_days, 0);
        assert_eq!(metrics.hourly_rate, dec!(100));
    }

    #[test]
    fn test_zero_baselines_degrade_to_zero() {
        let employee = create_test_employee("1", dec!(22000), "2024-03", &[]);
        let baselines = Baselines {
            standard_monthly_hours: Decimal::ZERO,
            workday_hours: Decimal::ZERO,
        };
        let metrics = pay_metrics(&employee, dec!(100), &baselines);

        assert_eq!(metrics.calculated_salary, Decimal::ZERO);
        assert_eq!(metrics.hourly_rate, Decimal::ZERO);
        assert_eq!(metrics.efficiency, Decimal::ZERO);
        assert_eq!(metrics.working_days, 0);
    }

    #[test]
    fn test_employee_without_month_record_has_zero_metrics() {
        let employee = create_test_employee("1", dec!(30000), "2024-02", &[8.0, 8.0]);
        let row = employee_payroll(&employee, ym("2024-03"), &Baselines::default());

        assert_eq!(row.total_hours, Decimal::ZERO);
        assert_eq!(row.metrics.calculated_salary, Decimal::ZERO);
        assert_eq!(row.metrics.efficiency, Decimal::ZERO);
    }

    #[test]
    fn test_fleet_average_efficiency() {
        let a = create_test_employee("a", dec!(22000), "2024-03", &[]);
        let b = create_test_employee("b", dec!(22000), "2024-03", &[]);
        let baselines = Baselines::default();
        let rows = vec![
            EmployeePayroll {
                id: a.id.clone(),
                name: a.name.clone(),
                monthly_salary: a.monthly_salary,
                total_hours: dec!(110),
                metrics: pay_metrics(&a, dec!(110), &baselines),
            },
            EmployeePayroll {
                id: b.id.clone(),
                name: b.name.clone(),
                monthly_salary: b.monthly_salary,
                total_hours: dec!(220),
                metrics: pay_metrics(&b, dec!(220), &baselines),
            },
        ];

        let summary = fleet_summary(&rows);
        assert_eq!(summary.average_efficiency, dec!(75.0));
        assert_eq!(summary.total_hours, dec!(330));
        assert_eq!(summary.total_calculated_salary, dec!(33000));
        assert_eq!(summary.employee_count, 2);
    }

    #[test]
    fn test_empty_fleet_summary_is_all_zero() {
        let summary = fleet_summary(&[]);
        assert_eq!(summary, FleetSummary::default());
        assert_eq!(summary.average_efficiency, Decimal::ZERO);
    }

    #[test]
    fn test_monthly_report_from_snapshot() {
        let snapshot = json!({
            "e1": {
                "name": "Ayşe",
                "monthlySalary": 22000,
                "workRecords": { "2024-03": { "1": 50, "2": 60 }, "2024-02": { "1": 8 } }
            },
            "e2": { "name": "Mehmet", "monthlySalary": 44000 },
            "junk": 17
        });
        let employees = employees_from_snapshot(&snapshot);
        let report = monthly_report(&employees, ym("2024-03"), &Baselines::default());

        assert_eq!(report.month, ym("2024-03"));
        assert_eq!(report.employees.len(), 2);
        assert_eq!(report.employees[0].name, "Ayşe");
        assert_eq!(report.employees[0].total_hours, dec!(110));
        assert_eq!(report.employees[0].metrics.calculated_salary, dec!(11000));
        assert_eq!(report.employees[1].total_hours, Decimal::ZERO);
        assert_eq!(report.employees[1].metrics.hourly_rate, dec!(200));

        assert_eq!(report.summary.employee_count, 2);
        assert_eq!(report.summary.total_hours, dec!(110));
        assert_eq!(report.summary.total_calculated_salary, dec!(11000));
        assert_eq!(report.summary.average_efficiency, dec!(25));
    }

    #[test]
    fn test_monthly_report_is_stable_across_calls() {
        let employees = vec![create_test_employee("1", dec!(22000), "2024-03", &[8.0, 7.5])];
        let first = monthly_report(&employees, ym("2024-03"), &Baselines::default());
        let second = monthly_report(&employees, ym("2024-03"), &Baselines::default());
        assert_eq!(first, second);
        assert_eq!(first.summary.total_hours, dec!(15.5));
    }

    #[test]
    fn test_report_serializes_flat_camel_case_rows() {
        let employees = vec![create_test_employee("1", dec!(22000), "2024-03", &[110.0])];
        let report = monthly_report(&employees, ym("2024-03"), &Baselines::default());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["month"], "2024-03");
        let row = &value["employees"][0];
        assert!(row.get("calculatedSalary").is_some());
        assert!(row.get("workingDays").is_some());
        assert!(row.get("metrics").is_none());
        assert_eq!(value["summary"]["employeeCount"], 1);
    }
}
