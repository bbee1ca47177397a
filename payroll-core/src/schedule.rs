// src/schedule.rs
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::config::PayrollConfig;
use crate::period::format_date;
use crate::snapshot::{DaySchedule, Employee};

/// Shift shown for an employee who has nothing stored for the date, and
/// whether that shift counts toward the fleet total.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftDefaults {
    pub shift: DaySchedule,
    pub count_toward_total: bool,
}

impl Default for ShiftDefaults {
    fn default() -> Self {
        Self::from(&PayrollConfig::default())
    }
}

impl From<&PayrollConfig> for ShiftDefaults {
    fn from(config: &PayrollConfig) -> Self {
        Self {
            shift: DaySchedule::new(&config.default_shift_start, &config.default_shift_end),
            count_toward_total: config.count_default_shift,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub schedule: DaySchedule,
    pub hours: Decimal,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyScheduleReport {
    pub date: NaiveDate,
    pub employees: Vec<ScheduleRow>,
    pub total_hours: Decimal,
    pub average_hours: Decimal,
    pub employee_count: usize,
}

/// Total and per-employee average of a day's shift lengths. The average over
/// no employees is 0.
pub fn daily_fleet_hours(hours: &[Decimal]) -> (Decimal, Decimal) {
    let total = hours
        .iter()
        .fold(Decimal::ZERO, |total, h| total.saturating_add(*h));
    let average = total
        .checked_div(Decimal::from(hours.len()))
        .unwrap_or(Decimal::ZERO);
    (total, average)
}

pub fn schedule_for(employee: &Employee, date: NaiveDate) -> Option<&DaySchedule> {
    employee.schedules.get(&format_date(date))
}

pub fn daily_schedule_report(
    employees: &[Employee],
    date: NaiveDate,
    defaults: &ShiftDefaults,
) -> DailyScheduleReport {
    let rows: Vec<ScheduleRow> = employees
        .iter()
        .map(|employee| {
            let (schedule, is_default) = match schedule_for(employee, date) {
                Some(stored) => (stored.clone(), false),
                None => (defaults.shift.clone(), true),
            };
            ScheduleRow {
                id: employee.id.clone(),
                name: employee.name.clone(),
                hours: schedule.hours(),
                schedule,
                is_default,
            }
        })
        .collect();

    let counted: Vec<Decimal> = rows
        .iter()
        .map(|row| {
            if row.is_default && !defaults.count_toward_total {
                Decimal::ZERO
            } else {
                row.hours
            }
        })
        .collect();
    let (total_hours, average_hours) = daily_fleet_hours(&counted);

    debug!(
        "Computed schedule for {}: {} employees, {} hours",
        date,
        rows.len(),
        total_hours
    );
    DailyScheduleReport {
        date,
        employee_count: rows.len(),
        employees: rows,
        total_hours,
        average_hours,
    }
}

#[cfg(test)]
mod schedule_tests {
    use super::*;
    use crate::snapshot::employees_from_snapshot;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    fn fleet() -> Vec<Employee> {
        employees_from_snapshot(&json!({
            "e1": {
                "name": "Early",
                "monthlySalary": 20000,
                "schedules": { "2024-03-15": { "startTime": "08:00", "endTime": "16:30" } }
            },
            "e2": {
                "name": "Backwards",
                "monthlySalary": 20000,
                "schedules": { "2024-03-15": { "startTime": "18:00", "endTime": "09:00" } }
            },
            "e3": { "name": "Unscheduled", "monthlySalary": 20000 }
        }))
    }

    #[test]
    fn daily_fleet_hours_sums_and_averages() {
        let (total, average) = daily_fleet_hours(&[dec!(9), dec!(8), dec!(7)]);
        assert_eq!(total, dec!(24));
        assert_eq!(average, dec!(8));
    }

    #[test]
    fn daily_fleet_hours_of_nobody_is_zero() {
        assert_eq!(daily_fleet_hours(&[]), (Decimal::ZERO, Decimal::ZERO));
    }

    #[test]
    fn missing_shift_counts_as_default_shift() {
        let report = daily_schedule_report(&fleet(), d("2024-03-15"), &ShiftDefaults::default());

        assert_eq!(report.employee_count, 3);
        assert_eq!(report.employees[0].hours, dec!(8.5));
        assert!(!report.employees[0].is_default);
        assert_eq!(report.employees[1].hours, Decimal::ZERO);

        let unscheduled = &report.employees[2];
        assert!(unscheduled.is_default);
        assert_eq!(unscheduled.schedule, DaySchedule::new("09:00", "18:00"));
        assert_eq!(unscheduled.hours, dec!(9));

        assert_eq!(report.total_hours, dec!(17.5));
        assert_eq!(report.average_hours, dec!(17.5) / dec!(3));
    }

    #[test]
    fn default_shift_left_out_when_switched_off() {
        let defaults = ShiftDefaults {
            count_toward_total: false,
            ..ShiftDefaults::default()
        };
        let report = daily_schedule_report(&fleet(), d("2024-03-15"), &defaults);
        assert!(report.employees[2].is_default);
        assert_eq!(report.employees[2].hours, dec!(9));
        assert_eq!(report.total_hours, dec!(8.5));
        assert_eq!(report.average_hours, dec!(8.5) / dec!(3));
    }

    #[test]
    fn unscheduled_fleet_gets_default_hours() {
        let unscheduled = employees_from_snapshot(&json!({
            "a": { "name": "A", "monthlySalary": 1000 },
            "b": { "name": "B", "monthlySalary": 1000 }
        }));
        let report = daily_schedule_report(
            &unscheduled,
            d("2024-03-15"),
            &ShiftDefaults::from(&PayrollConfig::default()),
        );
        assert!(report
            .employees
            .iter()
            .all(|row| row.is_default && row.hours == dec!(9)));
        assert_eq!(report.total_hours, dec!(18));
        assert_eq!(report.average_hours, dec!(9));
    }

    #[test]
    fn other_dates_fall_back_for_everyone() {
        let report = daily_schedule_report(&fleet(), d("2024-03-16"), &ShiftDefaults::default());
        assert!(report.employees.iter().all(|row| row.is_default));
        assert_eq!(report.total_hours, dec!(27));
        assert_eq!(report.average_hours, dec!(9));
    }

    #[test]
    fn empty_fleet_report() {
        let report = daily_schedule_report(&[], d("2024-03-15"), &ShiftDefaults::default());
        assert_eq!(report.employee_count, 0);
        assert_eq!(report.total_hours, Decimal::ZERO);
        assert_eq!(report.average_hours, Decimal::ZERO);
    }
}
