// src/payroll.rs
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::debug;

use crate::config::{PayrollConfig, DEFAULT_STANDARD_MONTHLY_HOURS, DEFAULT_WORKDAY_HOURS};
use crate::period::YearMonth;
use crate::snapshot::Employee;
use crate::work_hours::monthly_hours;

// --- Payroll Structures ---

/// The two hour baselines behind the calculator figures. Salary and
/// efficiency pro-rate against `standard_monthly_hours`; the working-days
/// statistic divides by `workday_hours` alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baselines {
    pub standard_monthly_hours: Decimal,
    pub workday_hours: Decimal,
}

impl Default for Baselines {
    fn default() -> Self {
        Self {
            standard_monthly_hours: DEFAULT_STANDARD_MONTHLY_HOURS,
            workday_hours: DEFAULT_WORKDAY_HOURS,
        }
    }
}

impl From<&PayrollConfig> for Baselines {
    fn from(config: &PayrollConfig) -> Self {
        Self {
            standard_monthly_hours: config.standard_monthly_hours,
            workday_hours: config.workday_hours,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayMetrics {
    pub calculated_salary: Decimal,
    pub hourly_rate: Decimal,
    pub working_days: u32,
    pub efficiency: Decimal, // percent of standard monthly hours
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayroll {
    pub id: String,
    pub name: String,
    pub monthly_salary: Decimal,
    pub total_hours: Decimal,
    #[serde(flatten)]
    pub metrics: PayMetrics,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    pub total_calculated_salary: Decimal,
    pub total_hours: Decimal,
    pub average_efficiency: Decimal,
    pub employee_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub month: YearMonth,
    pub employees: Vec<EmployeePayroll>,
    pub summary: FleetSummary,
}

// --- Calculations ---

/// `numerator / denominator`, or 0 when the division is undefined.
fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// `a * b / c` with the multiplication first, so 250h of a 22000 salary over
/// 220h comes out as exactly 25000.
fn scaled(a: Decimal, b: Decimal, c: Decimal) -> Decimal {
    a.checked_mul(b)
        .map(|product| ratio(product, c))
        .unwrap_or(Decimal::ZERO)
}

pub fn pay_metrics(employee: &Employee, total_hours: Decimal, baselines: &Baselines) -> PayMetrics {
    let standard = baselines.standard_monthly_hours;
    let salary = employee.monthly_salary;

    let working_days = ratio(total_hours, baselines.workday_hours)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0);

    let efficiency = if total_hours > Decimal::ZERO {
        scaled(total_hours, dec!(100), standard)
    } else {
        Decimal::ZERO
    };

    PayMetrics {
        calculated_salary: scaled(total_hours, salary, standard),
        hourly_rate: ratio(salary, standard),
        working_days,
        efficiency,
    }
}

pub fn employee_payroll(
    employee: &Employee,
    month: YearMonth,
    baselines: &Baselines,
) -> EmployeePayroll {
    let total_hours = monthly_hours(employee, month);
    EmployeePayroll {
        id: employee.id.clone(),
        name: employee.name.clone(),
        monthly_salary: employee.monthly_salary,
        total_hours,
        metrics: pay_metrics(employee, total_hours, baselines),
    }
}

pub fn fleet_summary(rows: &[EmployeePayroll]) -> FleetSummary {
    let total_calculated_salary = rows.iter().fold(Decimal::ZERO, |total, row| {
        total.saturating_add(row.metrics.calculated_salary)
    });
    let total_hours = rows
        .iter()
        .fold(Decimal::ZERO, |total, row| total.saturating_add(row.total_hours));
    let efficiency_sum = rows
        .iter()
        .fold(Decimal::ZERO, |total, row| total.saturating_add(row.metrics.efficiency));

    FleetSummary {
        total_calculated_salary,
        total_hours,
        average_efficiency: ratio(efficiency_sum, Decimal::from(rows.len())),
        employee_count: rows.len(),
    }
}

/// Per-employee payroll for `month` plus the fleet summary, in snapshot order.
pub fn monthly_report(employees: &[Employee], month: YearMonth, baselines: &Baselines) -> MonthlyReport {
    let rows: Vec<EmployeePayroll> = employees
        .iter()
        .map(|employee| employee_payroll(employee, month, baselines))
        .collect();
    let summary = fleet_summary(&rows);
    debug!(
        "Computed payroll for {}: {} employees, {} hours, {} calculated salary",
        month, summary.employee_count, summary.total_hours, summary.total_calculated_salary
    );
    MonthlyReport {
        month,
        employees: rows,
        summary,
    }
}
