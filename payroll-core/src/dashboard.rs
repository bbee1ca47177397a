// src/dashboard.rs
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::config::PayrollConfig;
use crate::snapshot::Employee;

const MONTHS_PER_YEAR: Decimal = dec!(12);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEarner {
    pub id: String,
    pub name: String,
    pub monthly_salary: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub employee_count: usize,
    pub total_monthly_salary: Decimal,
    pub average_salary: Decimal,
    pub total_yearly_salary: Decimal,
    pub total_daily_salary: Decimal,
    pub top_earners: Vec<TopEarner>,
}

/// Rates shown next to each employee in the management list. These use the
/// 22 working-day month and the employee's own daily hours, not the
/// calculator's 220-hour baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementRates {
    pub daily_salary: Decimal,
    pub hourly_rate: Decimal,
}

pub fn management_rates(employee: &Employee, config: &PayrollConfig) -> ManagementRates {
    let daily_salary = employee
        .monthly_salary
        .checked_div(config.management_working_days)
        .unwrap_or(Decimal::ZERO);
    let daily_hours = employee.daily_hours.unwrap_or(config.default_daily_hours);
    ManagementRates {
        daily_salary,
        hourly_rate: daily_salary.checked_div(daily_hours).unwrap_or(Decimal::ZERO),
    }
}

pub fn dashboard_overview(employees: &[Employee], config: &PayrollConfig) -> DashboardOverview {
    let total_monthly_salary = employees
        .iter()
        .fold(Decimal::ZERO, |total, e| total.saturating_add(e.monthly_salary));

    let average_salary = total_monthly_salary
        .checked_div(Decimal::from(employees.len()))
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    let total_daily_salary = employees.iter().fold(Decimal::ZERO, |total, e| {
        let daily = e
            .monthly_salary
            .checked_div(config.dashboard_days_per_month)
            .unwrap_or(Decimal::ZERO);
        total.saturating_add(daily)
    });

    // Stable sort keeps snapshot order among equal salaries.
    let mut by_salary: Vec<&Employee> = employees.iter().collect();
    by_salary.sort_by(|a, b| b.monthly_salary.cmp(&a.monthly_salary));
    let top_earners = by_salary
        .into_iter()
        .take(config.top_earners)
        .map(|e| TopEarner {
            id: e.id.clone(),
            name: e.name.clone(),
            monthly_salary: e.monthly_salary,
        })
        .collect();

    DashboardOverview {
        employee_count: employees.len(),
        total_monthly_salary,
        average_salary,
        total_yearly_salary: total_monthly_salary.saturating_mul(MONTHS_PER_YEAR),
        total_daily_salary,
        top_earners,
    }
}
