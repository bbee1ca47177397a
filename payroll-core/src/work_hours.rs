// src/work_hours.rs
use rust_decimal::Decimal;

use crate::period::YearMonth;
use crate::snapshot::Employee;

/// Hours recorded by `employee` in `month`; 0 when the month has no record.
pub fn monthly_hours(employee: &Employee, month: YearMonth) -> Decimal {
    employee
        .work_records
        .get(&month.to_string())
        .map(|days| {
            days.values()
                .fold(Decimal::ZERO, |total, hours| total.saturating_add(*hours))
        })
        .unwrap_or(Decimal::ZERO)
}
