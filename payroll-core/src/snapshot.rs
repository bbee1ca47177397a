// src/snapshot.rs
use rust_decimal::prelude::*;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::duration::shift_hours;

type EmployeeId = String;
type MonthKey = String; // "YYYY-MM"
type DayKey = String;
type DateKey = String; // "YYYY-MM-DD"

// --- Employee Entities ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub start_time: String,
    pub end_time: String,
}

impl DaySchedule {
    pub fn new(start_time: &str, end_time: &str) -> Self {
        Self {
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }

    pub fn hours(&self) -> Decimal {
        shift_hours(&self.start_time, &self.end_time)
    }
}

/// One employee as read from a store snapshot. Never written back.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub monthly_salary: Decimal,
    pub daily_hours: Option<Decimal>,
    pub work_records: BTreeMap<MonthKey, BTreeMap<DayKey, Decimal>>,
    pub schedules: BTreeMap<DateKey, DaySchedule>,
}

// --- Snapshot Adapter ---

/// Normalizes a raw `{ employeeId: { ... } }` snapshot into employees, in the
/// order the snapshot lists them.
///
/// A null or non-object root is an empty fleet. Entries whose value is not an
/// object are skipped; bad fields inside a valid entry fall back to defaults.
pub fn employees_from_snapshot(snapshot: &Value) -> Vec<Employee> {
    let entries = match snapshot {
        Value::Object(entries) => entries,
        Value::Null => return Vec::new(),
        other => {
            warn!(
                "Snapshot root is a {} rather than an object; treating it as empty.",
                json_kind(other)
            );
            return Vec::new();
        }
    };

    let employees: Vec<Employee> = entries
        .iter()
        .filter_map(|(id, attrs)| match attrs {
            Value::Object(attrs) => Some(employee_from_attrs(id, attrs)),
            other => {
                warn!(
                    "Skipping malformed snapshot entry '{}': expected object, got {}",
                    id,
                    json_kind(other)
                );
                None
            }
        })
        .collect();

    debug!(
        "Adapted snapshot: {} entries, {} employees",
        entries.len(),
        employees.len()
    );
    employees
}

fn employee_from_attrs(id: &str, attrs: &Map<String, Value>) -> Employee {
    let name = match attrs.get("name") {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    Employee {
        id: id.to_string(),
        name,
        monthly_salary: attrs
            .get("monthlySalary")
            .and_then(coerce_decimal)
            .map(non_negative)
            .unwrap_or(Decimal::ZERO),
        daily_hours: attrs
            .get("dailyHours")
            .and_then(coerce_decimal)
            .map(non_negative),
        work_records: attrs
            .get("workRecords")
            .map(|records| work_records_from_value(id, records))
            .unwrap_or_default(),
        schedules: attrs
            .get("schedules")
            .map(|schedules| schedules_from_value(id, schedules))
            .unwrap_or_default(),
    }
}

fn work_records_from_value(
    employee_id: &str,
    value: &Value,
) -> BTreeMap<MonthKey, BTreeMap<DayKey, Decimal>> {
    let Value::Object(months) = value else {
        return BTreeMap::new();
    };

    let mut records = BTreeMap::new();
    for (month, days) in months {
        let Value::Object(days) = days else {
            debug!(
                "Ignoring work record {} for employee {}: not an object",
                month, employee_id
            );
            continue;
        };
        let day_hours = days
            .iter()
            .map(|(day, hours)| {
                let hours = coerce_decimal(hours).map(non_negative).unwrap_or(Decimal::ZERO);
                (day.clone(), hours)
            })
            .collect();
        records.insert(month.clone(), day_hours);
    }
    records
}

fn schedules_from_value(employee_id: &str, value: &Value) -> BTreeMap<DateKey, DaySchedule> {
    let Value::Object(dates) = value else {
        return BTreeMap::new();
    };

    dates
        .iter()
        .filter_map(|(date, schedule)| {
            let Value::Object(schedule) = schedule else {
                debug!(
                    "Ignoring schedule {} for employee {}: not an object",
                    date, employee_id
                );
                return None;
            };
            let time = |field: &str| {
                schedule
                    .get(field)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            Some((
                date.clone(),
                DaySchedule {
                    start_time: time("startTime"),
                    end_time: time("endTime"),
                },
            ))
        })
        .collect()
}

// --- Value Coercion ---

/// Numeric view of a snapshot value. Numbers and numeric strings convert;
/// anything else has no numeric value. Digit separators such as `1_000` are
/// not numeric.
pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => number_to_decimal(n),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(Decimal::ZERO);
            }
            if s.contains('_') {
                return None;
            }
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        _ => None,
    }
}

fn number_to_decimal(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    // Go through the printed form so 7.1 stays 7.1 instead of its binary expansion.
    let printed = n.to_string();
    Decimal::from_str(&printed)
        .or_else(|_| Decimal::from_scientific(&printed))
        .ok()
        .or_else(|| n.as_f64().and_then(Decimal::from_f64))
}

fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
