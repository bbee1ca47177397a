// src/duration.rs
use chrono::NaiveTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const TIME_OF_DAY_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];
const SECONDS_PER_HOUR: Decimal = dec!(3600);

pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    TIME_OF_DAY_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
}

/// Elapsed hours between two times of day on the same date.
///
/// Missing or unparseable input yields 0, and so does an end that is not
/// after the start: shifts crossing midnight are not supported.
pub fn shift_hours(start_time: &str, end_time: &str) -> Decimal {
    let (Some(start), Some(end)) = (parse_time_of_day(start_time), parse_time_of_day(end_time))
    else {
        return Decimal::ZERO;
    };
    let elapsed_secs = (end - start).num_seconds();
    if elapsed_secs <= 0 {
        return Decimal::ZERO;
    }
    Decimal::from(elapsed_secs) / SECONDS_PER_HOUR
}
