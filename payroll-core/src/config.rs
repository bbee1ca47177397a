// src/config.rs
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::{info, warn};

use crate::duration::parse_time_of_day;
use crate::error::PayrollError;

// --- Baselines ---
// The source views never agreed on a single per-day divisor, so each one is
// kept under its own name instead of being folded together.

/// Hours that earn the full monthly salary in the calculator view.
pub const DEFAULT_STANDARD_MONTHLY_HOURS: Decimal = dec!(220);
/// Nominal workday used only to derive the working-days statistic.
pub const DEFAULT_WORKDAY_HOURS: Decimal = dec!(8);
/// Working days per month in the employee management view.
pub const DEFAULT_MANAGEMENT_WORKING_DAYS: Decimal = dec!(22);
/// Calendar days per month in the dashboard's daily salary figure.
pub const DEFAULT_DASHBOARD_DAYS_PER_MONTH: Decimal = dec!(30);
/// Daily hours assumed for an employee record that carries none.
pub const DEFAULT_DAILY_HOURS: Decimal = dec!(10);
pub const DEFAULT_TOP_EARNERS: usize = 5;
pub const DEFAULT_SHIFT_START: &str = "09:00";
pub const DEFAULT_SHIFT_END: &str = "18:00";
/// An unscheduled employee is assumed to work the default shift that day.
pub const DEFAULT_COUNT_DEFAULT_SHIFT: bool = true;

const ENV_PREFIX: &str = "PAYROLL_";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PayrollConfig {
    #[serde(default = "default_standard_monthly_hours")]
    pub standard_monthly_hours: Decimal,
    #[serde(default = "default_workday_hours")]
    pub workday_hours: Decimal,
    #[serde(default = "default_management_working_days")]
    pub management_working_days: Decimal,
    #[serde(default = "default_dashboard_days_per_month")]
    pub dashboard_days_per_month: Decimal,
    #[serde(default = "default_daily_hours")]
    pub default_daily_hours: Decimal,
    #[serde(default = "default_top_earners")]
    pub top_earners: usize,
    #[serde(default = "default_shift_start")]
    pub default_shift_start: String,
    #[serde(default = "default_shift_end")]
    pub default_shift_end: String,
    /// Whether an employee without a stored shift contributes the default
    /// shift's hours to the daily fleet total.
    #[serde(default = "default_count_default_shift")]
    pub count_default_shift: bool,
}

fn default_standard_monthly_hours() -> Decimal {
    DEFAULT_STANDARD_MONTHLY_HOURS
}
fn default_workday_hours() -> Decimal {
    DEFAULT_WORKDAY_HOURS
}
fn default_management_working_days() -> Decimal {
    DEFAULT_MANAGEMENT_WORKING_DAYS
}
fn default_dashboard_days_per_month() -> Decimal {
    DEFAULT_DASHBOARD_DAYS_PER_MONTH
}
fn default_daily_hours() -> Decimal {
    DEFAULT_DAILY_HOURS
}
fn default_top_earners() -> usize {
    DEFAULT_TOP_EARNERS
}
fn default_shift_start() -> String {
    DEFAULT_SHIFT_START.to_string()
}
fn default_shift_end() -> String {
    DEFAULT_SHIFT_END.to_string()
}
fn default_count_default_shift() -> bool {
    DEFAULT_COUNT_DEFAULT_SHIFT
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            standard_monthly_hours: DEFAULT_STANDARD_MONTHLY_HOURS,
            workday_hours: DEFAULT_WORKDAY_HOURS,
            management_working_days: DEFAULT_MANAGEMENT_WORKING_DAYS,
            dashboard_days_per_month: DEFAULT_DASHBOARD_DAYS_PER_MONTH,
            default_daily_hours: DEFAULT_DAILY_HOURS,
            top_earners: DEFAULT_TOP_EARNERS,
            default_shift_start: default_shift_start(),
            default_shift_end: default_shift_end(),
            count_default_shift: DEFAULT_COUNT_DEFAULT_SHIFT,
        }
    }
}

impl PayrollConfig {
    /// Reads `PAYROLL_*` variables, falling back to the built-in baselines.
    pub fn from_env() -> Result<Self, PayrollError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, PayrollError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: PayrollConfig = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        info!(
            "Payroll baselines: standard_monthly_hours={}, workday_hours={}, management_working_days={}, dashboard_days_per_month={}",
            config.standard_monthly_hours,
            config.workday_hours,
            config.management_working_days,
            config.dashboard_days_per_month
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), PayrollError> {
        for raw in [&self.default_shift_start, &self.default_shift_end] {
            if parse_time_of_day(raw).is_none() {
                return Err(PayrollError::InvalidTime(raw.clone()));
            }
        }
        if self.standard_monthly_hours.is_zero() {
            warn!("Standard monthly hours is 0; every pro-rated figure will be 0.");
        }
        Ok(())
    }
}
