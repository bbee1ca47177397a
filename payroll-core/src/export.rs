// src/export.rs
use rust_decimal::prelude::*;
use std::io::Write;
use tracing::info;

use crate::error::PayrollError;
use crate::payroll::MonthlyReport;
use crate::period::YearMonth;

pub const SHEET_HEADERS: [&str; 8] = [
    "No",
    "Employee Name",
    "Monthly Salary",
    "Total Hours",
    "Working Days",
    "Hourly Rate",
    "Calculated Salary",
    "Efficiency (%)",
];

pub const SUMMARY_LABEL: &str = "TOTAL";

/// One line of the payroll export. Cells that do not apply to the summary
/// line are `None` and written empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub sequence: Option<usize>,
    pub name: String,
    pub monthly_salary: Option<Decimal>,
    pub total_hours: Decimal,
    pub working_days: Option<u32>,
    pub hourly_rate: Option<Decimal>,
    pub calculated_salary: Decimal,
    pub efficiency: Decimal,
}

impl SheetRow {
    fn cells(&self) -> [String; 8] {
        [
            self.sequence.map(|n| n.to_string()).unwrap_or_default(),
            self.name.clone(),
            self.monthly_salary.map(|v| v.normalize().to_string()).unwrap_or_default(),
            self.total_hours.normalize().to_string(),
            self.working_days.map(|n| n.to_string()).unwrap_or_default(),
            self.hourly_rate.map(|v| fixed(v, 2)).unwrap_or_default(),
            fixed(self.calculated_salary, 2),
            fixed(self.efficiency, 1),
        ]
    }
}

fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

/// Tabular payroll for one month: a row per employee followed by the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollSheet {
    pub month: YearMonth,
    pub rows: Vec<SheetRow>,
}

impl PayrollSheet {
    pub fn from_report(report: &MonthlyReport) -> Self {
        let mut rows: Vec<SheetRow> = report
            .employees
            .iter()
            .enumerate()
            .map(|(index, row)| SheetRow {
                sequence: Some(index + 1),
                name: row.name.clone(),
                monthly_salary: Some(row.monthly_salary),
                total_hours: row.total_hours,
                working_days: Some(row.metrics.working_days),
                hourly_rate: Some(row.metrics.hourly_rate),
                calculated_salary: row.metrics.calculated_salary,
                efficiency: row.metrics.efficiency,
            })
            .collect();

        rows.push(SheetRow {
            sequence: None,
            name: SUMMARY_LABEL.to_string(),
            monthly_salary: None,
            total_hours: report.summary.total_hours,
            working_days: None,
            hourly_rate: None,
            calculated_salary: report.summary.total_calculated_salary,
            efficiency: report.summary.average_efficiency,
        });

        Self {
            month: report.month,
            rows,
        }
    }

    pub fn file_name(&self) -> String {
        format!("payroll_{}.csv", self.month)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PayrollError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(SHEET_HEADERS)?;
        for row in &self.rows {
            csv_writer.write_record(row.cells())?;
        }
        csv_writer.flush()?;
        info!(
            "Wrote payroll sheet for {} ({} rows)",
            self.month,
            self.rows.len()
        );
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, PayrollError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| PayrollError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}
