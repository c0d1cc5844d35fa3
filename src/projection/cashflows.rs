//! Amortization schedule output structures

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// A single month of an amortization schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    /// Payment number (1-indexed)
    pub period: u32,
    /// Loan year (1-indexed)
    pub year: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub cumulative_principal: f64,
    /// End-of-period balance
    pub balance: f64,
    pub property_value: f64,
    /// Property value - balance - sunk costs
    pub equity: f64,
}

impl AmortizationRow {
    /// Create an empty row for a period
    pub fn new(period: u32) -> Self {
        Self {
            period,
            year: period.saturating_sub(1) / 12 + 1,
            ..Default::default()
        }
    }
}

/// Complete month-by-month schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationSchedule {
    pub rows: Vec<AmortizationRow>,
    /// Period of the first child payment when a refinancing was spliced in
    pub refinance_period: Option<u32>,
}

impl AmortizationSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row
    pub fn add_row(&mut self, row: AmortizationRow) {
        self.rows.push(row);
    }

    /// Row for a payment number, if the schedule reaches it
    pub fn row(&self, period: u32) -> Option<&AmortizationRow> {
        period
            .checked_sub(1)
            .and_then(|index| self.rows.get(index as usize))
    }

    /// Get summary statistics
    pub fn summary(&self) -> ScheduleSummary {
        let total_interest: f64 = self.rows.iter().map(|r| r.interest).sum();
        let total_principal: f64 = self.rows.iter().map(|r| r.principal).sum();
        let total_payments: f64 = self.rows.iter().map(|r| r.payment).sum();

        let last = self.rows.last();

        ScheduleSummary {
            total_months: self.rows.len() as u32,
            total_payments,
            total_interest,
            total_principal,
            final_balance: last.map(|r| r.balance).unwrap_or(0.0),
            final_property_value: last.map(|r| r.property_value).unwrap_or(0.0),
            final_equity: last.map(|r| r.equity).unwrap_or(0.0),
        }
    }

    /// Year-end rows only
    pub fn yearly(&self) -> impl Iterator<Item = &AmortizationRow> {
        let len = self.rows.len();
        self.rows
            .iter()
            .enumerate()
            .filter(move |(i, r)| r.period % 12 == 0 || i + 1 == len)
            .map(|(_, r)| r)
    }

    /// Write every row as CSV with a header line
    pub fn write_csv<W: Write>(&self, writer: W) -> EngineResult<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the schedule to a CSV file
    pub fn write_csv_path(&self, path: &Path) -> EngineResult<()> {
        let file = File::create(path)?;
        self.write_csv(file)
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub total_months: u32,
    pub total_payments: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    pub final_balance: f64,
    pub final_property_value: f64,
    pub final_equity: f64,
}
