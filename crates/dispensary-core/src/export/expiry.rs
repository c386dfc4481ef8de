//! Expiring-stock report.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::escape_csv;
use crate::db::{Database, DbResult};
use crate::models::Lot;

/// Expired and expiring-soon stock at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryReport {
    /// Date the stock was judged against
    pub reference_date: NaiveDate,
    /// Days ahead counted as "expiring soon"
    pub warning_horizon_days: u32,
    /// Lots already past their expiration date
    pub expired: Vec<ExpiryReportLine>,
    /// Lots expiring within the horizon
    pub expiring_soon: Vec<ExpiryReportLine>,
}

/// One lot in the expiry report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryReportLine {
    pub lot_number: String,
    pub medication_code: String,
    pub location_code: String,
    pub expiration_date: NaiveDate,
    /// Days from the reference date until expiry (negative once expired)
    pub days_until_expiry: i64,
    pub quantity_available: Decimal,
}

impl ExpiryReport {
    /// Build the report from current stock.
    pub fn build(
        db: &Database,
        reference_date: NaiveDate,
        warning_horizon_days: u32,
    ) -> DbResult<Self> {
        let expired = db
            .list_expired_lots(reference_date)?
            .into_iter()
            .filter_map(|lot| ExpiryReportLine::from_lot(&lot, reference_date))
            .collect();
        let expiring_soon = db
            .list_expiring_lots(reference_date, warning_horizon_days)?
            .into_iter()
            .filter_map(|lot| ExpiryReportLine::from_lot(&lot, reference_date))
            .collect();

        Ok(Self {
            reference_date,
            warning_horizon_days,
            expired,
            expiring_soon,
        })
    }

    /// Whether there is anything to act on.
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.expiring_soon.is_empty()
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str(
            "status,lot_number,medication_code,location_code,expiration_date,days_until_expiry,quantity_available\n",
        );

        for (status, line) in self
            .expired
            .iter()
            .map(|line| ("expired", line))
            .chain(self.expiring_soon.iter().map(|line| ("expiring_soon", line)))
        {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                status,
                escape_csv(&line.lot_number),
                escape_csv(&line.medication_code),
                escape_csv(&line.location_code),
                line.expiration_date,
                line.days_until_expiry,
                line.quantity_available,
            ));
        }

        csv
    }
}

impl ExpiryReportLine {
    fn from_lot(lot: &Lot, reference_date: NaiveDate) -> Option<Self> {
        let expiration_date = lot.expiration_date?;
        Some(Self {
            lot_number: lot.lot_number.clone(),
            medication_code: lot.medication_code.clone(),
            location_code: lot.location_code.clone(),
            expiration_date,
            days_until_expiry: (expiration_date - reference_date).num_days(),
            quantity_available: lot.quantity_available,
        })
    }
}
