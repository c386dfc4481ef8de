//! Reorder-level report.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::escape_csv;
use crate::db::{Database, DbResult};

/// Active medications whose on-hand stock has fallen to or below their
/// reorder level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderReport {
    pub entries: Vec<ReorderEntry>,
}

/// One medication needing replenishment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderEntry {
    pub medication_code: String,
    pub name: String,
    pub reorder_level: Decimal,
    pub quantity_on_hand: Decimal,
}

impl ReorderReport {
    /// Build the report from current stock.
    ///
    /// Medications without a configured reorder level are skipped.
    pub fn build(db: &Database) -> DbResult<Self> {
        let mut entries = Vec::new();

        for medication in db.list_medications(true)? {
            let Some(reorder_level) = medication.reorder_level else {
                continue;
            };
            let quantity_on_hand = db.on_hand_for_medication(&medication.code)?;
            if medication.is_below_reorder(quantity_on_hand) {
                entries.push(ReorderEntry {
                    medication_code: medication.code,
                    name: medication.name,
                    reorder_level,
                    quantity_on_hand,
                });
            }
        }

        Ok(Self { entries })
    }

    /// Whether any medication needs reordering.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("medication_code,name,reorder_level,quantity_on_hand\n");

        for entry in &self.entries {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                escape_csv(&entry.medication_code),
                escape_csv(&entry.name),
                entry.reorder_level,
                entry.quantity_on_hand,
            ));
        }

        csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lot, Medication};

    fn add_medication(db: &Database, code: &str, name: &str, reorder_level: Option<i64>) {
        let mut med = Medication::new(code.into(), name.into());
        med.reorder_level = reorder_level.map(Decimal::from);
        db.upsert_medication(&med).unwrap();
    }

    fn add_stock(db: &mut Database, code: &str, lot_number: &str, quantity: i64) {
        let lot = Lot::new(
            lot_number.into(),
            code.into(),
            "PHARM/MAIN".into(),
            Decimal::from(quantity),
        );
        db.receive_lot(&lot).unwrap();
    }

    #[test]
    fn test_build_flags_low_stock() {
        let mut db = Database::open_in_memory().unwrap();
        add_medication(&db, "AMOX-500", "Amoxicillin", Some(50));
        add_medication(&db, "IBU-200", "Ibuprofen", Some(20));
        add_medication(&db, "SALINE", "Saline", None);

        add_stock(&mut db, "AMOX-500", "LOT-A", 30); // below 50
        add_stock(&mut db, "IBU-200", "LOT-B", 100); // plenty
        add_stock(&mut db, "SALINE", "LOT-C", 1); // no reorder level

        let report = ReorderReport::build(&db).unwrap();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].medication_code, "AMOX-500");
        assert_eq!(report.entries[0].quantity_on_hand, Decimal::from(30));
    }

    #[test]
    fn test_medication_with_no_stock_reports_zero() {
        let db = Database::open_in_memory().unwrap();
        add_medication(&db, "AMOX-500", "Amoxicillin", Some(50));

        let report = ReorderReport::build(&db).unwrap();
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].quantity_on_hand, Decimal::ZERO);
    }

    #[test]
    fn test_csv_output() {
        let db = Database::open_in_memory().unwrap();
        add_medication(&db, "AMOX-500", "Amoxicillin, caps", Some(50));

        let report = ReorderReport::build(&db).unwrap();
        let csv = report.to_csv();
        assert!(csv.starts_with("medication_code,name,reorder_level,quantity_on_hand\n"));
        assert!(csv.contains("AMOX-500,\"Amoxicillin, caps\",50,0"));
    }
}
