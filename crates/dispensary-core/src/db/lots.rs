//! Lot store operations: the inventory view the allocator reads, plus the
//! lifecycle transitions that take stock out of circulation.

use chrono::{Duration, NaiveDate};
use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{Database, DbError, DbResult};
use crate::models::{Lot, LotStatus, MovementKind, StockMovement};

const LOT_COLUMNS: &str = "lot_number, medication_code, location_code, expiration_date, \
                           quantity_received, quantity_available, status, created_at, updated_at";

impl Database {
    /// Record a newly received lot together with its receipt movement.
    ///
    /// Fails if the lot number already exists or the received quantity is
    /// not positive.
    pub fn receive_lot(&mut self, lot: &Lot) -> DbResult<StockMovement> {
        if lot.quantity_received <= Decimal::ZERO {
            return Err(DbError::Constraint(format!(
                "received quantity for lot {} must be positive",
                lot.lot_number
            )));
        }

        let movement = StockMovement::new(
            lot.lot_number.clone(),
            MovementKind::Receipt,
            lot.quantity_received,
            None,
        );

        let tx = self.conn.transaction()?;

        let exists: Option<String> = tx
            .query_row(
                "SELECT lot_number FROM lots WHERE lot_number = ?",
                [&lot.lot_number],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(DbError::Constraint(format!(
                "lot {} already exists",
                lot.lot_number
            )));
        }

        tx.execute(
            r#"
            INSERT INTO lots (
                lot_number, medication_code, location_code, expiration_date,
                quantity_received, quantity_available, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                lot.lot_number,
                lot.medication_code,
                lot.location_code,
                lot.expiration_date.map(|date| date.to_string()),
                lot.quantity_received.to_string(),
                lot.quantity_available.to_string(),
                lot.status.as_str(),
                lot.created_at,
                lot.updated_at,
            ],
        )?;

        tx.execute(
            r#"
            INSERT INTO stock_movements (id, lot_number, kind, quantity, reference, moved_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                movement.id,
                movement.lot_number,
                movement.kind.as_str(),
                movement.quantity.to_string(),
                movement.reference,
                movement.moved_at,
            ],
        )?;

        tx.commit()?;
        Ok(movement)
    }

    /// Get a lot by lot number.
    pub fn get_lot(&self, lot_number: &str) -> DbResult<Option<Lot>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {LOT_COLUMNS} FROM lots WHERE lot_number = ?"),
                [lot_number],
                map_lot_row,
            )
            .optional()?;

        result.map(|row| row.try_into()).transpose()
    }

    /// Candidate lots for allocation: available status and positive
    /// quantity, for one medication at one location.
    ///
    /// Returned in FEFO order (dated ascending, undated last); an empty
    /// result is a valid answer, not an error.
    pub fn candidate_lots(
        &self,
        medication_code: &str,
        location_code: &str,
    ) -> DbResult<Vec<Lot>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {LOT_COLUMNS}
            FROM lots
            WHERE medication_code = ?1
              AND location_code = ?2
              AND status = 'available'
            ORDER BY expiration_date IS NULL, expiration_date, lot_number
            "#
        ))?;

        let rows = stmt.query_map(params![medication_code, location_code], map_lot_row)?;

        let mut lots = Vec::new();
        for row in rows {
            let lot: Lot = row?.try_into()?;
            if lot.quantity_available > Decimal::ZERO {
                lots.push(lot);
            }
        }
        Ok(lots)
    }

    /// Available lots already past their expiration date.
    pub fn list_expired_lots(&self, reference_date: NaiveDate) -> DbResult<Vec<Lot>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {LOT_COLUMNS}
            FROM lots
            WHERE status = 'available'
              AND expiration_date IS NOT NULL
              AND expiration_date < ?1
            ORDER BY expiration_date, lot_number
            "#
        ))?;

        let rows = stmt.query_map([reference_date.to_string()], map_lot_row)?;
        collect_lots(rows)
    }

    /// Available lots expiring within `horizon_days` after the reference
    /// date. Already-expired lots are not "expiring" and are excluded.
    pub fn list_expiring_lots(
        &self,
        reference_date: NaiveDate,
        horizon_days: u32,
    ) -> DbResult<Vec<Lot>> {
        let horizon_end = reference_date + Duration::days(i64::from(horizon_days));

        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {LOT_COLUMNS}
            FROM lots
            WHERE status = 'available'
              AND expiration_date IS NOT NULL
              AND expiration_date > ?1
              AND expiration_date <= ?2
            ORDER BY expiration_date, lot_number
            "#
        ))?;

        let rows = stmt.query_map(
            params![reference_date.to_string(), horizon_end.to_string()],
            map_lot_row,
        )?;
        collect_lots(rows)
    }

    /// Put a lot in quarantine, removing it from allocation candidates.
    pub fn quarantine_lot(&self, lot_number: &str) -> DbResult<bool> {
        self.set_lot_status(lot_number, LotStatus::Quarantined)
    }

    /// Mark a lot as recalled, removing it from allocation candidates.
    pub fn recall_lot(&self, lot_number: &str) -> DbResult<bool> {
        self.set_lot_status(lot_number, LotStatus::Recalled)
    }

    fn set_lot_status(&self, lot_number: &str, status: LotStatus) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE lots SET status = ?1, updated_at = datetime('now') WHERE lot_number = ?2",
            params![status.as_str(), lot_number],
        )?;
        Ok(rows_affected > 0)
    }

    /// Quarantine every available lot that expired before the reference
    /// date. Returns the number of lots moved.
    pub fn quarantine_expired(&self, reference_date: NaiveDate) -> DbResult<usize> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE lots
            SET status = 'quarantined', updated_at = datetime('now')
            WHERE status = 'available'
              AND expiration_date IS NOT NULL
              AND expiration_date < ?1
            "#,
            [reference_date.to_string()],
        )?;
        Ok(rows_affected)
    }

    /// Total quantity available across all available lots of a medication,
    /// at every location.
    pub fn on_hand_for_medication(&self, medication_code: &str) -> DbResult<Decimal> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT quantity_available
            FROM lots
            WHERE medication_code = ?1 AND status = 'available'
            "#,
        )?;

        let rows = stmt.query_map([medication_code], |row| row.get::<_, String>(0))?;

        let mut total = Decimal::ZERO;
        for row in rows {
            total += row?.parse::<Decimal>()?;
        }
        Ok(total)
    }
}

/// Intermediate row struct for database mapping.
struct LotRow {
    lot_number: String,
    medication_code: String,
    location_code: String,
    expiration_date: Option<String>,
    quantity_received: String,
    quantity_available: String,
    status: String,
    created_at: String,
    updated_at: String,
}

fn map_lot_row(row: &Row<'_>) -> rusqlite::Result<LotRow> {
    Ok(LotRow {
        lot_number: row.get(0)?,
        medication_code: row.get(1)?,
        location_code: row.get(2)?,
        expiration_date: row.get(3)?,
        quantity_received: row.get(4)?,
        quantity_available: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn collect_lots(
    rows: impl Iterator<Item = rusqlite::Result<LotRow>>,
) -> DbResult<Vec<Lot>> {
    let mut lots = Vec::new();
    for row in rows {
        lots.push(row?.try_into()?);
    }
    Ok(lots)
}

impl TryFrom<LotRow> for Lot {
    type Error = DbError;

    fn try_from(row: LotRow) -> Result<Self, Self::Error> {
        let status = LotStatus::parse(&row.status)
            .ok_or_else(|| DbError::Constraint(format!("unknown lot status: {}", row.status)))?;

        Ok(Lot {
            lot_number: row.lot_number,
            medication_code: row.medication_code,
            location_code: row.location_code,
            expiration_date: row.expiration_date.map(|date| date.parse()).transpose()?,
            quantity_received: row.quantity_received.parse()?,
            quantity_available: row.quantity_available.parse()?,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Medication;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.upsert_medication(&Medication::new(
            "AMOX-500".into(),
            "Amoxicillin 500mg".into(),
        ))
        .unwrap();
        db
    }

    fn make_lot(lot_number: &str, expiration: Option<&str>, quantity: i64) -> Lot {
        let mut lot = Lot::new(
            lot_number.into(),
            "AMOX-500".into(),
            "PHARM/MAIN".into(),
            Decimal::from(quantity),
        );
        lot.expiration_date = expiration.map(date);
        lot
    }

    #[test]
    fn test_receive_and_get() {
        let mut db = setup_db();

        let lot = make_lot("LOT-001", Some("2025-06-10"), 20);
        let movement = db.receive_lot(&lot).unwrap();
        assert_eq!(movement.kind, MovementKind::Receipt);
        assert_eq!(movement.quantity, Decimal::from(20));

        let retrieved = db.get_lot("LOT-001").unwrap().unwrap();
        assert_eq!(retrieved.expiration_date, Some(date("2025-06-10")));
        assert_eq!(retrieved.quantity_available, Decimal::from(20));
        assert_eq!(retrieved.status, LotStatus::Available);
    }

    #[test]
    fn test_receive_duplicate_lot_rejected() {
        let mut db = setup_db();

        db.receive_lot(&make_lot("LOT-001", None, 20)).unwrap();
        let result = db.receive_lot(&make_lot("LOT-001", None, 5));
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_receive_non_positive_quantity_rejected() {
        let mut db = setup_db();
        let result = db.receive_lot(&make_lot("LOT-001", None, 0));
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_candidate_lots_fefo_order() {
        let mut db = setup_db();

        db.receive_lot(&make_lot("LOT-C", None, 3)).unwrap();
        db.receive_lot(&make_lot("LOT-B", Some("2025-07-01"), 10))
            .unwrap();
        db.receive_lot(&make_lot("LOT-A", Some("2025-06-10"), 5))
            .unwrap();

        let candidates = db.candidate_lots("AMOX-500", "PHARM/MAIN").unwrap();
        let numbers: Vec<_> = candidates.iter().map(|l| l.lot_number.as_str()).collect();
        assert_eq!(numbers, vec!["LOT-A", "LOT-B", "LOT-C"]);
    }

    #[test]
    fn test_candidate_lots_filters_status_and_location() {
        let mut db = setup_db();

        db.receive_lot(&make_lot("LOT-A", Some("2025-06-10"), 5))
            .unwrap();
        db.receive_lot(&make_lot("LOT-B", Some("2025-07-01"), 10))
            .unwrap();

        let mut elsewhere = make_lot("LOT-C", Some("2025-06-05"), 4);
        elsewhere.location_code = "PHARM/BACKUP".into();
        db.receive_lot(&elsewhere).unwrap();

        db.receive_lot(&make_lot("LOT-D", Some("2025-06-20"), 6))
            .unwrap();

        db.quarantine_lot("LOT-B").unwrap();
        db.recall_lot("LOT-D").unwrap();

        let candidates = db.candidate_lots("AMOX-500", "PHARM/MAIN").unwrap();
        let numbers: Vec<_> = candidates.iter().map(|l| l.lot_number.as_str()).collect();
        assert_eq!(numbers, vec!["LOT-A"]);

        let recalled = db.get_lot("LOT-D").unwrap().unwrap();
        assert_eq!(recalled.status, LotStatus::Recalled);
    }

    #[test]
    fn test_expiring_and_expired_queries() {
        let mut db = setup_db();

        db.receive_lot(&make_lot("LOT-OLD", Some("2025-05-01"), 20))
            .unwrap();
        db.receive_lot(&make_lot("LOT-SOON", Some("2025-06-15"), 5))
            .unwrap();
        db.receive_lot(&make_lot("LOT-LATER", Some("2025-09-01"), 5))
            .unwrap();
        db.receive_lot(&make_lot("LOT-NODATE", None, 5)).unwrap();

        let reference = date("2025-06-01");

        let expired = db.list_expired_lots(reference).unwrap();
        let numbers: Vec<_> = expired.iter().map(|l| l.lot_number.as_str()).collect();
        assert_eq!(numbers, vec!["LOT-OLD"]);

        let expiring = db.list_expiring_lots(reference, 30).unwrap();
        let numbers: Vec<_> = expiring.iter().map(|l| l.lot_number.as_str()).collect();
        assert_eq!(numbers, vec!["LOT-SOON"]);
    }

    #[test]
    fn test_quarantine_expired_sweep() {
        let mut db = setup_db();

        db.receive_lot(&make_lot("LOT-OLD", Some("2025-05-01"), 20))
            .unwrap();
        db.receive_lot(&make_lot("LOT-OK", Some("2025-09-01"), 5))
            .unwrap();

        let moved = db.quarantine_expired(date("2025-06-01")).unwrap();
        assert_eq!(moved, 1);

        let old = db.get_lot("LOT-OLD").unwrap().unwrap();
        assert_eq!(old.status, LotStatus::Quarantined);

        // Sweep is idempotent
        let moved = db.quarantine_expired(date("2025-06-01")).unwrap();
        assert_eq!(moved, 0);
    }

    #[test]
    fn test_on_hand_sums_available_lots() {
        let mut db = setup_db();

        let mut lot = make_lot("LOT-A", None, 10);
        lot.quantity_received = "2.5".parse().unwrap();
        lot.quantity_available = "2.5".parse().unwrap();
        db.receive_lot(&lot).unwrap();
        db.receive_lot(&make_lot("LOT-B", Some("2025-07-01"), 4))
            .unwrap();
        db.receive_lot(&make_lot("LOT-C", Some("2025-05-01"), 8))
            .unwrap();
        db.quarantine_lot("LOT-C").unwrap();

        let on_hand = db.on_hand_for_medication("AMOX-500").unwrap();
        assert_eq!(on_hand, "6.5".parse::<Decimal>().unwrap());
    }
}
