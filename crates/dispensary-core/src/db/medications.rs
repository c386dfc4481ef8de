//! Medication catalog database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::Medication;

impl Database {
    /// Insert or update a medication.
    pub fn upsert_medication(&self, medication: &Medication) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO medications (
                code, name, strength, requires_lot_tracking,
                reorder_level, expiry_alert_days, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, datetime('now'))
            ON CONFLICT(code) DO UPDATE SET
                name = excluded.name,
                strength = excluded.strength,
                requires_lot_tracking = excluded.requires_lot_tracking,
                reorder_level = excluded.reorder_level,
                expiry_alert_days = excluded.expiry_alert_days,
                active = excluded.active,
                updated_at = datetime('now')
            "#,
            params![
                medication.code,
                medication.name,
                medication.strength,
                medication.requires_lot_tracking,
                medication.reorder_level.map(|level| level.to_string()),
                medication.expiry_alert_days,
                medication.active,
                medication.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a medication by code.
    pub fn get_medication(&self, code: &str) -> DbResult<Option<Medication>> {
        let result = self
            .conn
            .query_row(
                r#"
                SELECT code, name, strength, requires_lot_tracking,
                       reorder_level, expiry_alert_days, active, created_at, updated_at
                FROM medications
                WHERE code = ?
                "#,
                [code],
                map_medication_row,
            )
            .optional()?;

        result.map(|row| row.try_into()).transpose()
    }

    /// List medications, optionally restricted to active ones.
    pub fn list_medications(&self, active_only: bool) -> DbResult<Vec<Medication>> {
        let sql = if active_only {
            r#"
            SELECT code, name, strength, requires_lot_tracking,
                   reorder_level, expiry_alert_days, active, created_at, updated_at
            FROM medications
            WHERE active = 1
            ORDER BY name
            "#
        } else {
            r#"
            SELECT code, name, strength, requires_lot_tracking,
                   reorder_level, expiry_alert_days, active, created_at, updated_at
            FROM medications
            ORDER BY name
            "#
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], map_medication_row)?;

        let mut medications = Vec::new();
        for row in rows {
            medications.push(row?.try_into()?);
        }
        Ok(medications)
    }

    /// Mark a medication as inactive (soft delete).
    pub fn deactivate_medication(&self, code: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE medications SET active = 0, updated_at = datetime('now') WHERE code = ?",
            [code],
        )?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct MedicationRow {
    code: String,
    name: String,
    strength: Option<String>,
    requires_lot_tracking: bool,
    reorder_level: Option<String>,
    expiry_alert_days: u32,
    active: bool,
    created_at: String,
    updated_at: String,
}

fn map_medication_row(row: &Row<'_>) -> rusqlite::Result<MedicationRow> {
    Ok(MedicationRow {
        code: row.get(0)?,
        name: row.get(1)?,
        strength: row.get(2)?,
        requires_lot_tracking: row.get(3)?,
        reorder_level: row.get(4)?,
        expiry_alert_days: row.get(5)?,
        active: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl TryFrom<MedicationRow> for Medication {
    type Error = DbError;

    fn try_from(row: MedicationRow) -> Result<Self, Self::Error> {
        Ok(Medication {
            code: row.code,
            name: row.name,
            strength: row.strength,
            requires_lot_tracking: row.requires_lot_tracking,
            reorder_level: row.reorder_level.map(|level| level.parse()).transpose()?,
            expiry_alert_days: row.expiry_alert_days,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
