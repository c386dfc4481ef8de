//! Stock movement ledger and plan commit.

use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{Database, DbError, DbResult};
use crate::models::{AllocationPlan, LotStatus, MovementKind, StockMovement};

impl Database {
    /// Commit an allocation plan: decrement each allocated lot and append
    /// the corresponding dispense movements, all in one transaction.
    ///
    /// Availability is re-checked against the live rows before any write.
    /// If a lot no longer covers its line the whole commit fails with
    /// [`DbError::StaleSnapshot`] and nothing is written; the caller should
    /// re-plan against a fresh snapshot. Lots that left `available` status
    /// since the snapshot fail the commit with a constraint error.
    pub fn commit_plan(
        &mut self,
        plan: &AllocationPlan,
        reference: Option<&str>,
    ) -> DbResult<Vec<StockMovement>> {
        let tx = self.conn.transaction()?;
        let mut movements = Vec::with_capacity(plan.lines.len());

        for line in &plan.lines {
            let current: Option<(String, String)> = tx
                .query_row(
                    "SELECT quantity_available, status FROM lots WHERE lot_number = ?",
                    [&line.lot_number],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let (available_raw, status_raw) = current
                .ok_or_else(|| DbError::NotFound(format!("lot {}", line.lot_number)))?;

            let status = LotStatus::parse(&status_raw).ok_or_else(|| {
                DbError::Constraint(format!("unknown lot status: {status_raw}"))
            })?;
            if status != LotStatus::Available {
                return Err(DbError::Constraint(format!(
                    "lot {} is {}, not available",
                    line.lot_number,
                    status.as_str()
                )));
            }

            let available: Decimal = available_raw.parse()?;
            if available < line.quantity_allocated {
                return Err(DbError::StaleSnapshot {
                    lot_number: line.lot_number.clone(),
                    requested: line.quantity_allocated,
                    available,
                });
            }

            tx.execute(
                "UPDATE lots SET quantity_available = ?1, updated_at = datetime('now')
                 WHERE lot_number = ?2",
                params![
                    (available - line.quantity_allocated).to_string(),
                    line.lot_number
                ],
            )?;

            let movement = StockMovement::new(
                line.lot_number.clone(),
                MovementKind::Dispense,
                line.quantity_allocated,
                reference.map(String::from),
            );
            tx.execute(
                "INSERT INTO stock_movements (id, lot_number, kind, quantity, reference, moved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    movement.id,
                    movement.lot_number,
                    movement.kind.as_str(),
                    movement.quantity.to_string(),
                    movement.reference,
                    movement.moved_at,
                ],
            )?;
            movements.push(movement);
        }

        tx.commit()?;
        Ok(movements)
    }

    /// Movement history for a lot, most recent first.
    pub fn list_movements(&self, lot_number: &str) -> DbResult<Vec<StockMovement>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, lot_number, kind, quantity, reference, moved_at
            FROM stock_movements
            WHERE lot_number = ?
            ORDER BY moved_at DESC, id
            "#,
        )?;

        let rows = stmt.query_map([lot_number], map_movement_row)?;

        let mut movements = Vec::new();
        for row in rows {
            movements.push(row?.try_into()?);
        }
        Ok(movements)
    }
}

/// Intermediate row struct for database mapping.
struct MovementRow {
    id: String,
    lot_number: String,
    kind: String,
    quantity: String,
    reference: Option<String>,
    moved_at: String,
}

fn map_movement_row(row: &Row<'_>) -> rusqlite::Result<MovementRow> {
    Ok(MovementRow {
        id: row.get(0)?,
        lot_number: row.get(1)?,
        kind: row.get(2)?,
        quantity: row.get(3)?,
        reference: row.get(4)?,
        moved_at: row.get(5)?,
    })
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = DbError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let kind = MovementKind::parse(&row.kind)
            .ok_or_else(|| DbError::Constraint(format!("unknown movement kind: {}", row.kind)))?;

        Ok(StockMovement {
            id: row.id,
            lot_number: row.lot_number,
            kind,
            quantity: row.quantity.parse()?,
            reference: row.reference,
            moved_at: row.moved_at,
        })
    }
}
