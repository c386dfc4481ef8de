//! SQLite schema definition.

/// Complete database schema for the dispensary store.
///
/// Quantities are stored as exact decimal strings and parsed on read;
/// SQL never does quantity arithmetic. Dates are ISO-8601 text, so string
/// comparison orders them chronologically.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Medication Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS medications (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    strength TEXT,
    requires_lot_tracking INTEGER NOT NULL DEFAULT 1,
    reorder_level TEXT,                           -- decimal string
    expiry_alert_days INTEGER NOT NULL DEFAULT 30,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_medications_active ON medications(active);

-- ============================================================================
-- Lots
-- ============================================================================

CREATE TABLE IF NOT EXISTS lots (
    lot_number TEXT PRIMARY KEY,
    medication_code TEXT NOT NULL REFERENCES medications(code),
    location_code TEXT NOT NULL,
    expiration_date TEXT,                         -- ISO date, NULL = untracked
    quantity_received TEXT NOT NULL,              -- decimal string
    quantity_available TEXT NOT NULL,             -- decimal string
    status TEXT NOT NULL DEFAULT 'available'
        CHECK (status IN ('available', 'quarantined', 'recalled')),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_lots_medication
    ON lots(medication_code, location_code, status);
CREATE INDEX IF NOT EXISTS idx_lots_expiration ON lots(expiration_date);

-- ============================================================================
-- Stock Movements (Append-Only Ledger)
-- ============================================================================

CREATE TABLE IF NOT EXISTS stock_movements (
    id TEXT PRIMARY KEY,
    lot_number TEXT NOT NULL REFERENCES lots(lot_number),
    kind TEXT NOT NULL CHECK (kind IN ('receipt', 'dispense')),
    quantity TEXT NOT NULL,                       -- decimal string
    reference TEXT,
    moved_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_movements_lot ON stock_movements(lot_number);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_lot_status_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO medications (code, name) VALUES ('AMOX-500', 'Amoxicillin 500mg')",
            [],
        )
        .unwrap();

        // Unknown status should fail the CHECK constraint
        let result = conn.execute(
            "INSERT INTO lots (lot_number, medication_code, location_code,
                               quantity_received, quantity_available, status)
             VALUES ('LOT-001', 'AMOX-500', 'PHARM/MAIN', '10', '10', 'depleted')",
            [],
        );
        assert!(result.is_err());

        // Valid status should succeed
        let result = conn.execute(
            "INSERT INTO lots (lot_number, medication_code, location_code,
                               quantity_received, quantity_available, status)
             VALUES ('LOT-001', 'AMOX-500', 'PHARM/MAIN', '10', '10', 'available')",
            [],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_lot_requires_medication() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        // No matching medication row
        let result = conn.execute(
            "INSERT INTO lots (lot_number, medication_code, location_code,
                               quantity_received, quantity_available)
             VALUES ('LOT-001', 'MISSING', 'PHARM/MAIN', '10', '10')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_movement_kind_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO medications (code, name) VALUES ('AMOX-500', 'Amoxicillin 500mg')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO lots (lot_number, medication_code, location_code,
                               quantity_received, quantity_available)
             VALUES ('LOT-001', 'AMOX-500', 'PHARM/MAIN', '10', '10')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO stock_movements (id, lot_number, kind, quantity, moved_at)
             VALUES ('m1', 'LOT-001', 'transfer', '5', '2025-06-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err());

        let result = conn.execute(
            "INSERT INTO stock_movements (id, lot_number, kind, quantity, moved_at)
             VALUES ('m1', 'LOT-001', 'receipt', '5', '2025-06-01T00:00:00Z')",
            [],
        );
        assert!(result.is_ok());
    }
}
