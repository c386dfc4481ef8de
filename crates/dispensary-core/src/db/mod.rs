//! Database layer for the dispensary store.

mod schema;
mod medications;
mod lots;
mod movements;

pub use schema::*;
#[allow(unused_imports)]
pub use medications::*;
#[allow(unused_imports)]
pub use lots::*;
#[allow(unused_imports)]
pub use movements::*;

use rusqlite::Connection;
use rust_decimal::Decimal;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid decimal in database: {0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("invalid date in database: {0}")]
    Date(#[from] chrono::ParseError),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("stale snapshot: lot {lot_number} has {available} available, plan needs {requested}")]
    StaleSnapshot {
        lot_number: String,
        requested: Decimal,
        available: Decimal,
    },
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction.
    pub fn transaction(&mut self) -> DbResult<rusqlite::Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}
