//! Stock movement models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Stock received into a lot
    Receipt,
    /// Stock dispensed from a lot
    Dispense,
}

impl MovementKind {
    /// Canonical string form, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Receipt => "receipt",
            MovementKind::Dispense => "dispense",
        }
    }

    /// Parse the canonical string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "receipt" => Some(MovementKind::Receipt),
            "dispense" => Some(MovementKind::Dispense),
            _ => None,
        }
    }
}

/// One entry in the per-lot stock ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockMovement {
    /// Movement id (UUID, generated locally)
    pub id: String,
    /// Lot the stock moved in or out of
    pub lot_number: String,
    /// Receipt or dispense
    pub kind: MovementKind,
    /// Quantity moved (positive magnitude)
    pub quantity: Decimal,
    /// Caller-supplied reference (e.g., a prescription number)
    pub reference: Option<String>,
    /// When the movement was recorded
    pub moved_at: String,
}

impl StockMovement {
    /// Create a new movement record with a generated id and timestamp.
    pub fn new(
        lot_number: String,
        kind: MovementKind,
        quantity: Decimal,
        reference: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            lot_number,
            kind,
            quantity,
            reference,
            moved_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
