//! Medication catalog models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DEFAULT_WARNING_HORIZON_DAYS;

/// A medication in the dispensary catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    /// Unique medication code
    pub code: String,
    /// Display name
    pub name: String,
    /// Strength (e.g., "500mg")
    pub strength: Option<String>,
    /// Whether stock for this medication is tracked per lot
    pub requires_lot_tracking: bool,
    /// On-hand quantity at or below which the medication should be reordered
    pub reorder_level: Option<Decimal>,
    /// Days before expiry at which lots of this medication are flagged
    pub expiry_alert_days: u32,
    /// Whether this medication is currently dispensable
    pub active: bool,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Medication {
    /// Create a new active, lot-tracked medication.
    pub fn new(code: String, name: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            code,
            name,
            strength: None,
            requires_lot_tracking: true,
            reorder_level: None,
            expiry_alert_days: DEFAULT_WARNING_HORIZON_DAYS,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Whether on-hand stock has fallen to or below the reorder level.
    ///
    /// Medications without a configured reorder level never report low.
    pub fn is_below_reorder(&self, quantity_on_hand: Decimal) -> bool {
        match self.reorder_level {
            Some(level) => quantity_on_hand <= level,
            None => false,
        }
    }
}
