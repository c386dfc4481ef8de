//! Medication lot models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A batch of a medication with its own quantity and (optional) expiration.
///
/// The allocation engine only ever reads `Lot` values as a snapshot; stock
/// decrements happen through the store when a plan is committed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lot {
    /// Lot/batch number - unique identifier
    pub lot_number: String,
    /// Code of the medication this lot belongs to
    pub medication_code: String,
    /// Stock location holding this lot
    pub location_code: String,
    /// Expiration date; `None` means expiry is not tracked for this lot
    pub expiration_date: Option<NaiveDate>,
    /// Quantity originally received
    pub quantity_received: Decimal,
    /// Quantity still available for dispensing
    pub quantity_available: Decimal,
    /// Lifecycle status
    pub status: LotStatus,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

/// Lifecycle status of a lot.
///
/// Only `Available` lots are candidates for allocation; depletion is not a
/// status but the condition `quantity_available == 0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    Available,
    Quarantined,
    Recalled,
}

impl LotStatus {
    /// Canonical string form, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            LotStatus::Available => "available",
            LotStatus::Quarantined => "quarantined",
            LotStatus::Recalled => "recalled",
        }
    }

    /// Parse the canonical string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(LotStatus::Available),
            "quarantined" => Some(LotStatus::Quarantined),
            "recalled" => Some(LotStatus::Recalled),
            _ => None,
        }
    }
}

impl Lot {
    /// Create a new available lot with the full received quantity on hand.
    pub fn new(
        lot_number: String,
        medication_code: String,
        location_code: String,
        quantity: Decimal,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            lot_number,
            medication_code,
            location_code,
            expiration_date: None,
            quantity_received: quantity,
            quantity_available: quantity,
            status: LotStatus::Available,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Whether this lot is past its expiration date on `reference_date`.
    ///
    /// Lots without a tracked expiration never expire.
    pub fn is_expired(&self, reference_date: NaiveDate) -> bool {
        match self.expiration_date {
            Some(expiration) => expiration < reference_date,
            None => false,
        }
    }

    /// Days from `reference_date` until expiry (negative once expired).
    pub fn days_until_expiry(&self, reference_date: NaiveDate) -> Option<i64> {
        self.expiration_date
            .map(|expiration| (expiration - reference_date).num_days())
    }
}
