//! Allocation request model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Medication;

/// Default number of days before expiry at which a lot counts as
/// expiring soon.
pub const DEFAULT_WARNING_HORIZON_DAYS: u32 = 30;

/// Input to the allocation engine: what to dispense, from where, and how
/// expiry risk should be judged.
///
/// The warning horizon and expired-override flag travel with the request so
/// the engine never reads ambient configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationRequest {
    /// Medication to allocate
    pub medication_code: String,
    /// Location to allocate from
    pub location_code: String,
    /// Quantity to dispense (must be positive)
    pub quantity_requested: Decimal,
    /// Lots expiring within this many days are flagged as expiring soon
    pub warning_horizon_days: u32,
    /// Permit allocation of already-expired lots
    pub allow_expired_override: bool,
}

impl AllocationRequest {
    /// Create a request with the default warning horizon and no expired
    /// override.
    pub fn new(
        medication_code: String,
        location_code: String,
        quantity_requested: Decimal,
    ) -> Self {
        Self {
            medication_code,
            location_code,
            quantity_requested,
            warning_horizon_days: DEFAULT_WARNING_HORIZON_DAYS,
            allow_expired_override: false,
        }
    }

    /// Create a request using the medication's configured expiry alert
    /// window as the warning horizon.
    pub fn for_medication(
        medication: &Medication,
        location_code: String,
        quantity_requested: Decimal,
    ) -> Self {
        Self {
            medication_code: medication.code.clone(),
            location_code,
            quantity_requested,
            warning_horizon_days: medication.expiry_alert_days,
            allow_expired_override: false,
        }
    }
}
