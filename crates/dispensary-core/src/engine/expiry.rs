//! Expiry risk classification.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{AllocationLine, RiskLevel};

/// Classify an expiration date relative to a reference date.
///
/// Policy: no expiration date is `Safe` (untracked stock carries no known
/// risk); a date before the reference is `Expired`; a date within the
/// closed interval `[reference, reference + horizon]` is `ExpiringSoon`;
/// anything later is `Safe`.
pub fn classify(
    expiration_date: Option<NaiveDate>,
    reference_date: NaiveDate,
    warning_horizon_days: u32,
) -> RiskLevel {
    let Some(expiration) = expiration_date else {
        return RiskLevel::Safe;
    };

    if expiration < reference_date {
        return RiskLevel::Expired;
    }

    let horizon_end = reference_date + Duration::days(i64::from(warning_horizon_days));
    if expiration <= horizon_end {
        RiskLevel::ExpiringSoon
    } else {
        RiskLevel::Safe
    }
}

/// Build a risk-annotated allocation line for a lot take.
pub fn annotate(
    lot_number: String,
    quantity_allocated: Decimal,
    expiration_date: Option<NaiveDate>,
    reference_date: NaiveDate,
    warning_horizon_days: u32,
) -> AllocationLine {
    AllocationLine {
        risk_level: classify(expiration_date, reference_date, warning_horizon_days),
        days_until_expiry: expiration_date
            .map(|expiration| (expiration - reference_date).num_days()),
        lot_number,
        quantity_allocated,
        expiration_date,
    }
}
