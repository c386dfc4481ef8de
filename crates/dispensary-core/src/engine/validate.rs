//! Plan-level validation: risk flags, shortfall, expired blocking.

use rust_decimal::Decimal;

use super::{AllocationError, AllocationResult};
use crate::models::{AllocationLine, AllocationPlan, AllocationRequest, RiskLevel};

/// Assemble the final plan from risk-annotated lines.
///
/// Expired lines fail the plan with [`AllocationError::ExpiredLotBlocked`]
/// unless the request grants the override, in which case the plan is
/// returned with `has_expired_lots_used` set so the caller can log the
/// override. Shortfall is always a reported field, never an error.
pub fn finalize(
    request: &AllocationRequest,
    lines: Vec<AllocationLine>,
) -> AllocationResult<AllocationPlan> {
    let expired_lots: Vec<String> = lines
        .iter()
        .filter(|line| line.risk_level == RiskLevel::Expired)
        .map(|line| line.lot_number.clone())
        .collect();

    if !expired_lots.is_empty() && !request.allow_expired_override {
        return Err(AllocationError::ExpiredLotBlocked {
            lot_numbers: expired_lots,
        });
    }

    let quantity_allocated_total: Decimal =
        lines.iter().map(|line| line.quantity_allocated).sum();
    let shortfall = (request.quantity_requested - quantity_allocated_total).max(Decimal::ZERO);

    Ok(AllocationPlan {
        medication_code: request.medication_code.clone(),
        location_code: request.location_code.clone(),
        has_expired_lots_used: !expired_lots.is_empty(),
        has_expiring_soon_lots_used: lines
            .iter()
            .any(|line| line.risk_level == RiskLevel::ExpiringSoon),
        quantity_requested: request.quantity_requested,
        quantity_allocated_total,
        shortfall,
        lines,
    })
}
