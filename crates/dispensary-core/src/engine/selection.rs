//! Validation of pharmacist-picked lot selections.
//!
//! A manual selection bypasses the FEFO walk but not the checks: every
//! picked lot must exist in the candidate snapshot with enough stock, and
//! expired lots are blocked by the same override rule as automatic plans.

use std::collections::HashSet;

use chrono::NaiveDate;

use super::{check_request, expiry, validate, AllocationError, AllocationResult};
use crate::models::{AllocationPlan, AllocationRequest, Lot};
use rust_decimal::Decimal;

/// One pharmacist-picked (lot, quantity) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedLot {
    pub lot_number: String,
    pub quantity: Decimal,
}

/// Validate a manual selection against the candidate snapshot and build a
/// plan from it.
///
/// Lines keep the pharmacist's order. A selection covering less than the
/// requested quantity yields a plan with a shortfall, not an error; the
/// typed errors are reserved for per-lot violations.
pub fn validate_selection(
    candidates: &[Lot],
    selection: &[SelectedLot],
    request: &AllocationRequest,
    reference_date: NaiveDate,
) -> AllocationResult<AllocationPlan> {
    check_request(request)?;

    let mut seen: HashSet<&str> = HashSet::new();
    let mut lines = Vec::with_capacity(selection.len());

    for picked in selection {
        if !seen.insert(picked.lot_number.as_str()) {
            return Err(AllocationError::InvalidRequest(format!(
                "lot {} selected more than once",
                picked.lot_number
            )));
        }
        if picked.quantity <= Decimal::ZERO {
            return Err(AllocationError::InvalidRequest(format!(
                "selected quantity for lot {} must be positive",
                picked.lot_number
            )));
        }

        let lot = candidates
            .iter()
            .find(|lot| lot.lot_number == picked.lot_number)
            .ok_or_else(|| AllocationError::UnknownLot(picked.lot_number.clone()))?;

        if picked.quantity > lot.quantity_available {
            return Err(AllocationError::OverAllocated {
                lot_number: picked.lot_number.clone(),
                selected: picked.quantity,
                available: lot.quantity_available,
            });
        }

        lines.push(expiry::annotate(
            picked.lot_number.clone(),
            picked.quantity,
            lot.expiration_date,
            reference_date,
            request.warning_horizon_days,
        ));
    }

    validate::finalize(request, lines)
}
