//! FEFO allocation engine.
//!
//! Pipeline: Candidate Lots → FEFO Allocation → Risk Classification → Validation
//!
//! The engine is a stateless transform: it reads a snapshot of lots and
//! returns an [`AllocationPlan`] value. Committing the plan's stock
//! decrements is the store's job ([`Database::commit_plan`]), and a commit
//! rejected as stale is resolved by simply re-running the planner, since
//! the allocation is deterministic for identical input.
//!
//! [`Database::commit_plan`]: crate::db::Database::commit_plan

mod expiry;
mod fefo;
mod selection;
mod validate;

pub use expiry::*;
pub use fefo::*;
pub use selection::*;
pub use validate::*;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::db::Database;
use crate::models::{AllocationPlan, AllocationRequest, Lot};

/// Allocation errors.
#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("expired lots blocked from dispensing: {}", .lot_numbers.join(", "))]
    ExpiredLotBlocked { lot_numbers: Vec<String> },

    #[error("unknown lot in selection: {0}")]
    UnknownLot(String),

    #[error("lot {lot_number}: selected {selected} exceeds available {available}")]
    OverAllocated {
        lot_number: String,
        selected: Decimal,
        available: Decimal,
    },

    #[error("database error: {0}")]
    Database(#[from] crate::db::DbError),
}

pub type AllocationResult<T> = Result<T, AllocationError>;

/// Compute an allocation plan from a candidate snapshot.
///
/// Pure: no store and no clock; the reference date for expiry judgment is
/// an explicit argument. Identical inputs always produce the identical plan.
pub fn plan_allocation(
    candidates: &[Lot],
    request: &AllocationRequest,
    reference_date: NaiveDate,
) -> AllocationResult<AllocationPlan> {
    // Step 1: Reject malformed requests before touching any stock
    check_request(request)?;

    // Step 2: FEFO-order the candidates and allocate greedily
    let takes = fefo::allocate(candidates, request.quantity_requested);

    // Step 3: Annotate each take with its expiry risk
    let lines = takes
        .into_iter()
        .map(|take| {
            expiry::annotate(
                take.lot_number,
                take.quantity,
                take.expiration_date,
                reference_date,
                request.warning_horizon_days,
            )
        })
        .collect();

    // Step 4: Apply plan-level validation (expired blocking, flags, shortfall)
    validate::finalize(request, lines)
}

pub(crate) fn check_request(request: &AllocationRequest) -> AllocationResult<()> {
    if request.medication_code.trim().is_empty() {
        return Err(AllocationError::InvalidRequest(
            "medication code is required".into(),
        ));
    }
    if request.location_code.trim().is_empty() {
        return Err(AllocationError::InvalidRequest(
            "location code is required".into(),
        ));
    }
    if request.quantity_requested <= Decimal::ZERO {
        return Err(AllocationError::InvalidRequest(format!(
            "requested quantity must be positive, got {}",
            request.quantity_requested
        )));
    }
    Ok(())
}

/// Store-backed planner that fetches the candidate snapshot and delegates
/// to the pure engine.
pub struct Planner<'a> {
    db: &'a Database,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Plan a dispense against current stock.
    pub fn plan(
        &self,
        request: &AllocationRequest,
        reference_date: NaiveDate,
    ) -> AllocationResult<AllocationPlan> {
        let candidates = self
            .db
            .candidate_lots(&request.medication_code, &request.location_code)?;
        plan_allocation(&candidates, request, reference_date)
    }

    /// Validate a pharmacist-picked lot selection against current stock.
    pub fn validate_selection(
        &self,
        request: &AllocationRequest,
        selection: &[SelectedLot],
        reference_date: NaiveDate,
    ) -> AllocationResult<AllocationPlan> {
        let candidates = self
            .db
            .candidate_lots(&request.medication_code, &request.location_code)?;
        selection::validate_selection(&candidates, selection, request, reference_date)
    }
}
