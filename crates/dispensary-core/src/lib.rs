//! Dispensary Core Library
//!
//! FEFO (First-Expired-First-Out) lot allocation for pharmacy dispensing.
//!
//! # Architecture
//!
//! ```text
//! Lot Store (SQLite) ──► Candidate Snapshot
//!                              │
//!                    ┌─────────▼─────────┐
//!                    │   FEFO Allocator  │  dated lots first, soonest
//!                    │  (greedy, pure)   │  expiry first, then undated
//!                    └─────────┬─────────┘
//!                              │
//!                    Expiry Risk Classifier
//!                    (safe / expiring soon / expired)
//!                              │
//!                    Allocation Validator
//!                    (expired blocking, shortfall, flags)
//!                              │
//!                       AllocationPlan ──► Database::commit_plan
//!                                          (check-then-decrement,
//!                                           rejects stale snapshots)
//! ```
//!
//! # Core Principle
//!
//! **The engine never mutates stock.** Planning is a pure, deterministic
//! transform over a lot snapshot; committing the decrements is a separate,
//! transactional store operation that re-validates availability, so a
//! rejected commit is resolved by simply planning again.
//!
//! # Modules
//!
//! - [`db`]: SQLite store with the lot inventory view, medication catalog,
//!   movement ledger, and plan commit
//! - [`models`]: Domain types (Lot, AllocationRequest, AllocationPlan, etc.)
//! - [`engine`]: FEFO allocator, risk classifier, validators, planner facade
//! - [`export`]: Expiring-stock and reorder reports (JSON/CSV)

pub mod db;
pub mod engine;
pub mod export;
pub mod models;

// Re-export commonly used types
pub use db::{Database, DbError, DbResult};
pub use engine::{
    plan_allocation, AllocationError, AllocationResult, Planner, SelectedLot,
};
pub use export::{ExpiryReport, ReorderReport};
pub use models::{
    AllocationLine, AllocationPlan, AllocationRequest, Lot, LotStatus, Medication,
    MovementKind, RiskLevel, StockMovement, DEFAULT_WARNING_HORIZON_DAYS,
};
