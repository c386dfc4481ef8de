//! Allocation plan models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Expiry risk of a lot relative to a reference date and warning horizon.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// No tracked expiry, or expiry beyond the warning horizon
    Safe,
    /// Expires within the warning horizon
    ExpiringSoon,
    /// Already past its expiration date
    Expired,
}

/// One (lot, quantity) pairing in an allocation plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationLine {
    /// Lot the quantity is taken from
    pub lot_number: String,
    /// Quantity taken from this lot (positive)
    pub quantity_allocated: Decimal,
    /// The lot's expiration date, if tracked
    pub expiration_date: Option<NaiveDate>,
    /// Days from the reference date until expiry (negative once expired)
    pub days_until_expiry: Option<i64>,
    /// Expiry risk at the reference date
    pub risk_level: RiskLevel,
}

/// The engine's output: an ordered, immutable dispensing plan.
///
/// Lines appear in allocation order (earliest-expiring first). The plan is a
/// value; committing the corresponding stock decrements is the store's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationPlan {
    /// Medication the plan was computed for
    pub medication_code: String,
    /// Location the plan draws from
    pub location_code: String,
    /// Allocation lines, earliest-expiring first
    pub lines: Vec<AllocationLine>,
    /// Quantity originally requested
    pub quantity_requested: Decimal,
    /// Sum of all line quantities
    pub quantity_allocated_total: Decimal,
    /// Requested quantity that could not be covered (zero when complete)
    pub shortfall: Decimal,
    /// Any line draws on an expired lot
    pub has_expired_lots_used: bool,
    /// Any line draws on a lot expiring within the warning horizon
    pub has_expiring_soon_lots_used: bool,
}

impl AllocationPlan {
    /// Whether the requested quantity was fully covered.
    pub fn is_complete(&self) -> bool {
        self.shortfall.is_zero()
    }

    /// Lot numbers of all lines at the given risk level.
    pub fn lots_at_risk(&self, risk_level: RiskLevel) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|line| line.risk_level == risk_level)
            .map(|line| line.lot_number.as_str())
            .collect()
    }

    /// Human-readable summary of the plan, one line per lot, for display to
    /// the dispensing pharmacist.
    pub fn render_summary(&self) -> String {
        if self.lines.is_empty() && self.shortfall.is_zero() {
            return "Nothing to allocate".to_string();
        }

        let mut out = Vec::new();
        for line in &self.lines {
            let expiry = match line.expiration_date {
                Some(date) => format!("exp {}", date),
                None => "no tracked expiry".to_string(),
            };
            let risk = match line.risk_level {
                RiskLevel::Safe => "",
                RiskLevel::ExpiringSoon => " [EXPIRING SOON]",
                RiskLevel::Expired => " [EXPIRED]",
            };
            out.push(format!(
                "- {}: {} ({}){}",
                line.lot_number, line.quantity_allocated, expiry, risk
            ));
        }

        if !self.shortfall.is_zero() {
            out.push(format!("Still short {} units", self.shortfall));
        }

        out.join("\n")
    }
}
