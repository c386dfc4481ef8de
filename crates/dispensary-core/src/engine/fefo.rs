//! First-Expired-First-Out ordering and greedy allocation.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::Lot;

/// One lot take chosen by the greedy walk, before risk annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct LotTake {
    pub lot_number: String,
    pub quantity: Decimal,
    pub expiration_date: Option<NaiveDate>,
}

/// Order candidates for consumption: dated lots ascending by
/// `(expiration_date, lot_number)`, then undated lots by `lot_number`.
///
/// Undated lots come last: they carry no known expiry risk to burn down,
/// so dated stock is always consumed first. The lot-number tie-break makes
/// the order total, so identical input always yields identical output.
pub fn fefo_order(candidates: &[Lot]) -> Vec<&Lot> {
    let mut dated: Vec<&Lot> = candidates
        .iter()
        .filter(|lot| lot.expiration_date.is_some())
        .collect();
    let mut undated: Vec<&Lot> = candidates
        .iter()
        .filter(|lot| lot.expiration_date.is_none())
        .collect();

    dated.sort_by(|a, b| {
        a.expiration_date
            .cmp(&b.expiration_date)
            .then_with(|| a.lot_number.cmp(&b.lot_number))
    });
    undated.sort_by(|a, b| a.lot_number.cmp(&b.lot_number));

    dated.extend(undated);
    dated
}

/// Greedily allocate the requested quantity across candidates in FEFO
/// order: `min(remaining, available)` from each lot until the request is
/// covered or the candidates run out.
///
/// Any uncovered remainder is the caller's shortfall; zero-quantity lots
/// never contribute lines.
pub fn allocate(candidates: &[Lot], quantity_requested: Decimal) -> Vec<LotTake> {
    let mut remaining = quantity_requested;
    let mut takes = Vec::new();

    for lot in fefo_order(candidates) {
        if remaining <= Decimal::ZERO {
            break;
        }
        if lot.quantity_available <= Decimal::ZERO {
            continue;
        }

        let quantity = remaining.min(lot.quantity_available);
        takes.push(LotTake {
            lot_number: lot.lot_number.clone(),
            quantity,
            expiration_date: lot.expiration_date,
        });
        remaining -= quantity;
    }

    takes
}
