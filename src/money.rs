// 💰 Money - exact decimal amounts
//
// Amounts are rust_decimal::Decimal end to end. Nothing in the engine goes
// through f64, so sums are exact and order-independent.

use crate::error::{LedgerError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Currency precision used for shares and reported percentages
pub const CENT_SCALE: u32 = 2;

/// One cent
pub fn cent() -> Decimal {
    Decimal::new(1, CENT_SCALE)
}

/// Round half away from zero to whole cents
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CENT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Magnitude of a signed amount (outflows are stored negative)
pub fn magnitude(amount: Decimal) -> Decimal {
    amount.abs()
}

/// `a + b`, failing instead of panicking past Decimal's range
pub fn checked_total(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal> {
    a.checked_add(b).ok_or(LedgerError::AmountOverflow { what })
}

/// `part / whole * 100`, or None when `whole` is zero
///
/// The result is not rounded; callers decide how to present it.
pub fn percentage_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

/// Split a non-negative amount into `parts` cent-exact shares.
///
/// The amount is first rounded to cents. Every share gets the truncated
/// quotient and the leftover cents go one each to the first shares, so the
/// shares always add back up to the rounded amount.
pub fn split_evenly(amount: Decimal, parts: usize) -> Vec<Decimal> {
    if parts == 0 {
        return Vec::new();
    }

    let total = round_cents(amount.abs());
    let count = Decimal::from(parts as u64);
    let base = (total / count).round_dp_with_strategy(CENT_SCALE, RoundingStrategy::ToZero);

    let leftover = total - base * count;
    let extra_cents = (leftover / cent()).trunc().to_usize().unwrap_or(0);

    (0..parts)
        .map(|i| if i < extra_cents { base + cent() } else { base })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
