//! # Money Module
//!
//! Decimal helpers shared by every tax formula.
//!
//! ## Why Exact Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Tax modules feed each other (ICMS → PIS/COFINS → IBS/CBS), so one     │
//! │  stray digit in ICMS shows up as a wrong cent three modules later.     │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal everywhere                         │
//! │    Values stay unrounded inside a module and are rounded to cents      │
//! │    only at the boundaries the statutes name.                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Modes
//! | Helper            | Strategy              | Used by                          |
//! |-------------------|-----------------------|----------------------------------|
//! | `round_money`     | half to even          | PIS/COFINS, IBS/CBS, ST IPI ...  |
//! | `round_up_cents`  | away from zero        | CST 51 deferred portion          |
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use tributo_core::money::{percent_of, round_money};
//!
//! let base = Decimal::new(11500, 2); // 115.00
//! let rate = Decimal::new(18, 0);    // 18%
//! assert_eq!(round_money(percent_of(base, rate)), Decimal::new(2070, 2));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};

/// 100, the denominator of every percentage.
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Number of decimal places of a cent-denominated amount.
pub const MONEY_SCALE: u32 = 2;

// =============================================================================
// Rounding
// =============================================================================

/// Rounds to cents using Bankers Rounding (round half to even).
///
/// ## Bankers Rounding Explained
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │  BANKERS ROUNDING (Round Half to Even)                              │
/// │                                                                     │
/// │    0.125 → 0.12, 0.135 → 0.14, 0.1251 → 0.13                       │
/// │                                                                     │
/// │  This is the default quantize mode of the statutory formulas, so   │
/// │  every "rounded to two decimals" boundary goes through here.        │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Rounds to cents away from zero: any remainder bumps the last cent.
///
/// Only the CST 51 deferred portion uses this mode.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tributo_core::money::round_up_cents;
///
/// // 100.005 × 50% = 50.0025 → 50.01
/// assert_eq!(round_up_cents(Decimal::new(500025, 4)), Decimal::new(5001, 2));
/// ```
#[inline]
pub fn round_up_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::AwayFromZero)
}

// =============================================================================
// Percentages
// =============================================================================

/// `value × rate / 100`, unrounded.
#[inline]
pub fn percent_of(value: Decimal, rate: Decimal) -> Decimal {
    value * rate / HUNDRED
}

/// `1 − reduction / 100`, the factor a base-reduction percentage leaves.
#[inline]
pub fn reduction_factor(reduction: Decimal) -> Decimal {
    Decimal::ONE - reduction / HUNDRED
}

// =============================================================================
// Withholding Thresholds
// =============================================================================

/// Returns `value` when it exceeds `limit`, zero otherwise.
///
/// A value exactly equal to the limit is NOT kept.
#[inline]
pub fn apply_threshold(value: Decimal, limit: Decimal) -> Decimal {
    if value > limit {
        value
    } else {
        Decimal::ZERO
    }
}

/// Returns `value` when `test` exceeds `limit`, zero otherwise.
///
/// Lets several withholdings share one gate: PIS, COFINS and CSLL are all
/// kept or all dropped depending on their combined amount.
#[inline]
pub fn check_threshold(test: Decimal, limit: Decimal, value: Decimal) -> Decimal {
    if test > limit {
        value
    } else {
        Decimal::ZERO
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
