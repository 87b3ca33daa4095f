//! # ICMS-ST
//!
//! ICMS collected in advance by substitution (substituição tributária).
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Resolve IPI                                                         │
//! │     IPI rate > 0 and IPI value = 0 → round2(IPI module value)           │
//! │     otherwise                      → IPI value from the facts           │
//! │                                                                         │
//! │  2. Own operation = ICMS module with IPI forced OUT of the base         │
//! │                                                                         │
//! │  3. baseST  = ((gross + IPI) ± discount)                                │
//! │               × (1 − reductionST / 100) × (1 + MVA / 100)               │
//! │     valueST = baseST × rateST / 100 − own value                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! IPI enters the ST base exactly once (step 3) and never through the own
//! operation (step 2), whatever the fixed-asset flag says.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::{LineAmounts, TaxableItem};
use crate::money::{percent_of, reduction_factor, round_money, HUNDRED};
use crate::taxes::icms::{self, IcmsFacts};
use crate::taxes::ipi;

/// Own-operation and substitution bases and values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcmsStResult {
    pub own_base: Decimal,
    pub own_value: Decimal,
    pub st_base: Decimal,
    pub st_value: Decimal,
}

/// Returns the IPI value the ST base should use.
pub fn resolve_ipi(item: &TaxableItem, amounts: LineAmounts) -> Decimal {
    if item.ipi_rate > Decimal::ZERO && amounts.ipi_value.is_zero() {
        let computed = round_money(ipi::calculate(amounts, item.ipi_rate).value);
        debug!(ipi = %computed, "IPI computed for ST base");
        computed
    } else {
        amounts.ipi_value
    }
}

/// Computes ICMS-ST for the item.
///
/// `amounts` carries any IPI override the caller has already resolved.
pub fn calculate(item: &TaxableItem, amounts: LineAmounts) -> IcmsStResult {
    let ipi_value = resolve_ipi(item, amounts);
    let amounts = amounts.with_ipi_value(ipi_value);

    let own_facts = IcmsFacts::from_item(item).with_amounts(amounts.without_ipi());
    let own = icms::calculate(item, own_facts);

    let margin = Decimal::ONE + item.mva_rate / HUNDRED;
    let st_base = (amounts.gross() + ipi_value + amounts.signed_discount())
        * reduction_factor(item.icms_st_reduction)
        * margin;
    let st_value = percent_of(st_base, item.icms_st_rate) - own.value;

    debug!(
        table = "ICMS ST Calculation",
        discount_type = %amounts.discount_type,
        own_value = %own.value,
        st_base = %st_base,
        st_value = %st_value,
        "ICMS ST computed"
    );

    IcmsStResult {
        own_base: own.base,
        own_value: own.value,
        st_base,
        st_value,
    }
}
