//! # ICMS Efetivo
//!
//! Informational ICMS at the effective consumer rate, reported on CST 60 and
//! CSOSN 500 lines where the tax was already collected upstream by ST.
//!
//! ```text
//! rate ≤ 0             → zero result
//! rate > 0, fixed asset → other_expenses' = other_expenses + IPI
//! base  = (gross' ± discount) × (1 − effective_reduction / 100)
//! value = base × effective_rate / 100
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dispatch::{effective_preprocessing, EffectivePreprocessing};
use crate::item::{LineAmounts, TaxableItem};
use crate::money::{percent_of, reduction_factor};

/// Effective-rate base and value, with the rates used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcmsEfetivoResult {
    pub base: Decimal,
    pub value: Decimal,
    pub rate: Decimal,
    pub reduction: Decimal,
}

/// Computes the effective-rate ICMS.
///
/// `amounts` carries the IPI value to fold; whether to fold it follows the
/// item's fixed-asset flag.
pub fn calculate(item: &TaxableItem, amounts: LineAmounts) -> IcmsEfetivoResult {
    let rate = item.effective_icms_rate;
    let reduction = item.effective_icms_reduction;

    let amounts = match effective_preprocessing(rate, item.is_fixed_asset_or_consumption) {
        EffectivePreprocessing::Skip => {
            debug!(table = "ICMS Efetivo Preprocessing", rate = %rate, "Effective rate not positive");
            return IcmsEfetivoResult {
                base: Decimal::ZERO,
                value: Decimal::ZERO,
                rate,
                reduction,
            };
        }
        EffectivePreprocessing::FoldIpi => {
            amounts.with_other_expenses(amounts.other_expenses + amounts.ipi_value)
        }
        EffectivePreprocessing::AsIs => amounts,
    };

    let base = (amounts.gross() + amounts.signed_discount()) * reduction_factor(reduction);
    let value = percent_of(base, rate);
    debug!(
        table = "ICMS Efetivo Calculation",
        base = %base,
        value = %value,
        "Effective ICMS computed"
    );

    IcmsEfetivoResult {
        base,
        value,
        rate,
        reduction,
    }
}
