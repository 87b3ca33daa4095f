//! # ICMS Monofásico
//!
//! Single-phase ICMS on fuels, charged per unit (ad-rem) instead of on value.
//!
//! | CST | Output                                                            |
//! |-----|-------------------------------------------------------------------|
//! | 02  | own = qty × adRem                                                 |
//! | 15  | own = qty × (1 − bio%) × adRem × (1 − adRemReduction%)            |
//! |     | retention = qty × bio% × adRem × origin%                          |
//! | 53  | operation = qty × adRem; deferred = operation × origin%;          |
//! |     | own = operation − deferred                                        |
//! | 61  | previously withheld = priorQty × priorAdRem                       |
//!
//! Any other CST (or none) yields an all-zero result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::TaxableItem;
use crate::money::{percent_of, reduction_factor, HUNDRED};
use crate::types::Cst;

/// Single-phase amounts. Fields a CST does not produce stay zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcmsMonofasicoResult {
    pub own_value: Decimal,
    pub retention_value: Decimal,
    pub operation_value: Decimal,
    pub deferred_value: Decimal,
    pub previously_withheld_value: Decimal,
}

pub fn calculate(item: &TaxableItem) -> IcmsMonofasicoResult {
    let qty = item.monophasic_quantity;
    let ad_rem = item.ad_rem_rate;

    let result = match item.cst {
        Some(Cst::MonophasicOwn) => IcmsMonofasicoResult {
            own_value: qty * ad_rem,
            ..Default::default()
        },
        Some(Cst::MonophasicWithRetention) => {
            let own_qty = qty * reduction_factor(item.biodiesel_rate);
            let reduced_rate = ad_rem * reduction_factor(item.ad_rem_reduction);
            let retained_qty = qty * (item.biodiesel_rate / HUNDRED);
            IcmsMonofasicoResult {
                own_value: own_qty * reduced_rate,
                retention_value: percent_of(retained_qty * ad_rem, item.origin_state_rate),
                ..Default::default()
            }
        }
        Some(Cst::MonophasicDeferred) => {
            let operation = qty * ad_rem;
            let deferred = percent_of(operation, item.origin_state_rate);
            IcmsMonofasicoResult {
                own_value: operation - deferred,
                operation_value: operation,
                deferred_value: deferred,
                ..Default::default()
            }
        }
        Some(Cst::MonophasicPreviouslyWithheld) => IcmsMonofasicoResult {
            previously_withheld_value: item.prior_monophasic_quantity * item.prior_ad_rem_rate,
            ..Default::default()
        },
        _ => return IcmsMonofasicoResult::default(),
    };

    debug!(
        table = "ICMS Monofasico Calculation",
        cst = ?item.cst,
        own = %result.own_value,
        "Single-phase ICMS computed"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fuel(cst: Cst) -> TaxableItem {
        TaxableItem {
            cst: Some(cst),
            monophasic_quantity: dec!(1000),
            ad_rem_rate: dec!(1.2571),
            ad_rem_reduction: dec!(10),
            biodiesel_rate: dec!(12),
            origin_state_rate: dec!(40),
            prior_monophasic_quantity: dec!(500),
            prior_ad_rem_rate: dec!(1.1),
            ..Default::default()
        }
    }

    #[test]
    fn test_cst_02() {
        let result = calculate(&fuel(Cst::MonophasicOwn));
        assert_eq!(result.own_value, dec!(1257.1));
        assert_eq!(result.retention_value, dec!(0));
        assert_eq!(result.previously_withheld_value, dec!(0));
    }

    #[test]
    fn test_cst_15() {
        let result = calculate(&fuel(Cst::MonophasicWithRetention));
        // 880 × 1.13139
        assert_eq!(result.own_value, dec!(995.6232));
        // 120 × 1.2571 × 40%
        assert_eq!(result.retention_value, dec!(60.3408));
    }

    #[test]
    fn test_cst_53() {
        let result = calculate(&fuel(Cst::MonophasicDeferred));
        assert_eq!(result.operation_value, dec!(1257.1));
        assert_eq!(result.deferred_value, dec!(502.84));
        assert_eq!(result.own_value, dec!(754.26));
    }

    #[test]
    fn test_cst_61() {
        let result = calculate(&fuel(Cst::MonophasicPreviouslyWithheld));
        assert_eq!(result.previously_withheld_value, dec!(550));
        assert_eq!(result.own_value, dec!(0));
    }

    #[test]
    fn test_other_cst_is_zero() {
        assert_eq!(calculate(&fuel(Cst::FullyTaxed)), IcmsMonofasicoResult::default());
        let no_cst = TaxableItem {
            cst: None,
            ..fuel(Cst::MonophasicOwn)
        };
        assert_eq!(calculate(&no_cst), IcmsMonofasicoResult::default());
    }
}
