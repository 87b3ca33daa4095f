//! # Crédito de ICMS
//!
//! ICMS credit a simplified-regime seller may pass on to the buyer.
//!
//! ```text
//! document CTe → base = ICMS-ST value
//! otherwise    → base = ICMS base recomputed with reduction = 0
//! value = base × credit_rate / 100
//! ```
//!
//! The zero reduction is an explicit override on [`IcmsFacts`]; the item's
//! own reduction is never touched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::{LineAmounts, TaxableItem};
use crate::money::percent_of;
use crate::taxes::icms::IcmsFacts;
use crate::taxes::icms_st;
use crate::types::DocumentType;

/// Credit base and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditoIcmsResult {
    pub base: Decimal,
    pub value: Decimal,
}

/// Resolves the base the credit rate applies to.
pub fn credit_base(item: &TaxableItem, amounts: LineAmounts) -> Decimal {
    match item.document {
        Some(DocumentType::CTe) => icms_st::calculate(item, amounts).st_value,
        _ => IcmsFacts::from_item(item)
            .with_amounts(amounts)
            .with_reduction(Decimal::ZERO)
            .base(),
    }
}

/// Applies the credit rate to a resolved base.
pub fn calculate(base: Decimal, credit_rate: Decimal) -> CreditoIcmsResult {
    let value = percent_of(base, credit_rate);
    debug!(
        table = "Credito ICMS Calculation",
        base = %base,
        value = %value,
        "ICMS credit computed"
    );
    CreditoIcmsResult { base, value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_credit_base_ignores_reduction() {
        let item = TaxableItem {
            product_value: dec!(200),
            icms_reduction: dec!(50),
            credit_rate: dec!(2.56),
            ..Default::default()
        };
        let before = item.clone();
        let base = credit_base(&item, item.amounts());
        assert_eq!(base, dec!(200));
        assert_eq!(calculate(base, item.credit_rate).value, dec!(5.12));
        assert_eq!(item, before);
    }

    #[test]
    fn test_cte_credit_uses_st_value() {
        let item = TaxableItem {
            product_value: dec!(100),
            icms_rate: dec!(12),
            icms_st_rate: dec!(18),
            mva_rate: dec!(40),
            document: Some(DocumentType::CTe),
            ..Default::default()
        };
        assert_eq!(credit_base(&item, item.amounts()), dec!(13.20));
    }
}
