//! # IPI
//!
//! Federal excise on manufactured goods.
//!
//! `base = gross ± discount`, `value = base × rate / 100`. The value is left
//! unrounded; callers that feed it into another base round it themselves.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::LineAmounts;
use crate::money::percent_of;

/// IPI base and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpiResult {
    pub base: Decimal,
    pub value: Decimal,
}

/// Computes IPI over the line. The IPI share of `amounts` is ignored.
pub fn calculate(amounts: LineAmounts, rate: Decimal) -> IpiResult {
    let base = amounts.gross() + amounts.signed_discount();
    let value = percent_of(base, rate);
    debug!(
        table = "IPI Calculation",
        discount_type = %amounts.discount_type,
        base = %base,
        value = %value,
        "IPI computed"
    );
    IpiResult { base, value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::TaxableItem;
    use crate::types::DiscountType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ipi_unconditional_discount() {
        let item = TaxableItem {
            product_value: dec!(100),
            quantity: dec!(3),
            freight: dec!(20),
            discount: dec!(20),
            ..Default::default()
        };
        let result = calculate(item.amounts(), dec!(15));
        assert_eq!(result.base, dec!(300));
        assert_eq!(result.value, dec!(45));
    }

    #[test]
    fn test_ipi_conditional_discount_and_unrounded_value() {
        let item = TaxableItem {
            product_value: dec!(10.01),
            discount: dec!(1),
            discount_type: DiscountType::Conditional,
            ..Default::default()
        };
        let result = calculate(item.amounts(), dec!(6.5));
        assert_eq!(result.base, dec!(11.01));
        assert_eq!(result.value, dec!(0.71565));
    }

    #[test]
    fn test_ipi_ignores_known_ipi_value() {
        let item = TaxableItem {
            product_value: dec!(50),
            ipi_value: dec!(7),
            is_fixed_asset_or_consumption: true,
            ..Default::default()
        };
        assert_eq!(calculate(item.amounts(), dec!(10)).base, dec!(50));
    }
}
