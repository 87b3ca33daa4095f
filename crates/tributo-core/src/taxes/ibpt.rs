//! # IBPT Transparency Totals
//!
//! Approximate tax burden printed on consumer receipts (Lei 12.741/2012),
//! from the IBPT average rates of the product.
//!
//! `base = product_value × quantity − discount`; each total is
//! `base × rate / 100`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::TaxableItem;
use crate::money::percent_of;

/// Approximate tax burden per sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbptResult {
    pub base: Decimal,
    pub federal: Decimal,
    pub state: Decimal,
    pub municipal: Decimal,
    pub imported_federal: Decimal,
}

pub fn calculate(item: &TaxableItem) -> IbptResult {
    let base = item.subtotal() - item.discount;
    let result = IbptResult {
        base,
        federal: percent_of(base, item.ibpt_federal_rate),
        state: percent_of(base, item.ibpt_state_rate),
        municipal: percent_of(base, item.ibpt_municipal_rate),
        imported_federal: percent_of(base, item.ibpt_imported_federal_rate),
    };
    debug!(
        table = "IBPT Calculation",
        base = %base,
        federal = %result.federal,
        state = %result.state,
        "Transparency totals computed"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ibpt_totals() {
        let item = TaxableItem {
            product_value: dec!(50),
            quantity: dec!(2),
            discount: dec!(10),
            freight: dec!(30),
            ibpt_federal_rate: dec!(13.45),
            ibpt_state_rate: dec!(18),
            ibpt_municipal_rate: dec!(0),
            ibpt_imported_federal_rate: dec!(20),
            ..Default::default()
        };
        let result = calculate(&item);
        // Freight stays out of the transparency base
        assert_eq!(result.base, dec!(90));
        assert_eq!(result.federal, dec!(12.105));
        assert_eq!(result.state, dec!(16.2));
        assert_eq!(result.municipal, dec!(0));
        assert_eq!(result.imported_federal, dec!(18));
    }
}
