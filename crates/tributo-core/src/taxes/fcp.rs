//! # FCP (Fundo de Combate à Pobreza)
//!
//! State poverty-fund surcharge, in its three flavours:
//!
//! ```text
//! FCP          base = ICMS base                 value = base × fcp% / 100
//! FCP-ST       base = ((gross + IPI) ± discount) × (1 + MVA / 100)
//!                                               value = base × fcpST% / 100
//! FCP-ST ret.  base = last retained ST base × quantity
//!                                               value = base × retained% / 100
//! ```
//!
//! FCP-ST takes IPI straight from the IPI module, unrounded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::TaxableItem;
use crate::money::{percent_of, HUNDRED};
use crate::taxes::ipi;

/// Base and value of one FCP flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcpResult {
    pub base: Decimal,
    pub value: Decimal,
}

/// FCP over the ICMS base computed by the ICMS operation.
pub fn calculate(item: &TaxableItem, icms_base: Decimal) -> FcpResult {
    let value = percent_of(icms_base, item.fcp_rate);
    debug!(table = "FCP Calculation", base = %icms_base, value = %value, "FCP computed");
    FcpResult {
        base: icms_base,
        value,
    }
}

pub fn calculate_st(item: &TaxableItem) -> FcpResult {
    let amounts = item.amounts();
    let ipi_value = ipi::calculate(amounts, item.ipi_rate).value;
    let base = (amounts.gross() + ipi_value + amounts.signed_discount())
        * (Decimal::ONE + item.mva_rate / HUNDRED);
    let value = percent_of(base, item.fcp_st_rate);
    debug!(
        table = "FCP ST Calculation",
        ipi = %ipi_value,
        base = %base,
        value = %value,
        "FCP-ST computed"
    );
    FcpResult { base, value }
}

pub fn calculate_st_retained(item: &TaxableItem) -> FcpResult {
    let base = item.last_st_retained_base * item.quantity;
    let value = percent_of(base, item.fcp_st_retained_rate);
    debug!(
        table = "FCP ST Retido Calculation",
        base = %base,
        value = %value,
        "Retained FCP-ST computed"
    );
    FcpResult { base, value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fcp_on_icms_base() {
        let item = TaxableItem {
            fcp_rate: dec!(2),
            ..Default::default()
        };
        let result = calculate(&item, dec!(80));
        assert_eq!(result.base, dec!(80));
        assert_eq!(result.value, dec!(1.6));
    }

    #[test]
    fn test_fcp_st_uses_unrounded_ipi() {
        let item = TaxableItem {
            product_value: dec!(100.05),
            ipi_rate: dec!(5),
            mva_rate: dec!(40),
            fcp_st_rate: dec!(2),
            ..Default::default()
        };
        let result = calculate_st(&item);
        // IPI 5.0025 kept as is: (100.05 + 5.0025) × 1.4 = 147.0735
        assert_eq!(result.base, dec!(147.0735));
        assert_eq!(result.value, dec!(2.94147));
    }

    #[test]
    fn test_fcp_st_with_discount() {
        let item = TaxableItem {
            product_value: dec!(100),
            discount: dec!(10),
            ipi_rate: dec!(10),
            mva_rate: dec!(50),
            fcp_st_rate: dec!(1),
            ..Default::default()
        };
        // IPI = 9 on (100 − 10); base = (100 + 9 − 10) × 1.5
        let result = calculate_st(&item);
        assert_eq!(result.base, dec!(148.5));
        assert_eq!(result.value, dec!(1.485));
    }

    #[test]
    fn test_fcp_st_retained() {
        let item = TaxableItem {
            quantity: dec!(3),
            last_st_retained_base: dec!(50),
            fcp_st_retained_rate: dec!(2),
            ..Default::default()
        };
        let result = calculate_st_retained(&item);
        assert_eq!(result.base, dec!(150));
        assert_eq!(result.value, dec!(3));
    }
}
