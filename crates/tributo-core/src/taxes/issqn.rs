//! # ISSQN
//!
//! Municipal service tax and the federal withholdings collected with it.
//!
//! ## Withholding Gates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base = gross ± discount                                                │
//! │                                                                         │
//! │  ISSQN  = apply_threshold(base × rate / 100, service_tax)               │
//! │                                                                         │
//! │  with withholdings:                                                     │
//! │    combined = base × (PIS% + COFINS% + CSLL%) / 100                     │
//! │    PIS, COFINS, CSLL = check_threshold(combined, federal, own amount)   │
//! │         └── one joint gate: all three kept or all three dropped        │
//! │    IRRF = apply_threshold(base × IRRF% / 100, irrf)                     │
//! │    INSS = apply_threshold(base × INSS% / 100, inss)                     │
//! │                                                                         │
//! │  without withholdings: every withholding is zero                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Thresholds come from [`WithholdingThresholds`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::WithholdingThresholds;
use crate::item::TaxableItem;
use crate::money::{apply_threshold, check_threshold, percent_of};

/// Service tax, withholdings and their bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssqnResult {
    pub base: Decimal,
    pub value: Decimal,
    pub withheld_pis: Decimal,
    pub withheld_cofins: Decimal,
    pub withheld_csll: Decimal,
    pub withheld_irrf: Decimal,
    pub withheld_inss: Decimal,
    pub inss_base: Decimal,
    pub irrf_base: Decimal,
    pub pis_base: Decimal,
    pub cofins_base: Decimal,
    pub csll_base: Decimal,
}

/// Computes ISSQN, with or without the federal withholdings.
pub fn calculate(
    item: &TaxableItem,
    with_withholdings: bool,
    thresholds: &WithholdingThresholds,
) -> IssqnResult {
    let amounts = item.amounts();
    let base = amounts.gross() + amounts.signed_discount();
    let value = apply_threshold(percent_of(base, item.issqn_rate), thresholds.service_tax);

    let mut result = IssqnResult {
        base,
        value,
        withheld_pis: Decimal::ZERO,
        withheld_cofins: Decimal::ZERO,
        withheld_csll: Decimal::ZERO,
        withheld_irrf: Decimal::ZERO,
        withheld_inss: Decimal::ZERO,
        inss_base: base,
        irrf_base: base,
        pis_base: base,
        cofins_base: base,
        csll_base: base,
    };

    if with_withholdings {
        let combined = percent_of(
            base,
            item.withheld_pis_rate + item.withheld_cofins_rate + item.withheld_csll_rate,
        );
        let gate = thresholds.federal_retentions;
        result.withheld_pis = check_threshold(combined, gate, percent_of(base, item.withheld_pis_rate));
        result.withheld_cofins =
            check_threshold(combined, gate, percent_of(base, item.withheld_cofins_rate));
        result.withheld_csll = check_threshold(combined, gate, percent_of(base, item.withheld_csll_rate));
        result.withheld_irrf =
            apply_threshold(percent_of(base, item.withheld_irrf_rate), thresholds.irrf);
        result.withheld_inss =
            apply_threshold(percent_of(base, item.withheld_inss_rate), thresholds.inss);
        debug!(combined = %combined, "Federal withholdings gated");
    }

    debug!(
        table = "ISSQN Tax Calculation",
        with_withholdings,
        base = %base,
        value = %value,
        "ISSQN computed"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn service(value: Decimal) -> TaxableItem {
        TaxableItem {
            product_value: value,
            is_service: true,
            issqn_rate: dec!(5),
            withheld_pis_rate: dec!(0.65),
            withheld_cofins_rate: dec!(3),
            withheld_csll_rate: dec!(1),
            withheld_irrf_rate: dec!(1.5),
            withheld_inss_rate: dec!(11),
            ..Default::default()
        }
    }

    #[test]
    fn test_issqn_with_withholdings() {
        let item = service(dec!(1000));
        let result = calculate(&item, true, &WithholdingThresholds::default());
        assert_eq!(result.base, dec!(1000));
        assert_eq!(result.value, dec!(50));
        // combined 46.50 > 10
        assert_eq!(result.withheld_pis, dec!(6.5));
        assert_eq!(result.withheld_cofins, dec!(30));
        assert_eq!(result.withheld_csll, dec!(10));
        assert_eq!(result.withheld_irrf, dec!(15));
        assert_eq!(result.withheld_inss, dec!(110));
        assert_eq!(result.csll_base, dec!(1000));
    }

    #[test]
    fn test_joint_gate_drops_all_three() {
        // combined = 200 × 4.65% = 9.30 ≤ 10
        let item = service(dec!(200));
        let result = calculate(&item, true, &WithholdingThresholds::default());
        assert_eq!(result.withheld_pis, dec!(0));
        assert_eq!(result.withheld_cofins, dec!(0));
        assert_eq!(result.withheld_csll, dec!(0));
        assert_eq!(result.value, dec!(0));
        assert_eq!(result.withheld_inss, dec!(0));
    }

    #[test]
    fn test_joint_gate_keeps_small_member() {
        // combined = 300 × 4.65% = 13.95 > 10: PIS 1.95 is kept though below 10
        let item = service(dec!(300));
        let result = calculate(&item, true, &WithholdingThresholds::default());
        assert_eq!(result.withheld_pis, dec!(1.95));
        assert_eq!(result.withheld_csll, dec!(3));
    }

    #[test]
    fn test_issqn_without_withholdings() {
        let item = service(dec!(1000));
        let result = calculate(&item, false, &WithholdingThresholds::default());
        assert_eq!(result.value, dec!(50));
        assert_eq!(result.withheld_pis, dec!(0));
        assert_eq!(result.withheld_inss, dec!(0));
        assert_eq!(result.irrf_base, dec!(1000));
    }

    #[test]
    fn test_service_tax_threshold_from_config() {
        let item = service(dec!(1000));
        let thresholds = WithholdingThresholds {
            service_tax: dec!(50),
            ..Default::default()
        };
        assert_eq!(calculate(&item, false, &thresholds).value, dec!(0));
    }
}
