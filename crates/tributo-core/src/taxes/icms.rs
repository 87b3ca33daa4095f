//! # ICMS
//!
//! State VAT on the circulation of goods: the module every other ICMS
//! variant builds on.
//!
//! ## Base Branches
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fixed asset │ discount       │ raw base                                │
//! │  ────────────┼────────────────┼──────────────────────────────────────── │
//! │  yes         │ Conditional    │ gross + IPI + discount                  │
//! │  yes         │ Unconditional  │ gross + IPI − discount                  │
//! │  no          │ Conditional    │ gross + discount                        │
//! │  no          │ Unconditional  │ gross − discount                        │
//! │                                                                         │
//! │  base  = raw × (1 − reduction / 100)                                    │
//! │  value = base × rate / 100          (unrounded)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## CST Post-Processing
//! - **51 (deferral)**, when the deferral rate is positive:
//!   `operation = round2(base × rate / 100)` (half to even),
//!   `deferred = round_up(operation × deferral / 100)` (away from zero),
//!   `value = operation − deferred`.
//! - **60 (ST already collected)**, when the effective rate is positive:
//!   the effective-rate sub-result is attached.
//!
//! ST and credit fields stay `None` here; the orchestrator fills them
//! according to the CST dispatch table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::dispatch::{cst_post_processing, CstPostProcessing};
use crate::item::{LineAmounts, TaxableItem};
use crate::money::{percent_of, reduction_factor, round_money, round_up_cents};
use crate::taxes::icms_efetivo;
use crate::types::DiscountType;

// =============================================================================
// Facts
// =============================================================================

/// Inputs of the ICMS base formula.
///
/// Built from the item and adjusted through explicit overrides, never by
/// touching the item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IcmsFacts {
    pub amounts: LineAmounts,
    pub rate: Decimal,
    pub reduction: Decimal,
}

impl IcmsFacts {
    pub fn from_item(item: &TaxableItem) -> Self {
        IcmsFacts {
            amounts: item.amounts(),
            rate: item.icms_rate,
            reduction: item.icms_reduction,
        }
    }

    /// Replaces the base reduction (credit uses zero).
    pub fn with_reduction(mut self, reduction: Decimal) -> Self {
        self.reduction = reduction;
        self
    }

    /// Replaces the line amounts.
    pub fn with_amounts(mut self, amounts: LineAmounts) -> Self {
        self.amounts = amounts;
        self
    }

    /// Taxable base of the four-branch formula.
    pub fn base(&self) -> Decimal {
        self.amounts.raw_base() * reduction_factor(self.reduction)
    }
}

// =============================================================================
// Result
// =============================================================================

/// How the taxable base was determined (modalidade de determinação da BC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseDetermination {
    /// Value of the operation.
    OperationValue,
    /// Value-added margin (MVA), used by ST.
    ValueAddedMargin,
}

impl fmt::Display for BaseDetermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseDetermination::OperationValue => write!(f, "ValorOperacao"),
            BaseDetermination::ValueAddedMargin => write!(f, "MargemValorAgregado"),
        }
    }
}

/// ICMS result with the CST-specific sub-fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcmsResult {
    pub base: Decimal,
    pub value: Decimal,

    // Echoed rates
    pub rate: Decimal,
    pub reduction: Decimal,
    pub st_rate: Decimal,
    pub mva_rate: Decimal,
    pub st_reduction: Decimal,
    pub deferral_rate: Decimal,

    // Merged by the orchestrator (CST 10/30/70/90)
    pub st_base: Option<Decimal>,
    pub st_value: Option<Decimal>,

    // CST 51
    pub operation_value: Option<Decimal>,
    pub deferred_value: Option<Decimal>,

    // CST 60
    pub st_retained_base: Decimal,
    pub effective_base: Option<Decimal>,
    pub effective_value: Option<Decimal>,

    // Merged by the orchestrator (CST 90)
    pub credit_rate: Option<Decimal>,
    pub credit_value: Option<Decimal>,

    pub base_mode: BaseDetermination,
    pub st_base_mode: Option<BaseDetermination>,
}

// =============================================================================
// Calculation
// =============================================================================

fn branch_label(amounts: &LineAmounts) -> &'static str {
    match (amounts.include_ipi, amounts.discount_type) {
        (true, DiscountType::Conditional) => "fixed asset, conditional discount",
        (true, DiscountType::Unconditional) => "fixed asset, unconditional discount",
        (false, DiscountType::Conditional) => "conditional discount",
        (false, DiscountType::Unconditional) => "unconditional discount",
    }
}

/// Computes ICMS for the item under the given facts.
pub fn calculate(item: &TaxableItem, facts: IcmsFacts) -> IcmsResult {
    let base = facts.base();
    let mut value = percent_of(base, facts.rate);
    debug!(
        table = "ICMS Calculation",
        branch = branch_label(&facts.amounts),
        base = %base,
        value = %value,
        "ICMS base branch selected"
    );

    let mut operation_value = None;
    let mut deferred_value = None;
    let mut effective_base = None;
    let mut effective_value = None;

    match item.cst.and_then(cst_post_processing) {
        Some(CstPostProcessing::Deferral) if item.deferral_rate > Decimal::ZERO => {
            let operation = round_money(percent_of(base, facts.rate));
            let deferred = round_up_cents(percent_of(operation, item.deferral_rate));
            value = operation - deferred;
            debug!(
                table = "CST Post-Processing",
                step = "deferral",
                operation = %operation,
                deferred = %deferred,
                value = %value,
                "ICMS deferral applied"
            );
            operation_value = Some(operation);
            deferred_value = Some(deferred);
        }
        Some(CstPostProcessing::Effective) if item.effective_icms_rate > Decimal::ZERO => {
            let effective = icms_efetivo::calculate(item, facts.amounts);
            debug!(table = "CST Post-Processing", step = "effective", "Effective ICMS attached");
            effective_base = Some(effective.base);
            effective_value = Some(effective.value);
        }
        _ => {}
    }

    IcmsResult {
        base,
        value,
        rate: facts.rate,
        reduction: facts.reduction,
        st_rate: item.icms_st_rate,
        mva_rate: item.mva_rate,
        st_reduction: item.icms_st_reduction,
        deferral_rate: item.deferral_rate,
        st_base: None,
        st_value: None,
        operation_value,
        deferred_value,
        st_retained_base: item.product_value,
        effective_base,
        effective_value,
        credit_rate: None,
        credit_value: None,
        base_mode: BaseDetermination::OperationValue,
        st_base_mode: (item.mva_rate > Decimal::ZERO).then_some(BaseDetermination::ValueAddedMargin),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cst;
    use rust_decimal_macros::dec;

    fn line(fixed: bool, discount_type: DiscountType) -> TaxableItem {
        TaxableItem {
            product_value: dec!(100),
            ipi_value: dec!(10),
            discount: dec!(5),
            is_fixed_asset_or_consumption: fixed,
            discount_type,
            icms_rate: dec!(18),
            ..Default::default()
        }
    }

    #[test]
    fn test_icms_fixed_asset_conditional() {
        let item = line(true, DiscountType::Conditional);
        let result = calculate(&item, IcmsFacts::from_item(&item));
        assert_eq!(result.base, dec!(115));
        assert_eq!(result.value, dec!(20.70));
    }

    #[test]
    fn test_icms_four_branches() {
        let cases = [
            (true, DiscountType::Conditional, dec!(115)),
            (true, DiscountType::Unconditional, dec!(105)),
            (false, DiscountType::Conditional, dec!(105)),
            (false, DiscountType::Unconditional, dec!(95)),
        ];
        for (fixed, discount_type, expected) in cases {
            let item = line(fixed, discount_type);
            let result = calculate(&item, IcmsFacts::from_item(&item));
            assert_eq!(result.base, expected, "fixed={} discount={}", fixed, discount_type);
            assert_eq!(result.value, expected * dec!(0.18));
        }
    }

    #[test]
    fn test_icms_reduction() {
        let item = TaxableItem {
            icms_reduction: dec!(40),
            ..line(false, DiscountType::Unconditional)
        };
        let result = calculate(&item, IcmsFacts::from_item(&item));
        assert_eq!(result.base, dec!(57));
        assert_eq!(result.value, dec!(10.26));
        assert_eq!(result.reduction, dec!(40));
    }

    #[test]
    fn test_icms_value_is_unrounded() {
        let item = TaxableItem {
            product_value: dec!(10.01),
            icms_rate: dec!(17),
            ..Default::default()
        };
        let result = calculate(&item, IcmsFacts::from_item(&item));
        assert_eq!(result.value, dec!(1.7017));
    }

    #[test]
    fn test_cst_51_deferral_rounds_away_from_zero() {
        let item = TaxableItem {
            product_value: dec!(100),
            icms_rate: dec!(17),
            deferral_rate: dec!(10.01),
            cst: Some(Cst::Deferred),
            ..Default::default()
        };
        let result = calculate(&item, IcmsFacts::from_item(&item));
        // 17.00 × 10.01% = 1.7017 → 1.71 (half-even would give 1.70)
        assert_eq!(result.operation_value, Some(dec!(17.00)));
        assert_eq!(result.deferred_value, Some(dec!(1.71)));
        assert_eq!(result.value, dec!(15.29));
    }

    #[test]
    fn test_cst_51_without_deferral_rate() {
        let item = TaxableItem {
            product_value: dec!(100),
            icms_rate: dec!(17),
            cst: Some(Cst::Deferred),
            ..Default::default()
        };
        let result = calculate(&item, IcmsFacts::from_item(&item));
        assert_eq!(result.value, dec!(17));
        assert!(result.deferred_value.is_none());
    }

    #[test]
    fn test_cst_60_attaches_effective() {
        let item = TaxableItem {
            product_value: dec!(100),
            cst: Some(Cst::StCollectedPreviously),
            effective_icms_rate: dec!(12),
            ..Default::default()
        };
        let result = calculate(&item, IcmsFacts::from_item(&item));
        assert_eq!(result.effective_base, Some(dec!(100)));
        assert_eq!(result.effective_value, Some(dec!(12)));
        assert_eq!(result.st_retained_base, dec!(100));
    }

    #[test]
    fn test_echo_fields_and_modes() {
        let item = TaxableItem {
            mva_rate: dec!(40),
            icms_st_rate: dec!(18),
            ..line(false, DiscountType::Unconditional)
        };
        let result = calculate(&item, IcmsFacts::from_item(&item));
        assert_eq!(result.base_mode, BaseDetermination::OperationValue);
        assert_eq!(result.st_base_mode, Some(BaseDetermination::ValueAddedMargin));
        assert_eq!(result.st_rate, dec!(18));
        assert!(result.st_base.is_none());
        assert!(result.credit_value.is_none());

        let plain = line(false, DiscountType::Unconditional);
        assert!(calculate(&plain, IcmsFacts::from_item(&plain)).st_base_mode.is_none());
    }

    #[test]
    fn test_reduction_override_is_local() {
        let item = TaxableItem {
            icms_reduction: dec!(40),
            ..line(false, DiscountType::Unconditional)
        };
        let facts = IcmsFacts::from_item(&item).with_reduction(Decimal::ZERO);
        assert_eq!(facts.base(), dec!(95));
        assert_eq!(item.icms_reduction, dec!(40));
    }
}
