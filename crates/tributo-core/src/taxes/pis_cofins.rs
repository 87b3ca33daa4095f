//! # PIS / COFINS
//!
//! Federal social contributions sharing one formula family.
//!
//! ## Branches
//! Eight exclusive branches keyed by fixed asset × deduct ICMS × discount
//! type, all reducing to:
//! ```text
//! base  = ((gross + IPI if fixed asset − round2(ICMS) if deducted)
//!          × (1 − reduction / 100)) ± discount
//! value = round2(base × rate / 100)
//! ```
//! Note the discount is applied AFTER the reduction, unlike ICMS.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::{LineAmounts, TaxableItem};
use crate::money::{percent_of, reduction_factor, round_money};

/// Which contribution is being computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    Pis,
    Cofins,
}

impl Contribution {
    fn label(&self) -> &'static str {
        match self {
            Contribution::Pis => "PIS",
            Contribution::Cofins => "COFINS",
        }
    }
}

/// Inputs of the PIS/COFINS formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PisCofinsFacts {
    pub amounts: LineAmounts,
    pub rate: Decimal,
    pub reduction: Decimal,
    /// ICMS value (already rounded) subtracted from the base, or zero.
    pub icms_deduction: Decimal,
}

impl PisCofinsFacts {
    /// Facts for one contribution; `icms_value` is only used when the item
    /// asks for the ICMS deduction.
    pub fn for_contribution(item: &TaxableItem, contribution: Contribution, icms_value: Decimal) -> Self {
        let (rate, reduction) = match contribution {
            Contribution::Pis => (item.pis_rate, item.pis_reduction),
            Contribution::Cofins => (item.cofins_rate, item.cofins_reduction),
        };
        let icms_deduction = if item.deduct_icms_from_pis_cofins {
            round_money(icms_value)
        } else {
            Decimal::ZERO
        };
        PisCofinsFacts {
            amounts: item.amounts(),
            rate,
            reduction,
            icms_deduction,
        }
    }
}

/// Base and rounded value of one contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PisCofinsResult {
    pub base: Decimal,
    pub value: Decimal,
}

pub fn calculate(contribution: Contribution, facts: PisCofinsFacts) -> PisCofinsResult {
    let amounts = facts.amounts;
    let before_reduction = amounts.gross() + amounts.ipi_share() - facts.icms_deduction;
    let base = before_reduction * reduction_factor(facts.reduction) + amounts.signed_discount();
    let value = round_money(percent_of(base, facts.rate));
    debug!(
        table = "PIS/COFINS Calculation",
        contribution = contribution.label(),
        fixed_asset = amounts.include_ipi,
        deducts_icms = !facts.icms_deduction.is_zero(),
        base = %base,
        value = %value,
        "Contribution computed"
    );
    PisCofinsResult { base, value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DiscountType;
    use rust_decimal_macros::dec;

    fn item() -> TaxableItem {
        TaxableItem {
            product_value: dec!(1000),
            discount: dec!(100),
            ipi_value: dec!(50),
            pis_rate: dec!(1.65),
            cofins_rate: dec!(7.6),
            ..Default::default()
        }
    }

    #[test]
    fn test_pis_plain() {
        let item = item();
        let result = calculate(Contribution::Pis, PisCofinsFacts::for_contribution(&item, Contribution::Pis, dec!(0)));
        assert_eq!(result.base, dec!(900));
        assert_eq!(result.value, dec!(14.85));
    }

    #[test]
    fn test_cofins_uses_its_own_rate() {
        let item = item();
        let facts = PisCofinsFacts::for_contribution(&item, Contribution::Cofins, dec!(0));
        assert_eq!(calculate(Contribution::Cofins, facts).value, dec!(68.40));
    }

    #[test]
    fn test_icms_deduction_is_rounded_and_optional() {
        let item = TaxableItem {
            deduct_icms_from_pis_cofins: true,
            ..item()
        };
        let facts = PisCofinsFacts::for_contribution(&item, Contribution::Pis, dec!(162.004));
        assert_eq!(facts.icms_deduction, dec!(162.00));
        // 1000 − 162 − 100 = 738
        assert_eq!(calculate(Contribution::Pis, facts).base, dec!(738));

        let plain = self::item();
        let facts = PisCofinsFacts::for_contribution(&plain, Contribution::Pis, dec!(162.004));
        assert_eq!(facts.icms_deduction, dec!(0));
    }

    #[test]
    fn test_discount_applied_after_reduction() {
        let item = TaxableItem {
            pis_reduction: dec!(50),
            discount_type: DiscountType::Conditional,
            is_fixed_asset_or_consumption: true,
            ..item()
        };
        let result = calculate(Contribution::Pis, PisCofinsFacts::for_contribution(&item, Contribution::Pis, dec!(0)));
        // (1000 + 50) × 0.5 + 100 = 625
        assert_eq!(result.base, dec!(625));
        assert_eq!(result.value, dec!(10.31));
    }
}
