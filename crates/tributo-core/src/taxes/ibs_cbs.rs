//! # IBS / CBS
//!
//! Tax-reform contributions (EC 132/2023): IBS (state and municipal shares)
//! and CBS (federal).
//!
//! ## Base
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  base = gross ± discount                                                │
//! │         ± round2(PIS)    + if add_pis_to_ibs_cbs_base,    − otherwise   │
//! │         ± round2(COFINS) + if add_cofins_to_ibs_cbs_base, − otherwise   │
//! │         ± round2(ICMS)   + if add_icms_to_ibs_cbs_base,   − otherwise   │
//! │         ± round2(ISSQN)  + if add_issqn_to_ibs_cbs_base,  − otherwise   │
//! │                                                                         │
//! │  ICMS is the orchestrated ICMS value; ISSQN is the service tax computed │
//! │  without withholdings.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each contribution is `round2(base × (rate × (1 − reduction / 100)) / 100)`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::TaxableItem;
use crate::money::{percent_of, reduction_factor, round_money};

/// Values of the other taxes that enter the IBS/CBS base.
///
/// Gathered by the orchestrator; rounding happens here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IbsCbsFacts {
    pub pis: Decimal,
    pub cofins: Decimal,
    pub icms: Decimal,
    pub issqn: Decimal,
}

/// Which share of the reform is being computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReformTax {
    IbsState,
    IbsMunicipal,
    Cbs,
}

impl ReformTax {
    fn rate_and_reduction(&self, item: &TaxableItem) -> (Decimal, Decimal) {
        match self {
            ReformTax::IbsState => (item.ibs_state_rate, item.ibs_state_reduction),
            ReformTax::IbsMunicipal => (item.ibs_municipal_rate, item.ibs_municipal_reduction),
            ReformTax::Cbs => (item.cbs_rate, item.cbs_reduction),
        }
    }
}

/// Base and rounded value of one share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbsCbsResult {
    pub base: Decimal,
    pub value: Decimal,
}

/// All three shares over one base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbsCbsTotals {
    pub base: Decimal,
    pub ibs: Decimal,
    pub ibs_municipal: Decimal,
    pub cbs: Decimal,
}

fn signed(add: bool, value: Decimal) -> Decimal {
    if add {
        round_money(value)
    } else {
        -round_money(value)
    }
}

/// Computes the shared IBS/CBS base.
pub fn base(item: &TaxableItem, facts: &IbsCbsFacts) -> Decimal {
    let amounts = item.amounts();
    let base = amounts.gross()
        + amounts.signed_discount()
        + signed(item.add_pis_to_ibs_cbs_base, facts.pis)
        + signed(item.add_cofins_to_ibs_cbs_base, facts.cofins)
        + signed(item.add_icms_to_ibs_cbs_base, facts.icms)
        + signed(item.add_issqn_to_ibs_cbs_base, facts.issqn);
    debug!(
        table = "IBS CBS Base",
        pis = %facts.pis,
        cofins = %facts.cofins,
        icms = %facts.icms,
        issqn = %facts.issqn,
        base = %base,
        "IBS/CBS base computed"
    );
    base
}

/// Applies one share's reduced rate to a base.
pub fn calculate(item: &TaxableItem, tax: ReformTax, base: Decimal) -> IbsCbsResult {
    let (rate, reduction) = tax.rate_and_reduction(item);
    let value = round_money(percent_of(base, rate * reduction_factor(reduction)));
    debug!(table = "IBS CBS Calculation", tax = ?tax, value = %value, "Reform contribution computed");
    IbsCbsResult { base, value }
}

/// Computes the three shares over a single base computation.
pub fn calculate_all(item: &TaxableItem, facts: &IbsCbsFacts) -> IbsCbsTotals {
    let base = base(item, facts);
    IbsCbsTotals {
        base,
        ibs: calculate(item, ReformTax::IbsState, base).value,
        ibs_municipal: calculate(item, ReformTax::IbsMunicipal, base).value,
        cbs: calculate(item, ReformTax::Cbs, base).value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item() -> TaxableItem {
        TaxableItem {
            product_value: dec!(1000),
            ibs_state_rate: dec!(0.1),
            ibs_municipal_rate: dec!(0.05),
            cbs_rate: dec!(0.9),
            ..Default::default()
        }
    }

    fn facts() -> IbsCbsFacts {
        IbsCbsFacts {
            pis: dec!(16.5),
            cofins: dec!(76),
            icms: dec!(180.004),
            issqn: dec!(0),
        }
    }

    #[test]
    fn test_base_subtracts_by_default() {
        // 1000 − 16.50 − 76.00 − 180.00 − 0
        assert_eq!(base(&item(), &facts()), dec!(727.50));
    }

    #[test]
    fn test_base_adds_flagged_values() {
        let item = TaxableItem {
            add_icms_to_ibs_cbs_base: true,
            add_pis_to_ibs_cbs_base: true,
            ..item()
        };
        // 1000 + 16.50 − 76.00 + 180.00
        assert_eq!(base(&item, &facts()), dec!(1120.50));
    }

    #[test]
    fn test_shares() {
        let totals = calculate_all(&item(), &facts());
        assert_eq!(totals.base, dec!(727.50));
        // 727.50 × 0.1% = 0.7275
        assert_eq!(totals.ibs, dec!(0.73));
        // 727.50 × 0.05% = 0.36375
        assert_eq!(totals.ibs_municipal, dec!(0.36));
        // 727.50 × 0.9% = 6.5475
        assert_eq!(totals.cbs, dec!(6.55));
    }

    #[test]
    fn test_reduction_applies_to_rate() {
        let item = TaxableItem {
            cbs_reduction: dec!(60),
            ..item()
        };
        // 1000 × (0.9 × 0.4)% = 3.6
        let result = calculate(&item, ReformTax::Cbs, dec!(1000));
        assert_eq!(result.value, dec!(3.60));
        assert_eq!(result.base, dec!(1000));
    }
}
