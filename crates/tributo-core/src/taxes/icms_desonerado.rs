//! # ICMS Desonerado
//!
//! ICMS waived by an exemption or base reduction, reported so the state can
//! track the fiscal benefit.
//!
//! ## Formulas
//! ```text
//! r = icms_rate / 100, red = icms_reduction / 100, B = ICMS base
//!
//! Simple  (BaseSimples)          B × r
//! GroupA  (BasePorDentro, 20/70) (B × (1 − r × (1 − red))) / (1 − r) − B
//! GroupB  (BasePorDentro, 30/40) (subtotal / (1 − r)) × r
//! Default (BasePorDentro, other) no formula → NoMatchingRule
//! ```
//!
//! The gross-up groups divide by `1 − r`; a 100% rate leaves nothing to
//! gross up and is reported as `NoMatchingRule` as well.
//!
//! GroupB grosses up the raw `product_value × quantity` subtotal rather than
//! the adjusted ICMS base. The value is rounded to cents.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dispatch::{desonerado_group, DesoneradoGroup};
use crate::error::{TaxError, TaxResult};
use crate::item::TaxableItem;
use crate::money::{round_money, HUNDRED};

/// Waived ICMS, rounded to cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcmsDesoneradoResult {
    pub value: Decimal,
}

/// Computes the waived ICMS over the ICMS base supplied by the orchestrator.
pub fn calculate(item: &TaxableItem, icms_base: Decimal) -> TaxResult<IcmsDesoneradoResult> {
    let Some(calculation) = item.desonerado_calculation else {
        return Ok(IcmsDesoneradoResult::default());
    };

    let group = desonerado_group(calculation, item.cst);
    let r = item.icms_rate / HUNDRED;
    let red = item.icms_reduction / HUNDRED;

    let inside = Decimal::ONE - r;
    let raw = match group {
        DesoneradoGroup::Simple => icms_base * r,
        DesoneradoGroup::GroupA | DesoneradoGroup::GroupB if inside.is_zero() => {
            let facts = format!("calculation={}, icms_rate={}", calculation, item.icms_rate);
            return Err(no_matching_rule(facts));
        }
        DesoneradoGroup::GroupA => {
            (icms_base * (Decimal::ONE - r * (Decimal::ONE - red))) / inside - icms_base
        }
        DesoneradoGroup::GroupB => (item.subtotal() / inside) * r,
        DesoneradoGroup::Default => {
            let facts = format!("calculation={}, cst={:?}", calculation, item.cst.map(|c| c.code()));
            return Err(no_matching_rule(facts));
        }
    };

    let value = round_money(raw);
    debug!(
        table = "ICMS Desonerado Calculation",
        group = %group,
        value = %value,
        "Waived ICMS computed"
    );
    Ok(IcmsDesoneradoResult { value })
}

fn no_matching_rule(facts: String) -> TaxError {
    warn!(table = "ICMS Desonerado Calculation", %facts, "No matching rule");
    TaxError::NoMatchingRule {
        table: "ICMS Desonerado Calculation",
        facts,
    }
}
