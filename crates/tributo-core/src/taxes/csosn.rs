//! # CSOSN
//!
//! ICMS for companies under the simplified regime (Simples Nacional).
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  csosn_dispatch(code) ──► own? ST? credit? effective? + mode            │
//! │                                                                         │
//! │  ST requested → IPI = round2(IPI module) for EVERY sub-calculation      │
//! │                                                                         │
//! │  own ICMS   → icms::calculate                                           │
//! │  ST         → icms_st::calculate                                        │
//! │  credit     → ICMS base with reduction = 0, whatever the document       │
//! │  effective  → icms_efetivo::calculate                                   │
//! │                                                                         │
//! │  Unknown code → mode Unknown, every optional field None, no error       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dispatch::{csosn_dispatch, CsosnMode};
use crate::item::TaxableItem;
use crate::money::round_money;
use crate::taxes::icms::{self, IcmsFacts};
use crate::taxes::{credito_icms, icms_efetivo, icms_st, ipi};

/// Simplified-regime ICMS. Sub-results stay `None` unless their
/// sub-calculation ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsosnResult {
    pub csosn: u16,

    pub icms_base: Option<Decimal>,
    pub icms_value: Option<Decimal>,
    pub icms_rate: Option<Decimal>,
    pub icms_reduction: Option<Decimal>,

    pub st_base: Option<Decimal>,
    pub st_value: Option<Decimal>,
    pub st_rate: Option<Decimal>,
    pub mva_rate: Option<Decimal>,
    pub st_reduction: Option<Decimal>,

    pub credit_value: Option<Decimal>,
    pub credit_rate: Option<Decimal>,

    pub effective_base: Option<Decimal>,
    pub effective_value: Option<Decimal>,
    pub effective_rate: Option<Decimal>,
    pub effective_reduction: Option<Decimal>,

    pub mode: CsosnMode,
}

impl CsosnResult {
    fn empty(csosn: u16, mode: CsosnMode) -> Self {
        CsosnResult {
            csosn,
            icms_base: None,
            icms_value: None,
            icms_rate: None,
            icms_reduction: None,
            st_base: None,
            st_value: None,
            st_rate: None,
            mva_rate: None,
            st_reduction: None,
            credit_value: None,
            credit_rate: None,
            effective_base: None,
            effective_value: None,
            effective_rate: None,
            effective_reduction: None,
            mode,
        }
    }
}

pub fn calculate(item: &TaxableItem) -> CsosnResult {
    let dispatch = csosn_dispatch(item.csosn);
    let mut result = CsosnResult::empty(item.csosn, dispatch.mode);

    let mut amounts = item.amounts();
    if dispatch.st {
        let ipi_value = round_money(ipi::calculate(amounts, item.ipi_rate).value);
        debug!(ipi = %ipi_value, "IPI fixed for CSOSN sub-calculations");
        amounts = amounts.with_ipi_value(ipi_value);
    }

    if dispatch.own_icms {
        let own = icms::calculate(item, IcmsFacts::from_item(item).with_amounts(amounts));
        result.icms_base = Some(own.base);
        result.icms_value = Some(own.value);
        result.icms_rate = Some(item.icms_rate);
        result.icms_reduction = Some(item.icms_reduction);
    }

    if dispatch.st {
        let st = icms_st::calculate(item, amounts);
        result.st_base = Some(st.st_base);
        result.st_value = Some(st.st_value);
        result.st_rate = Some(item.icms_st_rate);
        result.mva_rate = Some(item.mva_rate);
        result.st_reduction = Some(item.icms_st_reduction);
    }

    if dispatch.credit {
        let base = IcmsFacts::from_item(item)
            .with_amounts(amounts)
            .with_reduction(Decimal::ZERO)
            .base();
        let credit = credito_icms::calculate(base, item.credit_rate);
        result.credit_value = Some(credit.value);
        result.credit_rate = Some(item.credit_rate);
    }

    if dispatch.effective {
        let effective = icms_efetivo::calculate(item, amounts);
        result.effective_base = Some(effective.base);
        result.effective_value = Some(effective.value);
        result.effective_rate = Some(effective.rate);
        result.effective_reduction = Some(effective.reduction);
    }

    result
}
