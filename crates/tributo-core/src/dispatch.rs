//! # Dispatch Tables
//!
//! Categorical decisions that pick which sub-calculations run and which
//! formula branch applies.
//!
//! ## Tables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Dispatch Tables                                │
//! │                                                                         │
//! │  cst_dispatch            Cst   → run ICMS / ST / credit / FCP + mode    │
//! │  cst_post_processing     Cst   → deferral (51) | effective (60) | none  │
//! │  csosn_dispatch          u16   → own / ST / credit / effective + mode   │
//! │  desonerado_group        (calculation, Cst) → Simple | A | B | Default  │
//! │  effective_preprocessing (rate, fixed asset) → skip | fold IPI | as-is  │
//! │                                                                         │
//! │  Strict lookups fail with NoMatchingRule when nothing matches.         │
//! │  Non-strict lookups (post-processing) simply have nothing to do.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every table is a closed `match`: adding a code to [`Cst`] does not compile
//! until each table decides what to do with it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::types::{Csosn, Cst, DesoneradoCalculation};

// =============================================================================
// CST Dispatch
// =============================================================================

/// Calculation mode selected by the CST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CstMode {
    IcmsOnly,
    IcmsWithSt,
    IcmsWithReduction,
    StOnly,
    Exempt,
    NotTaxed,
    Suspension,
    Deferral,
    StAlreadyCollected,
    IcmsWithReductionAndSt,
    Other,
    SinglePhase,
}

impl CstMode {
    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            CstMode::IcmsOnly => "ICMS Only",
            CstMode::IcmsWithSt => "ICMS + ST",
            CstMode::IcmsWithReduction => "ICMS with Reduction",
            CstMode::StOnly => "ST Only",
            CstMode::Exempt => "Exempt",
            CstMode::NotTaxed => "Not Taxed",
            CstMode::Suspension => "Suspension",
            CstMode::Deferral => "Deferral",
            CstMode::StAlreadyCollected => "ST Already Collected",
            CstMode::IcmsWithReductionAndSt => "ICMS with Reduction + ST",
            CstMode::Other => "Other",
            CstMode::SinglePhase => "Single-Phase",
        }
    }
}

impl fmt::Display for CstMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sub-calculations a CST asks for.
///
/// The ST and credit flags are further gated by the orchestrator on the
/// relevant rates being non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CstDispatch {
    pub icms: bool,
    pub st: bool,
    pub credit: bool,
    pub fcp: bool,
    pub mode: CstMode,
}

impl CstDispatch {
    const fn new(icms: bool, st: bool, credit: bool, fcp: bool, mode: CstMode) -> Self {
        CstDispatch {
            icms,
            st,
            credit,
            fcp,
            mode,
        }
    }
}

/// Looks up the dispatch row of a CST.
pub fn cst_dispatch(cst: Cst) -> CstDispatch {
    let dispatch = match cst {
        Cst::FullyTaxed => CstDispatch::new(true, false, false, false, CstMode::IcmsOnly),
        Cst::TaxedWithSt => CstDispatch::new(true, true, false, false, CstMode::IcmsWithSt),
        Cst::ReducedBase => CstDispatch::new(true, false, false, false, CstMode::IcmsWithReduction),
        Cst::ExemptWithSt => CstDispatch::new(false, true, false, false, CstMode::StOnly),
        Cst::Exempt => CstDispatch::new(false, false, false, false, CstMode::Exempt),
        Cst::NotTaxed => CstDispatch::new(false, false, false, false, CstMode::NotTaxed),
        Cst::Suspended => CstDispatch::new(false, false, false, false, CstMode::Suspension),
        Cst::Deferred => CstDispatch::new(true, false, false, false, CstMode::Deferral),
        Cst::StCollectedPreviously => {
            CstDispatch::new(false, false, false, false, CstMode::StAlreadyCollected)
        }
        Cst::ReducedBaseWithSt => {
            CstDispatch::new(true, true, false, false, CstMode::IcmsWithReductionAndSt)
        }
        Cst::Other => CstDispatch::new(true, true, true, true, CstMode::Other),
        Cst::MonophasicOwn
        | Cst::MonophasicWithRetention
        | Cst::MonophasicDeferred
        | Cst::MonophasicPreviouslyWithheld => {
            CstDispatch::new(false, false, false, false, CstMode::SinglePhase)
        }
    };
    debug!(cst = %cst, mode = %dispatch.mode, "CST dispatch");
    dispatch
}

// =============================================================================
// CST Post-Processing
// =============================================================================

/// Extra step applied to the ICMS result after its base formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CstPostProcessing {
    /// CST 51: split the operation value into paid and deferred parts.
    Deferral,
    /// CST 60: attach the effective-rate sub-result.
    Effective,
}

/// Non-strict lookup: only CST 51 and 60 have a row.
pub fn cst_post_processing(cst: Cst) -> Option<CstPostProcessing> {
    match cst {
        Cst::Deferred => Some(CstPostProcessing::Deferral),
        Cst::StCollectedPreviously => Some(CstPostProcessing::Effective),
        _ => None,
    }
}

// =============================================================================
// CSOSN Dispatch
// =============================================================================

/// Calculation mode selected by the CSOSN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CsosnMode {
    CreditOnly,
    Exempt,
    CreditAndSt,
    StOnly,
    Effective,
    All,
    /// Code outside the CSOSN table.
    Unknown,
}

impl CsosnMode {
    pub const fn label(&self) -> &'static str {
        match self {
            CsosnMode::CreditOnly => "Credito Only",
            CsosnMode::Exempt => "Exempt",
            CsosnMode::CreditAndSt => "Credito + ST",
            CsosnMode::StOnly => "ST Only",
            CsosnMode::Effective => "CSOSN 500 Efetivo",
            CsosnMode::All => "All (900)",
            CsosnMode::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CsosnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sub-calculations a CSOSN asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsosnDispatch {
    pub own_icms: bool,
    pub st: bool,
    pub credit: bool,
    pub effective: bool,
    pub mode: CsosnMode,
}

impl CsosnDispatch {
    const fn new(own_icms: bool, st: bool, credit: bool, effective: bool, mode: CsosnMode) -> Self {
        CsosnDispatch {
            own_icms,
            st,
            credit,
            effective,
            mode,
        }
    }
}

/// Looks up the dispatch row of a raw CSOSN.
///
/// Unknown codes never fail: they yield [`CsosnMode::Unknown`] with every
/// flag off.
pub fn csosn_dispatch(code: u16) -> CsosnDispatch {
    let dispatch = match Csosn::try_from(code) {
        Ok(Csosn::CreditPermitted) => {
            CsosnDispatch::new(false, false, true, false, CsosnMode::CreditOnly)
        }
        Ok(
            Csosn::NoCredit | Csosn::RevenueBandExempt | Csosn::Immune | Csosn::NotTaxed,
        ) => CsosnDispatch::new(false, false, false, false, CsosnMode::Exempt),
        Ok(Csosn::CreditWithSt) => {
            CsosnDispatch::new(false, true, true, false, CsosnMode::CreditAndSt)
        }
        Ok(Csosn::NoCreditWithSt | Csosn::RevenueBandExemptWithSt) => {
            CsosnDispatch::new(false, true, false, false, CsosnMode::StOnly)
        }
        Ok(Csosn::StCollectedPreviously) => {
            CsosnDispatch::new(false, false, false, true, CsosnMode::Effective)
        }
        Ok(Csosn::Other) => CsosnDispatch::new(true, true, true, false, CsosnMode::All),
        Err(_) => {
            warn!(csosn = code, "CSOSN not in dispatch table");
            CsosnDispatch::new(false, false, false, false, CsosnMode::Unknown)
        }
    };
    debug!(csosn = code, mode = %dispatch.mode, "CSOSN dispatch");
    dispatch
}

// =============================================================================
// ICMS Desonerado Classification
// =============================================================================

/// CST group used by the desonerado formula table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesoneradoGroup {
    /// BaseSimples, any CST.
    Simple,
    /// BasePorDentro with CST 20 or 70.
    GroupA,
    /// BasePorDentro with CST 30 or 40.
    GroupB,
    /// Nothing more specific matched.
    Default,
}

impl fmt::Display for DesoneradoGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesoneradoGroup::Simple => write!(f, "Simple"),
            DesoneradoGroup::GroupA => write!(f, "GroupA"),
            DesoneradoGroup::GroupB => write!(f, "GroupB"),
            DesoneradoGroup::Default => write!(f, "Default"),
        }
    }
}

/// First-hit classification.
pub fn desonerado_group(calculation: DesoneradoCalculation, cst: Option<Cst>) -> DesoneradoGroup {
    match (calculation, cst) {
        (DesoneradoCalculation::BaseSimples, _) => DesoneradoGroup::Simple,
        (
            DesoneradoCalculation::BasePorDentro,
            Some(Cst::ReducedBase | Cst::ReducedBaseWithSt),
        ) => DesoneradoGroup::GroupA,
        (DesoneradoCalculation::BasePorDentro, Some(Cst::ExemptWithSt | Cst::Exempt)) => {
            DesoneradoGroup::GroupB
        }
        (DesoneradoCalculation::BasePorDentro, _) => DesoneradoGroup::Default,
    }
}

// =============================================================================
// ICMS Efetivo Preprocessing
// =============================================================================

/// Adjustment applied before the effective-rate formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectivePreprocessing {
    /// Rate not positive: result is zero.
    Skip,
    /// Fixed asset: IPI is folded into other expenses.
    FoldIpi,
    /// Use the line as it is.
    AsIs,
}

/// First-hit preprocessing lookup.
pub fn effective_preprocessing(rate: Decimal, is_fixed_asset: bool) -> EffectivePreprocessing {
    if rate <= Decimal::ZERO {
        EffectivePreprocessing::Skip
    } else if is_fixed_asset {
        EffectivePreprocessing::FoldIpi
    } else {
        EffectivePreprocessing::AsIs
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
