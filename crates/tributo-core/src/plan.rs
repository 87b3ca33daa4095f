//! # Calculation Registry & Execution Plan
//!
//! Names every calculation the engine can run, declares what each one
//! depends on, and orders a request so dependencies run first.
//!
//! ## Dependency Graph
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  icms ──┬──► pis, cofins, fcp, icms_desonerado                          │
//! │         ├──► icms_st ◄── ipi                                            │
//! │         │       └──► credito_icms                                       │
//! │         └──► csosn ◄── ipi, icms_st, credito_icms, icms_efetivo         │
//! │                                                                         │
//! │  pis + cofins + icms + issqn ──► ibs_cbs, ibs, ibs_municipal, cbs       │
//! │  ipi ──► fcp_st                                                         │
//! │                                                                         │
//! │  composite ◄── the eleven parts of the breakdown, in COMPOSITE_ORDER    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! [`ExecutionPlan::resolve`] is a depth-first topological sort: each
//! requested kind is emitted after its dependencies, and requested kinds
//! keep their relative order whenever the graph allows it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::composite::TaxBreakdown;
use crate::error::{TaxError, TaxResult};
use crate::taxes::credito_icms::CreditoIcmsResult;
use crate::taxes::csosn::CsosnResult;
use crate::taxes::difal::DifalResult;
use crate::taxes::fcp::FcpResult;
use crate::taxes::ibpt::IbptResult;
use crate::taxes::ibs_cbs::{IbsCbsResult, IbsCbsTotals};
use crate::taxes::icms::IcmsResult;
use crate::taxes::icms_desonerado::IcmsDesoneradoResult;
use crate::taxes::icms_efetivo::IcmsEfetivoResult;
use crate::taxes::icms_monofasico::IcmsMonofasicoResult;
use crate::taxes::icms_st::IcmsStResult;
use crate::taxes::ipi::IpiResult;
use crate::taxes::issqn::IssqnResult;
use crate::taxes::pis_cofins::PisCofinsResult;

// =============================================================================
// Calculation Kind
// =============================================================================

/// Every calculation a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CalculationKind {
    Icms,
    IcmsSt,
    Ipi,
    Pis,
    Cofins,
    /// ISSQN with the federal withholdings.
    Issqn,
    IcmsEfetivo,
    IcmsMonofasico,
    IcmsDesonerado,
    CreditoIcms,
    Csosn,
    /// IBS, IBS-municipal and CBS over one base.
    IbsCbs,
    Ibs,
    IbsMunicipal,
    Cbs,
    Difal,
    Fcp,
    FcpSt,
    FcpStRetido,
    Ibpt,
    /// The full breakdown.
    Composite,
}

/// Parts of the breakdown, in the order they are computed.
pub const COMPOSITE_ORDER: [CalculationKind; 11] = [
    CalculationKind::Icms,
    CalculationKind::Ipi,
    CalculationKind::Pis,
    CalculationKind::Cofins,
    CalculationKind::Issqn,
    CalculationKind::Fcp,
    CalculationKind::Difal,
    CalculationKind::IcmsSt,
    CalculationKind::Ibpt,
    CalculationKind::IcmsDesonerado,
    CalculationKind::IcmsMonofasico,
];

impl CalculationKind {
    /// All kinds, composite last.
    pub const ALL: [CalculationKind; 21] = [
        CalculationKind::Icms,
        CalculationKind::IcmsSt,
        CalculationKind::Ipi,
        CalculationKind::Pis,
        CalculationKind::Cofins,
        CalculationKind::Issqn,
        CalculationKind::IcmsEfetivo,
        CalculationKind::IcmsMonofasico,
        CalculationKind::IcmsDesonerado,
        CalculationKind::CreditoIcms,
        CalculationKind::Csosn,
        CalculationKind::IbsCbs,
        CalculationKind::Ibs,
        CalculationKind::IbsMunicipal,
        CalculationKind::Cbs,
        CalculationKind::Difal,
        CalculationKind::Fcp,
        CalculationKind::FcpSt,
        CalculationKind::FcpStRetido,
        CalculationKind::Ibpt,
        CalculationKind::Composite,
    ];

    /// Stable text identifier.
    pub const fn id(&self) -> &'static str {
        match self {
            CalculationKind::Icms => "icms",
            CalculationKind::IcmsSt => "icms_st",
            CalculationKind::Ipi => "ipi",
            CalculationKind::Pis => "pis",
            CalculationKind::Cofins => "cofins",
            CalculationKind::Issqn => "issqn",
            CalculationKind::IcmsEfetivo => "icms_efetivo",
            CalculationKind::IcmsMonofasico => "icms_monofasico",
            CalculationKind::IcmsDesonerado => "icms_desonerado",
            CalculationKind::CreditoIcms => "credito_icms",
            CalculationKind::Csosn => "csosn",
            CalculationKind::IbsCbs => "ibs_cbs",
            CalculationKind::Ibs => "ibs",
            CalculationKind::IbsMunicipal => "ibs_municipal",
            CalculationKind::Cbs => "cbs",
            CalculationKind::Difal => "difal",
            CalculationKind::Fcp => "fcp",
            CalculationKind::FcpSt => "fcp_st",
            CalculationKind::FcpStRetido => "fcp_st_retido",
            CalculationKind::Ibpt => "ibpt",
            CalculationKind::Composite => "composite",
        }
    }

    /// Kinds that must run before this one.
    pub const fn dependencies(&self) -> &'static [CalculationKind] {
        use CalculationKind::*;
        match self {
            IcmsSt => &[Ipi, Icms],
            Pis | Cofins | Fcp | IcmsDesonerado => &[Icms],
            CreditoIcms => &[Icms, IcmsSt],
            Csosn => &[Ipi, Icms, IcmsSt, CreditoIcms, IcmsEfetivo],
            IbsCbs | Ibs | IbsMunicipal | Cbs => &[Pis, Cofins, Icms, Issqn],
            FcpSt => &[Ipi],
            Composite => &COMPOSITE_ORDER,
            Icms | Ipi | Issqn | IcmsEfetivo | IcmsMonofasico | Difal | FcpStRetido | Ibpt => &[],
        }
    }
}

impl fmt::Display for CalculationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CalculationKind {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CalculationKind::ALL
            .into_iter()
            .find(|kind| kind.id() == wanted)
            .ok_or_else(|| TaxError::unknown("calculation", s))
    }
}

impl TryFrom<String> for CalculationKind {
    type Error = TaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalculationKind> for String {
    fn from(value: CalculationKind) -> Self {
        value.id().to_string()
    }
}

// =============================================================================
// Execution Plan
// =============================================================================

/// Dependency-ordered list of calculations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    steps: Vec<CalculationKind>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl ExecutionPlan {
    /// Orders `requested` and everything it depends on.
    pub fn resolve(requested: &[CalculationKind]) -> TaxResult<Self> {
        Self::resolve_with(requested, |kind| kind.dependencies())
    }

    /// Same as [`resolve`](Self::resolve) over an arbitrary dependency table.
    pub fn resolve_with<F>(requested: &[CalculationKind], dependencies: F) -> TaxResult<Self>
    where
        F: Fn(CalculationKind) -> &'static [CalculationKind],
    {
        let mut marks: Vec<(CalculationKind, Mark)> = Vec::new();
        let mut steps = Vec::new();
        for &kind in requested {
            visit(kind, &dependencies, &mut marks, &mut steps)?;
        }
        debug!(
            requested = ?requested,
            steps = ?steps,
            "Execution plan resolved"
        );
        Ok(ExecutionPlan { steps })
    }

    pub fn steps(&self) -> &[CalculationKind] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn visit<F>(
    kind: CalculationKind,
    dependencies: &F,
    marks: &mut Vec<(CalculationKind, Mark)>,
    steps: &mut Vec<CalculationKind>,
) -> TaxResult<()>
where
    F: Fn(CalculationKind) -> &'static [CalculationKind],
{
    match marks.iter().find(|(k, _)| *k == kind).map(|(_, m)| *m) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => return Err(TaxError::DependencyCycle(kind.id().to_string())),
        None => marks.push((kind, Mark::Visiting)),
    }

    for &dependency in dependencies(kind) {
        visit(dependency, dependencies, marks, steps)?;
    }

    if let Some(entry) = marks.iter_mut().find(|(k, _)| *k == kind) {
        entry.1 = Mark::Done;
    }
    steps.push(kind);
    Ok(())
}

// =============================================================================
// Outcome
// =============================================================================

/// Result of one executed calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxOutcome {
    Icms(IcmsResult),
    IcmsSt(IcmsStResult),
    Ipi(IpiResult),
    Pis(PisCofinsResult),
    Cofins(PisCofinsResult),
    Issqn(IssqnResult),
    IcmsEfetivo(IcmsEfetivoResult),
    IcmsMonofasico(IcmsMonofasicoResult),
    IcmsDesonerado(IcmsDesoneradoResult),
    CreditoIcms(CreditoIcmsResult),
    Csosn(CsosnResult),
    IbsCbs(IbsCbsTotals),
    Ibs(IbsCbsResult),
    IbsMunicipal(IbsCbsResult),
    Cbs(IbsCbsResult),
    Difal(DifalResult),
    Fcp(FcpResult),
    FcpSt(FcpResult),
    FcpStRetido(FcpResult),
    Ibpt(IbptResult),
    Composite(Box<TaxBreakdown>),
}

impl TaxOutcome {
    /// The kind that produced this outcome.
    pub fn kind(&self) -> CalculationKind {
        match self {
            TaxOutcome::Icms(_) => CalculationKind::Icms,
            TaxOutcome::IcmsSt(_) => CalculationKind::IcmsSt,
            TaxOutcome::Ipi(_) => CalculationKind::Ipi,
            TaxOutcome::Pis(_) => CalculationKind::Pis,
            TaxOutcome::Cofins(_) => CalculationKind::Cofins,
            TaxOutcome::Issqn(_) => CalculationKind::Issqn,
            TaxOutcome::IcmsEfetivo(_) => CalculationKind::IcmsEfetivo,
            TaxOutcome::IcmsMonofasico(_) => CalculationKind::IcmsMonofasico,
            TaxOutcome::IcmsDesonerado(_) => CalculationKind::IcmsDesonerado,
            TaxOutcome::CreditoIcms(_) => CalculationKind::CreditoIcms,
            TaxOutcome::Csosn(_) => CalculationKind::Csosn,
            TaxOutcome::IbsCbs(_) => CalculationKind::IbsCbs,
            TaxOutcome::Ibs(_) => CalculationKind::Ibs,
            TaxOutcome::IbsMunicipal(_) => CalculationKind::IbsMunicipal,
            TaxOutcome::Cbs(_) => CalculationKind::Cbs,
            TaxOutcome::Difal(_) => CalculationKind::Difal,
            TaxOutcome::Fcp(_) => CalculationKind::Fcp,
            TaxOutcome::FcpSt(_) => CalculationKind::FcpSt,
            TaxOutcome::FcpStRetido(_) => CalculationKind::FcpStRetido,
            TaxOutcome::Ibpt(_) => CalculationKind::Ibpt,
            TaxOutcome::Composite(_) => CalculationKind::Composite,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
