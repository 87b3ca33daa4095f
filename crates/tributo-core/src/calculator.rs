//! # Tax Calculator
//!
//! The orchestrator: borrows one [`TaxableItem`], runs the tax modules in
//! dependency order and merges CST-driven sub-results.
//!
//! ## Call Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     TaxCalculator::new(&item)                           │
//! │                                                                         │
//! │   icms() ──► icms::calculate                                            │
//! │     │        └── cst_dispatch(cst)                                      │
//! │     │              ├── st  && ST rate ≠ 0 && MVA ≠ 0 → merge ICMS-ST    │
//! │     │              └── credit && credit rate ≠ 0     → merge credit     │
//! │     │                                                                   │
//! │     ├──► pis() / cofins()      (ICMS value, when deducted)              │
//! │     ├──► fcp() / desonerado()  (ICMS base)                              │
//! │     └──► ibs_cbs()             (PIS, COFINS, ICMS, ISSQN values)        │
//! │                                                                         │
//! │   breakdown() ──► all eleven composite parts, ICMS computed once        │
//! │   run(kind)   ──► ExecutionPlan::resolve ──► steps in order             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - The item is only borrowed immutably: it is identical after every call,
//!   failed calls included.
//! - Nothing is cached across calls. Inside one call, shared inputs (the
//!   ICMS result, PIS, COFINS) are computed once.
//! - The calculator is `Send + Sync`.

use tracing::debug_span;

use crate::composite::TaxBreakdown;
use crate::config::EngineConfig;
use crate::dispatch::cst_dispatch;
use crate::error::TaxResult;
use crate::item::TaxableItem;
use crate::plan::{CalculationKind, ExecutionPlan, TaxOutcome};
use crate::taxes::credito_icms::{self, CreditoIcmsResult};
use crate::taxes::csosn::{self, CsosnResult};
use crate::taxes::difal::{self, DifalResult};
use crate::taxes::fcp::{self, FcpResult};
use crate::taxes::ibpt::{self, IbptResult};
use crate::taxes::ibs_cbs::{self, IbsCbsFacts, IbsCbsResult, IbsCbsTotals, ReformTax};
use crate::taxes::icms::{self, IcmsFacts, IcmsResult};
use crate::taxes::icms_desonerado::{self, IcmsDesoneradoResult};
use crate::taxes::icms_efetivo::{self, IcmsEfetivoResult};
use crate::taxes::icms_monofasico::{self, IcmsMonofasicoResult};
use crate::taxes::icms_st::{self, IcmsStResult};
use crate::taxes::ipi::{self, IpiResult};
use crate::taxes::issqn::{self, IssqnResult};
use crate::taxes::pis_cofins::{self, Contribution, PisCofinsFacts, PisCofinsResult};
use crate::validation::validate_item;

// =============================================================================
// Scratch
// =============================================================================

/// Inputs shared by several steps of ONE call. Lives on the stack of the
/// public method and is dropped when it returns.
#[derive(Default)]
struct Scratch {
    icms: Option<IcmsResult>,
    pis: Option<PisCofinsResult>,
    cofins: Option<PisCofinsResult>,
    issqn: Option<IssqnResult>,
}

// =============================================================================
// Calculator
// =============================================================================

/// Runs tax calculations over one borrowed item.
///
/// ## Usage
/// ```rust
/// use rust_decimal::Decimal;
/// use tributo_core::{TaxCalculator, TaxableItem};
///
/// let item = TaxableItem {
///     product_value: Decimal::new(100, 0),
///     icms_rate: Decimal::new(18, 0),
///     ..Default::default()
/// };
///
/// let icms = TaxCalculator::new(&item).icms();
/// assert_eq!(icms.value, Decimal::new(18, 0));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    item: &'a TaxableItem,
    config: EngineConfig,
}

impl<'a> TaxCalculator<'a> {
    /// Creates a calculator with the default configuration.
    ///
    /// The item is trusted as is; use [`try_new`](Self::try_new) for
    /// records coming from outside.
    pub fn new(item: &'a TaxableItem) -> Self {
        TaxCalculator {
            item,
            config: EngineConfig::default(),
        }
    }

    /// Creates a calculator after validating the item.
    ///
    /// ## Errors
    /// [`TaxError::Validation`](crate::error::TaxError::Validation) when an
    /// amount is negative or a percentage falls outside [0, 100].
    pub fn try_new(item: &'a TaxableItem) -> TaxResult<Self> {
        validate_item(item)?;
        Ok(Self::new(item))
    }

    /// Replaces the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn item(&self) -> &TaxableItem {
        self.item
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // ICMS family
    // =========================================================================

    /// ICMS with the CST-driven ST and credit merges.
    pub fn icms(&self) -> IcmsResult {
        let _span = debug_span!("icms").entered();
        self.compute_icms()
    }

    pub fn icms_st(&self) -> IcmsStResult {
        let _span = debug_span!("icms_st").entered();
        icms_st::calculate(self.item, self.item.amounts())
    }

    pub fn icms_efetivo(&self) -> IcmsEfetivoResult {
        let _span = debug_span!("icms_efetivo").entered();
        icms_efetivo::calculate(self.item, self.item.amounts())
    }

    pub fn icms_monofasico(&self) -> IcmsMonofasicoResult {
        let _span = debug_span!("icms_monofasico").entered();
        icms_monofasico::calculate(self.item)
    }

    /// Waived ICMS over the ICMS base.
    ///
    /// ## Errors
    /// `NoMatchingRule` for `BasePorDentro` with a CST outside 20/30/40/70.
    pub fn icms_desonerado(&self) -> TaxResult<IcmsDesoneradoResult> {
        let _span = debug_span!("icms_desonerado").entered();
        self.icms_desonerado_in(&mut Scratch::default())
    }

    pub fn credito_icms(&self) -> CreditoIcmsResult {
        let _span = debug_span!("credito_icms").entered();
        let base = credito_icms::credit_base(self.item, self.item.amounts());
        credito_icms::calculate(base, self.item.credit_rate)
    }

    /// Simplified-regime ICMS driven by the item's CSOSN.
    pub fn csosn(&self) -> CsosnResult {
        let _span = debug_span!("csosn", csosn = self.item.csosn).entered();
        csosn::calculate(self.item)
    }

    // =========================================================================
    // Federal & municipal
    // =========================================================================

    pub fn ipi(&self) -> IpiResult {
        let _span = debug_span!("ipi").entered();
        ipi::calculate(self.item.amounts(), self.item.ipi_rate)
    }

    pub fn pis(&self) -> PisCofinsResult {
        let _span = debug_span!("pis").entered();
        self.contribution_in(Contribution::Pis, &mut Scratch::default())
    }

    pub fn cofins(&self) -> PisCofinsResult {
        let _span = debug_span!("cofins").entered();
        self.contribution_in(Contribution::Cofins, &mut Scratch::default())
    }

    /// ISSQN, optionally with the federal withholdings, gated by the
    /// configured thresholds.
    pub fn issqn(&self, with_withholdings: bool) -> IssqnResult {
        let _span = debug_span!("issqn", with_withholdings).entered();
        issqn::calculate(self.item, with_withholdings, &self.config.withholding)
    }

    // =========================================================================
    // Tax reform (IBS / CBS)
    // =========================================================================

    /// IBS, IBS-municipal and CBS over one shared base.
    pub fn ibs_cbs(&self) -> IbsCbsTotals {
        let _span = debug_span!("ibs_cbs").entered();
        let facts = self.ibs_cbs_facts_in(&mut Scratch::default());
        ibs_cbs::calculate_all(self.item, &facts)
    }

    pub fn ibs(&self) -> IbsCbsResult {
        let _span = debug_span!("ibs").entered();
        self.reform_in(ReformTax::IbsState, &mut Scratch::default())
    }

    pub fn ibs_municipal(&self) -> IbsCbsResult {
        let _span = debug_span!("ibs_municipal").entered();
        self.reform_in(ReformTax::IbsMunicipal, &mut Scratch::default())
    }

    pub fn cbs(&self) -> IbsCbsResult {
        let _span = debug_span!("cbs").entered();
        self.reform_in(ReformTax::Cbs, &mut Scratch::default())
    }

    // =========================================================================
    // Interstate, FCP & transparency
    // =========================================================================

    pub fn difal(&self) -> DifalResult {
        let _span = debug_span!("difal").entered();
        difal::calculate(self.item)
    }

    /// FCP over the ICMS base.
    pub fn fcp(&self) -> FcpResult {
        let _span = debug_span!("fcp").entered();
        self.fcp_in(&mut Scratch::default())
    }

    pub fn fcp_st(&self) -> FcpResult {
        let _span = debug_span!("fcp_st").entered();
        fcp::calculate_st(self.item)
    }

    pub fn fcp_st_retido(&self) -> FcpResult {
        let _span = debug_span!("fcp_st_retido").entered();
        fcp::calculate_st_retained(self.item)
    }

    pub fn ibpt(&self) -> IbptResult {
        let _span = debug_span!("ibpt").entered();
        ibpt::calculate(self.item)
    }

    // =========================================================================
    // Composite & registry
    // =========================================================================

    /// Every composite part in one pass.
    ///
    /// ## Errors
    /// Fails as a whole when any part fails (only the desonerado lookup
    /// can).
    pub fn breakdown(&self) -> TaxResult<TaxBreakdown> {
        let _span = debug_span!("breakdown").entered();
        self.breakdown_in(&mut Scratch::default())
    }

    /// Runs one calculation by kind, dependencies first.
    ///
    /// ## Example
    /// ```rust
    /// use tributo_core::{CalculationKind, TaxCalculator, TaxOutcome, TaxableItem};
    ///
    /// let item = TaxableItem::default();
    /// let kind: CalculationKind = "pis".parse().unwrap();
    /// let outcome = TaxCalculator::new(&item).run(kind).unwrap();
    /// assert!(matches!(outcome, TaxOutcome::Pis(_)));
    /// ```
    pub fn run(&self, kind: CalculationKind) -> TaxResult<TaxOutcome> {
        let _span = debug_span!("run", kind = %kind).entered();
        let plan = ExecutionPlan::resolve(&[kind])?;
        let mut scratch = Scratch::default();
        for &step in plan.steps().iter().filter(|&&step| step != kind) {
            self.execute(step, &mut scratch)?;
        }
        self.execute(kind, &mut scratch)
    }

    /// Runs several calculations and returns the outcome of every plan
    /// step (dependencies included), in execution order.
    pub fn run_all(&self, kinds: &[CalculationKind]) -> TaxResult<Vec<TaxOutcome>> {
        let _span = debug_span!("run_all", count = kinds.len()).entered();
        let plan = ExecutionPlan::resolve(kinds)?;
        let mut scratch = Scratch::default();
        plan.steps()
            .iter()
            .map(|&step| self.execute(step, &mut scratch))
            .collect()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn execute(&self, kind: CalculationKind, scratch: &mut Scratch) -> TaxResult<TaxOutcome> {
        let _span = debug_span!("step", kind = %kind).entered();
        let outcome = match kind {
            CalculationKind::Icms => TaxOutcome::Icms(self.icms_in(scratch)),
            CalculationKind::IcmsSt => TaxOutcome::IcmsSt(self.icms_st()),
            CalculationKind::Ipi => TaxOutcome::Ipi(self.ipi()),
            CalculationKind::Pis => TaxOutcome::Pis(self.contribution_in(Contribution::Pis, scratch)),
            CalculationKind::Cofins => {
                TaxOutcome::Cofins(self.contribution_in(Contribution::Cofins, scratch))
            }
            CalculationKind::Issqn => TaxOutcome::Issqn(self.issqn_in(scratch)),
            CalculationKind::IcmsEfetivo => TaxOutcome::IcmsEfetivo(self.icms_efetivo()),
            CalculationKind::IcmsMonofasico => TaxOutcome::IcmsMonofasico(self.icms_monofasico()),
            CalculationKind::IcmsDesonerado => {
                TaxOutcome::IcmsDesonerado(self.icms_desonerado_in(scratch)?)
            }
            CalculationKind::CreditoIcms => TaxOutcome::CreditoIcms(self.credito_icms()),
            CalculationKind::Csosn => TaxOutcome::Csosn(self.csosn()),
            CalculationKind::IbsCbs => {
                let facts = self.ibs_cbs_facts_in(scratch);
                TaxOutcome::IbsCbs(ibs_cbs::calculate_all(self.item, &facts))
            }
            CalculationKind::Ibs => TaxOutcome::Ibs(self.reform_in(ReformTax::IbsState, scratch)),
            CalculationKind::IbsMunicipal => {
                TaxOutcome::IbsMunicipal(self.reform_in(ReformTax::IbsMunicipal, scratch))
            }
            CalculationKind::Cbs => TaxOutcome::Cbs(self.reform_in(ReformTax::Cbs, scratch)),
            CalculationKind::Difal => TaxOutcome::Difal(self.difal()),
            CalculationKind::Fcp => TaxOutcome::Fcp(self.fcp_in(scratch)),
            CalculationKind::FcpSt => TaxOutcome::FcpSt(self.fcp_st()),
            CalculationKind::FcpStRetido => TaxOutcome::FcpStRetido(self.fcp_st_retido()),
            CalculationKind::Ibpt => TaxOutcome::Ibpt(self.ibpt()),
            CalculationKind::Composite => TaxOutcome::Composite(Box::new(self.breakdown_in(scratch)?)),
        };
        Ok(outcome)
    }

    fn compute_icms(&self) -> IcmsResult {
        let item = self.item;
        let mut result = icms::calculate(item, IcmsFacts::from_item(item));

        let Some(cst) = item.cst else {
            return result;
        };
        let dispatch = cst_dispatch(cst);

        if dispatch.st && !item.icms_st_rate.is_zero() && !item.mva_rate.is_zero() {
            let st = icms_st::calculate(item, item.amounts());
            result.st_base = Some(st.st_base);
            result.st_value = Some(st.st_value);
        }

        if dispatch.credit && !item.credit_rate.is_zero() {
            let base = credito_icms::credit_base(item, item.amounts());
            result.credit_value = Some(credito_icms::calculate(base, item.credit_rate).value);
            result.credit_rate = Some(item.credit_rate);
        }

        result
    }

    fn icms_in(&self, scratch: &mut Scratch) -> IcmsResult {
        scratch
            .icms
            .get_or_insert_with(|| self.compute_icms())
            .clone()
    }

    fn contribution_in(&self, contribution: Contribution, scratch: &mut Scratch) -> PisCofinsResult {
        let cached = match contribution {
            Contribution::Pis => scratch.pis,
            Contribution::Cofins => scratch.cofins,
        };
        if let Some(result) = cached {
            return result;
        }

        let icms_value = self.icms_in(scratch).value;
        let facts = PisCofinsFacts::for_contribution(self.item, contribution, icms_value);
        let result = pis_cofins::calculate(contribution, facts);
        match contribution {
            Contribution::Pis => scratch.pis = Some(result),
            Contribution::Cofins => scratch.cofins = Some(result),
        }
        result
    }

    /// ISSQN with withholdings. Its `value` does not depend on them, so the
    /// same result feeds the IBS/CBS base.
    fn issqn_in(&self, scratch: &mut Scratch) -> IssqnResult {
        *scratch.issqn.get_or_insert_with(|| self.issqn(true))
    }

    fn ibs_cbs_facts_in(&self, scratch: &mut Scratch) -> IbsCbsFacts {
        IbsCbsFacts {
            pis: self.contribution_in(Contribution::Pis, scratch).value,
            cofins: self.contribution_in(Contribution::Cofins, scratch).value,
            icms: self.icms_in(scratch).value,
            issqn: self.issqn_in(scratch).value,
        }
    }

    fn reform_in(&self, tax: ReformTax, scratch: &mut Scratch) -> IbsCbsResult {
        let facts = self.ibs_cbs_facts_in(scratch);
        let base = ibs_cbs::base(self.item, &facts);
        ibs_cbs::calculate(self.item, tax, base)
    }

    fn fcp_in(&self, scratch: &mut Scratch) -> FcpResult {
        let icms_base = self.icms_in(scratch).base;
        fcp::calculate(self.item, icms_base)
    }

    fn icms_desonerado_in(&self, scratch: &mut Scratch) -> TaxResult<IcmsDesoneradoResult> {
        let icms_base = self.icms_in(scratch).base;
        icms_desonerado::calculate(self.item, icms_base)
    }

    fn breakdown_in(&self, scratch: &mut Scratch) -> TaxResult<TaxBreakdown> {
        let icms = self.icms_in(scratch);
        let ipi = self.ipi();
        let pis = self.contribution_in(Contribution::Pis, scratch);
        let cofins = self.contribution_in(Contribution::Cofins, scratch);
        let issqn = self.issqn_in(scratch);
        let fcp = self.fcp_in(scratch);
        let difal = self.difal();
        let icms_st = self.icms_st();
        let ibpt = self.ibpt();
        let icms_desonerado = self.icms_desonerado_in(scratch)?;
        let icms_monofasico = self.icms_monofasico();

        Ok(TaxBreakdown {
            icms,
            ipi,
            pis,
            cofins,
            issqn,
            fcp,
            difal,
            icms_st,
            ibpt,
            icms_desonerado,
            icms_monofasico,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WithholdingThresholds;
    use crate::dispatch::CsosnMode;
    use crate::error::{TaxError, ValidationError};
    use crate::types::{Cst, DesoneradoCalculation, DocumentType};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn st_item(cst: Cst) -> TaxableItem {
        TaxableItem {
            product_value: dec!(100),
            icms_rate: dec!(12),
            icms_st_rate: dec!(18),
            mva_rate: dec!(40),
            cst: Some(cst),
            ..Default::default()
        }
    }

    /// A fully-populated resale line.
    fn invoice_line() -> TaxableItem {
        TaxableItem {
            product_value: dec!(500),
            quantity: dec!(2),
            freight: dec!(50),
            discount: dec!(50),
            cst: Some(Cst::FullyTaxed),
            icms_rate: dec!(18),
            ipi_rate: dec!(10),
            pis_rate: dec!(1.65),
            cofins_rate: dec!(7.6),
            fcp_rate: dec!(2),
            difal_internal_rate: dec!(18),
            difal_interstate_rate: dec!(12),
            ibpt_federal_rate: dec!(10),
            ibpt_state_rate: dec!(18),
            ..Default::default()
        }
    }

    #[test]
    fn test_cst_10_merges_st() {
        let item = st_item(Cst::TaxedWithSt);
        let result = TaxCalculator::new(&item).icms();
        assert_eq!(result.value, dec!(12));
        assert_eq!(result.st_base, Some(dec!(140)));
        assert_eq!(result.st_value, Some(dec!(13.20)));
        assert!(result.credit_value.is_none());
    }

    #[test]
    fn test_cst_00_never_merges_st() {
        let item = st_item(Cst::FullyTaxed);
        let result = TaxCalculator::new(&item).icms();
        assert!(result.st_base.is_none());
        assert!(result.st_value.is_none());
    }

    #[test]
    fn test_st_merge_needs_mva() {
        let item = TaxableItem {
            mva_rate: dec!(0),
            ..st_item(Cst::TaxedWithSt)
        };
        assert!(TaxCalculator::new(&item).icms().st_value.is_none());
    }

    #[test]
    fn test_cst_90_merges_credit_on_unreduced_base() {
        let item = TaxableItem {
            product_value: dec!(200),
            icms_rate: dec!(12),
            icms_reduction: dec!(50),
            credit_rate: dec!(2.56),
            cst: Some(Cst::Other),
            ..Default::default()
        };
        let before = item.clone();
        let result = TaxCalculator::new(&item).icms();
        assert_eq!(result.base, dec!(100));
        assert_eq!(result.value, dec!(12));
        assert_eq!(result.credit_value, Some(dec!(5.12)));
        assert_eq!(result.credit_rate, Some(dec!(2.56)));
        // ST rate is zero: nothing to merge
        assert!(result.st_value.is_none());
        assert_eq!(item, before);
    }

    #[test]
    fn test_cte_credit_uses_st_value() {
        let item = TaxableItem {
            document: Some(DocumentType::CTe),
            credit_rate: dec!(10),
            ..st_item(Cst::Other)
        };
        let result = TaxCalculator::new(&item).credito_icms();
        assert_eq!(result.base, dec!(13.20));
        assert_eq!(result.value, dec!(1.32));
    }

    #[test]
    fn test_calculations_are_idempotent() {
        let item = TaxableItem {
            ipi_rate: dec!(10),
            is_fixed_asset_or_consumption: true,
            credit_rate: dec!(3),
            ..st_item(Cst::Other)
        };
        let before = item.clone();
        let calculator = TaxCalculator::new(&item);

        assert_eq!(calculator.icms(), calculator.icms());
        assert_eq!(calculator.icms_st(), calculator.icms_st());
        assert_eq!(calculator.csosn(), calculator.csosn());
        assert_eq!(calculator.breakdown().unwrap(), calculator.breakdown().unwrap());
        assert_eq!(item, before);
    }

    #[test]
    fn test_st_own_operation_excludes_ipi_once() {
        let item = TaxableItem {
            ipi_rate: dec!(10),
            is_fixed_asset_or_consumption: true,
            ..st_item(Cst::TaxedWithSt)
        };
        let result = TaxCalculator::new(&item).icms_st();
        // Own operation on 100 (IPI left out), ST on (100 + 10) × 1.4
        assert_eq!(result.own_value, dec!(12));
        assert_eq!(result.st_base, dec!(154));
        assert_eq!(result.st_value, dec!(15.72));
        assert_eq!(item.ipi_value, dec!(0));
    }

    #[test]
    fn test_pis_deducts_rounded_icms() {
        let item = TaxableItem {
            product_value: dec!(100),
            icms_rate: dec!(18),
            pis_rate: dec!(1.65),
            deduct_icms_from_pis_cofins: true,
            ..Default::default()
        };
        let result = TaxCalculator::new(&item).pis();
        assert_eq!(result.base, dec!(82));
        // 82 × 1.65% = 1.353
        assert_eq!(result.value, dec!(1.35));
    }

    #[test]
    fn test_csosn_through_calculator() {
        let item = TaxableItem {
            csosn: 102,
            ..st_item(Cst::FullyTaxed)
        };
        let calculator = TaxCalculator::new(&item);
        let exempt = calculator.csosn();
        assert_eq!(exempt.mode, CsosnMode::Exempt);
        assert!(exempt.icms_value.is_none());

        let item = TaxableItem { csosn: 900, ..item };
        let all = TaxCalculator::new(&item).csosn();
        assert_eq!(all.mode, CsosnMode::All);
        assert_eq!(all.icms_value, Some(dec!(12)));
        assert_eq!(all.st_value, Some(dec!(13.20)));
    }

    #[test]
    fn test_ibs_cbs_share_one_base() {
        let item = TaxableItem {
            product_value: dec!(1000),
            icms_rate: dec!(18),
            pis_rate: dec!(1.65),
            cofins_rate: dec!(7.6),
            ibs_state_rate: dec!(0.1),
            ibs_municipal_rate: dec!(0.05),
            cbs_rate: dec!(0.9),
            ..Default::default()
        };
        let calculator = TaxCalculator::new(&item);
        let totals = calculator.ibs_cbs();
        // 1000 − 16.50 − 76.00 − 180.00 − 0
        assert_eq!(totals.base, dec!(727.50));
        assert_eq!(totals.cbs, dec!(6.55));
        assert_eq!(calculator.cbs().value, totals.cbs);
        assert_eq!(calculator.ibs().value, totals.ibs);
        assert_eq!(calculator.ibs_municipal().base, totals.base);
    }

    #[test]
    fn test_ibs_cbs_deducts_issqn_step() {
        let item = TaxableItem {
            product_value: dec!(1000),
            is_service: true,
            issqn_rate: dec!(5),
            withheld_irrf_rate: dec!(1.5),
            cbs_rate: dec!(1),
            ..Default::default()
        };
        let calculator = TaxCalculator::new(&item);
        let outcomes = calculator.run_all(&[CalculationKind::Cbs]).unwrap();
        let kinds: Vec<_> = outcomes.iter().map(TaxOutcome::kind).collect();
        assert_eq!(
            kinds,
            vec![
                CalculationKind::Icms,
                CalculationKind::Pis,
                CalculationKind::Cofins,
                CalculationKind::Issqn,
                CalculationKind::Cbs,
            ]
        );
        let TaxOutcome::Issqn(issqn) = &outcomes[3] else {
            panic!("expected ISSQN, got {:?}", outcomes[3]);
        };
        assert_eq!(issqn.value, dec!(50));
        assert_eq!(issqn.withheld_irrf, dec!(15));
        // 1000 − 50 ISSQN
        assert_eq!(outcomes[4], TaxOutcome::Cbs(calculator.cbs()));
        assert_eq!(calculator.cbs().base, dec!(950));
        assert_eq!(calculator.cbs().value, dec!(9.50));
    }

    #[test]
    fn test_breakdown_accessors() {
        let item = invoice_line();
        let breakdown = TaxCalculator::new(&item).breakdown().unwrap();

        // gross 1050 − 50
        assert_eq!(breakdown.icms_base(), dec!(1000));
        assert_eq!(breakdown.icms_value(), dec!(180));
        assert_eq!(breakdown.ipi_value(), dec!(100));
        assert_eq!(breakdown.pis_value(), dec!(16.50));
        assert_eq!(breakdown.cofins_value(), dec!(76.00));
        assert_eq!(breakdown.fcp.value, dec!(20));
        assert_eq!(breakdown.difal_fcp(), dec!(20));
        assert_eq!(breakdown.difal_value(), dec!(60));
        assert_eq!(breakdown.destination_icms_value(), dec!(60));
        assert_eq!(breakdown.origin_icms_value(), dec!(0));
        // 1000 − 50 on product only
        assert_eq!(breakdown.federal_total(), dec!(95));
        assert_eq!(breakdown.state_total(), dec!(171));
        assert_eq!(breakdown.credit_value(), dec!(0));
        assert_eq!(breakdown.credit_rate(), dec!(0));
        assert_eq!(breakdown.desonerado_value(), dec!(0));
        assert_eq!(breakdown.monophasic_own_value(), dec!(0));
        assert_eq!(breakdown.issqn_value(), dec!(0));
        assert_eq!(breakdown.withheld_inss(), dec!(0));
    }

    #[test]
    fn test_breakdown_fails_as_a_whole() {
        let item = TaxableItem {
            desonerado_calculation: Some(DesoneradoCalculation::BasePorDentro),
            ..invoice_line()
        };
        let before = item.clone();
        let err = TaxCalculator::new(&item).breakdown().unwrap_err();
        assert!(matches!(err, TaxError::NoMatchingRule { .. }));
        assert_eq!(item, before);
    }

    #[test]
    fn test_run_matches_direct_calls() {
        let item = invoice_line();
        let calculator = TaxCalculator::new(&item);

        assert_eq!(calculator.run(CalculationKind::Pis).unwrap(), TaxOutcome::Pis(calculator.pis()));
        assert_eq!(
            calculator.run(CalculationKind::Fcp).unwrap(),
            TaxOutcome::Fcp(calculator.fcp())
        );
        assert_eq!(
            calculator.run(CalculationKind::Composite).unwrap(),
            TaxOutcome::Composite(Box::new(calculator.breakdown().unwrap()))
        );
    }

    #[test]
    fn test_run_all_follows_plan() {
        let item = invoice_line();
        let outcomes = TaxCalculator::new(&item)
            .run_all(&[CalculationKind::Difal, CalculationKind::Cofins])
            .unwrap();
        let kinds: Vec<_> = outcomes.iter().map(TaxOutcome::kind).collect();
        assert_eq!(
            kinds,
            vec![CalculationKind::Difal, CalculationKind::Icms, CalculationKind::Cofins]
        );
    }

    #[test]
    fn test_try_new_validates() {
        let item = TaxableItem {
            icms_rate: dec!(120),
            ..Default::default()
        };
        let err = TaxCalculator::try_new(&item).unwrap_err();
        assert!(matches!(
            err,
            TaxError::Validation(ValidationError::PercentageOutOfRange { .. })
        ));
        assert!(TaxCalculator::try_new(&invoice_line()).is_ok());
    }

    #[test]
    fn test_config_thresholds_reach_issqn() {
        let item = TaxableItem {
            product_value: dec!(100),
            is_service: true,
            issqn_rate: dec!(5),
            ..Default::default()
        };
        let default = TaxCalculator::new(&item).issqn(false);
        assert_eq!(default.value, dec!(0));

        let config = EngineConfig {
            withholding: WithholdingThresholds {
                service_tax: Decimal::ZERO,
                ..Default::default()
            },
        };
        let lowered = TaxCalculator::new(&item).with_config(config).issqn(false);
        assert_eq!(lowered.value, dec!(5));
    }

    #[test]
    fn test_json_payload_to_breakdown() {
        let payload = r#"{
            "product_value": "100",
            "icms_rate": 18,
            "cst": "00",
            "discount_type": "Condicional",
            "discount": "10",
            "document": ""
        }"#;
        let item = TaxableItem::from_json(payload).unwrap();
        let breakdown = TaxCalculator::try_new(&item).unwrap().breakdown().unwrap();
        assert_eq!(breakdown.icms_base(), dec!(110));
        assert_eq!(breakdown.icms_value(), dec!(19.80));
    }

    #[test]
    fn test_calculator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TaxCalculator<'static>>();
    }
}
