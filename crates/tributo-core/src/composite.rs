//! # Tax Breakdown
//!
//! The composite result: every tax of a line computed in one pass, plus the
//! flat accessors invoicing software reads when filling the fiscal document.
//!
//! ## Parts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  icms → ipi → pis → cofins → issqn (with withholdings) → fcp            │
//! │       → difal → icms_st → ibpt → icms_desonerado → icms_monofasico      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Accessors alias a field of one part; the only transformation is the
//! credit pair, where "not computed" reads as zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::taxes::difal::DifalResult;
use crate::taxes::fcp::FcpResult;
use crate::taxes::ibpt::IbptResult;
use crate::taxes::icms::IcmsResult;
use crate::taxes::icms_desonerado::IcmsDesoneradoResult;
use crate::taxes::icms_monofasico::IcmsMonofasicoResult;
use crate::taxes::icms_st::IcmsStResult;
use crate::taxes::ipi::IpiResult;
use crate::taxes::issqn::IssqnResult;
use crate::taxes::pis_cofins::PisCofinsResult;

/// Every composite part of one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub icms: IcmsResult,
    pub ipi: IpiResult,
    pub pis: PisCofinsResult,
    pub cofins: PisCofinsResult,
    pub issqn: IssqnResult,
    pub fcp: FcpResult,
    pub difal: DifalResult,
    pub icms_st: IcmsStResult,
    pub ibpt: IbptResult,
    pub icms_desonerado: IcmsDesoneradoResult,
    pub icms_monofasico: IcmsMonofasicoResult,
}

impl TaxBreakdown {
    // -------------------------------------------------------------------------
    // ICMS
    // -------------------------------------------------------------------------

    pub fn icms_base(&self) -> Decimal {
        self.icms.base
    }

    pub fn icms_value(&self) -> Decimal {
        self.icms.value
    }

    /// Credit passed on to the buyer, zero when the CST grants none.
    pub fn credit_value(&self) -> Decimal {
        self.icms.credit_value.unwrap_or(Decimal::ZERO)
    }

    pub fn credit_rate(&self) -> Decimal {
        self.icms.credit_rate.unwrap_or(Decimal::ZERO)
    }

    // -------------------------------------------------------------------------
    // Federal
    // -------------------------------------------------------------------------

    pub fn ipi_value(&self) -> Decimal {
        self.ipi.value
    }

    pub fn pis_value(&self) -> Decimal {
        self.pis.value
    }

    pub fn cofins_value(&self) -> Decimal {
        self.cofins.value
    }

    // -------------------------------------------------------------------------
    // ISSQN & withholdings
    // -------------------------------------------------------------------------

    pub fn issqn_value(&self) -> Decimal {
        self.issqn.value
    }

    pub fn withheld_irrf(&self) -> Decimal {
        self.issqn.withheld_irrf
    }

    pub fn withheld_cofins(&self) -> Decimal {
        self.issqn.withheld_cofins
    }

    pub fn withheld_pis(&self) -> Decimal {
        self.issqn.withheld_pis
    }

    pub fn withheld_inss(&self) -> Decimal {
        self.issqn.withheld_inss
    }

    pub fn withheld_csll(&self) -> Decimal {
        self.issqn.withheld_csll
    }

    // -------------------------------------------------------------------------
    // DIFAL
    // -------------------------------------------------------------------------

    /// FCP as computed by DIFAL, over the DIFAL base.
    pub fn difal_fcp(&self) -> Decimal {
        self.difal.fcp
    }

    pub fn difal_value(&self) -> Decimal {
        self.difal.difal
    }

    pub fn origin_icms_value(&self) -> Decimal {
        self.difal.origin_value
    }

    pub fn destination_icms_value(&self) -> Decimal {
        self.difal.destination_value
    }

    // -------------------------------------------------------------------------
    // Transparency (IBPT)
    // -------------------------------------------------------------------------

    pub fn federal_total(&self) -> Decimal {
        self.ibpt.federal
    }

    pub fn imported_federal_total(&self) -> Decimal {
        self.ibpt.imported_federal
    }

    pub fn state_total(&self) -> Decimal {
        self.ibpt.state
    }

    pub fn municipal_total(&self) -> Decimal {
        self.ibpt.municipal
    }

    // -------------------------------------------------------------------------
    // ICMS-ST
    // -------------------------------------------------------------------------

    pub fn st_value(&self) -> Decimal {
        self.icms_st.st_value
    }

    pub fn st_base(&self) -> Decimal {
        self.icms_st.st_base
    }

    /// Own-operation ICMS deducted from the ST value.
    pub fn own_icms_value(&self) -> Decimal {
        self.icms_st.own_value
    }

    pub fn own_operation_base(&self) -> Decimal {
        self.icms_st.own_base
    }

    // -------------------------------------------------------------------------
    // Desonerado & Monofásico
    // -------------------------------------------------------------------------

    pub fn desonerado_value(&self) -> Decimal {
        self.icms_desonerado.value
    }

    pub fn monophasic_own_value(&self) -> Decimal {
        self.icms_monofasico.own_value
    }

    pub fn monophasic_retention_value(&self) -> Decimal {
        self.icms_monofasico.retention_value
    }

    pub fn monophasic_operation_value(&self) -> Decimal {
        self.icms_monofasico.operation_value
    }

    pub fn monophasic_deferred_value(&self) -> Decimal {
        self.icms_monofasico.deferred_value
    }

    pub fn monophasic_previously_withheld_value(&self) -> Decimal {
        self.icms_monofasico.previously_withheld_value
    }
}
