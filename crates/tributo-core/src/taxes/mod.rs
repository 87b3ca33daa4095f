//! # Tax Modules
//!
//! One module per statutory formula family. Modules are plain functions over
//! a borrowed [`TaxableItem`](crate::item::TaxableItem) plus explicit fact
//! overrides; none of them keeps state.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ipi ◄──── icms_st ◄──── credito_icms ◄──── csosn                       │
//! │               │                                │                        │
//! │               ▼                                ▼                        │
//! │   icms_efetivo ◄── icms                    icms_efetivo                 │
//! │                                                                         │
//! │  leaves: pis_cofins, issqn, icms_monofasico, icms_desonerado,           │
//! │          ibs_cbs, difal, fcp, ibpt                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cross-module inputs that need orchestration (the merged ICMS value for
//! PIS/COFINS and IBS/CBS, the ICMS base for FCP and desonerado) are passed
//! in by [`TaxCalculator`](crate::calculator::TaxCalculator).

pub mod credito_icms;
pub mod csosn;
pub mod difal;
pub mod fcp;
pub mod ibpt;
pub mod ibs_cbs;
pub mod icms;
pub mod icms_desonerado;
pub mod icms_efetivo;
pub mod icms_monofasico;
pub mod icms_st;
pub mod ipi;
pub mod issqn;
pub mod pis_cofins;
