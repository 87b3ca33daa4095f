//! # tributo-core: Brazilian Indirect-Tax Engine
//!
//! This crate computes the indirect taxes of one invoice line: ICMS and its
//! variants, IPI, PIS/COFINS, ISSQN with federal withholdings, DIFAL, FCP,
//! the IBPT transparency totals and the IBS/CBS of the tax reform.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tributo Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              ERP / invoicing software (NF-e, CT-e, MF-e)        │   │
//! │  │        builds a TaxableItem (or sends it as JSON)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ &TaxableItem                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ tributo-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐   ┌────────────┐   ┌────────────┐             │   │
//! │  │   │ calculator │──►│    plan    │   │  composite │             │   │
//! │  │   │ TaxCalc.   │   │ Kind/Plan  │   │ Breakdown  │             │   │
//! │  │   └─────┬──────┘   └────────────┘   └────────────┘             │   │
//! │  │         ▼                                                       │   │
//! │  │   ┌────────────┐   ┌────────────┐   ┌────────────┐             │   │
//! │  │   │   taxes    │──►│  dispatch  │   │   money    │             │   │
//! │  │   │ icms, st.. │   │ CST/CSOSN  │   │  rounding  │             │   │
//! │  │   └────────────┘   └────────────┘   └────────────┘             │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO MUTATION OF THE ITEM • EXACT DECIMALS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`item`] - The taxable item and its line amounts
//! - [`types`] - CST, CSOSN and the other categorical codes
//! - [`dispatch`] - CST/CSOSN dispatch and formula-branch tables
//! - [`taxes`] - One module per tax
//! - [`calculator`] - Orchestrator over a borrowed item
//! - [`composite`] - The full breakdown and its accessors
//! - [`plan`] - Calculation registry and dependency ordering
//! - [`config`] - Withholding thresholds
//! - [`money`] - Rounding and percentage helpers
//! - [`error`] - Domain error types
//! - [`validation`] - Item domain checks
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same item + same config = same result, every time
//! 2. **No I/O**: callers read files and payloads; this crate parses strings
//! 3. **Exact Decimals**: amounts and rates are `Decimal`, never `f64`
//! 4. **Explicit Overrides**: temporary facts (computed IPI, zero reduction)
//!    are passed alongside the item, never written into it
//! 5. **Observable**: every dispatch and formula branch is a `tracing` event;
//!    installing a subscriber is up to the caller
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tributo_core::{Cst, DiscountType, TaxCalculator, TaxableItem};
//!
//! let item = TaxableItem {
//!     product_value: Decimal::new(100, 0),
//!     ipi_value: Decimal::new(10, 0),
//!     discount: Decimal::new(5, 0),
//!     discount_type: DiscountType::Conditional,
//!     is_fixed_asset_or_consumption: true,
//!     icms_rate: Decimal::new(18, 0),
//!     cst: Some(Cst::FullyTaxed),
//!     ..Default::default()
//! };
//!
//! let breakdown = TaxCalculator::new(&item).breakdown()?;
//! assert_eq!(breakdown.icms_base(), Decimal::new(115, 0));
//! assert_eq!(breakdown.icms_value(), Decimal::new(2070, 2));
//! # Ok::<(), tributo_core::TaxError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod composite;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod item;
pub mod money;
pub mod plan;
pub mod taxes;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tributo_core::TaxCalculator` instead of
// `use tributo_core::calculator::TaxCalculator`

pub use calculator::TaxCalculator;
pub use composite::TaxBreakdown;
pub use config::{EngineConfig, WithholdingThresholds};
pub use error::{TaxError, TaxResult, ValidationError};
pub use item::{LineAmounts, TaxableItem};
pub use plan::{CalculationKind, ExecutionPlan, TaxOutcome, COMPOSITE_ORDER};
pub use types::*;
