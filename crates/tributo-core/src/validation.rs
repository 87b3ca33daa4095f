//! # Validation Module
//!
//! Domain checks for a [`TaxableItem`] before any formula runs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Decimal syntax                                                    │
//! │  └── Known CST / discount / document codes                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Amounts and quantities not negative                               │
//! │  ├── Percentages within [0, 100]                                       │
//! │  └── MVA not negative (it may exceed 100)                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Formula dispatch (strict lookups → NoMatchingRule)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ad-rem rates are currency per unit and are only checked for sign.
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use tributo_core::item::TaxableItem;
//! use tributo_core::validation::validate_item;
//!
//! let item = TaxableItem {
//!     product_value: Decimal::new(10000, 2),
//!     icms_rate: Decimal::new(18, 0),
//!     ..Default::default()
//! };
//! assert!(validate_item(&item).is_ok());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::item::TaxableItem;
use crate::money::HUNDRED;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates that an amount is not negative.
pub fn validate_non_negative(field: &'static str, value: Decimal) -> ValidationResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::Negative {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Validates that a percentage lies within [0, 100].
pub fn validate_percentage(field: &'static str, value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO || value > HUNDRED {
        return Err(ValidationError::PercentageOutOfRange {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Item Validator
// =============================================================================

/// Validates every numeric field of the item.
///
/// Stops at the first offending field.
pub fn validate_item(item: &TaxableItem) -> ValidationResult<()> {
    let amounts = [
        ("product_value", item.product_value),
        ("freight", item.freight),
        ("insurance", item.insurance),
        ("other_expenses", item.other_expenses),
        ("discount", item.discount),
        ("ipi_value", item.ipi_value),
        ("quantity", item.quantity),
        ("last_st_retained_base", item.last_st_retained_base),
        ("mva_rate", item.mva_rate),
        ("monophasic_quantity", item.monophasic_quantity),
        ("ad_rem_rate", item.ad_rem_rate),
        ("prior_monophasic_quantity", item.prior_monophasic_quantity),
        ("prior_ad_rem_rate", item.prior_ad_rem_rate),
    ];
    for (field, value) in amounts {
        validate_non_negative(field, value)?;
    }

    let percentages = [
        ("icms_rate", item.icms_rate),
        ("icms_reduction", item.icms_reduction),
        ("ipi_rate", item.ipi_rate),
        ("pis_rate", item.pis_rate),
        ("pis_reduction", item.pis_reduction),
        ("cofins_rate", item.cofins_rate),
        ("cofins_reduction", item.cofins_reduction),
        ("deferral_rate", item.deferral_rate),
        ("icms_st_rate", item.icms_st_rate),
        ("icms_st_reduction", item.icms_st_reduction),
        ("fcp_rate", item.fcp_rate),
        ("fcp_st_rate", item.fcp_st_rate),
        ("fcp_st_retained_rate", item.fcp_st_retained_rate),
        ("credit_rate", item.credit_rate),
        ("difal_internal_rate", item.difal_internal_rate),
        ("difal_interstate_rate", item.difal_interstate_rate),
        ("issqn_rate", item.issqn_rate),
        ("withheld_pis_rate", item.withheld_pis_rate),
        ("withheld_cofins_rate", item.withheld_cofins_rate),
        ("withheld_csll_rate", item.withheld_csll_rate),
        ("withheld_irrf_rate", item.withheld_irrf_rate),
        ("withheld_inss_rate", item.withheld_inss_rate),
        ("ibpt_federal_rate", item.ibpt_federal_rate),
        ("ibpt_state_rate", item.ibpt_state_rate),
        ("ibpt_municipal_rate", item.ibpt_municipal_rate),
        ("ibpt_imported_federal_rate", item.ibpt_imported_federal_rate),
        ("ibs_state_rate", item.ibs_state_rate),
        ("ibs_municipal_rate", item.ibs_municipal_rate),
        ("cbs_rate", item.cbs_rate),
        ("ibs_state_reduction", item.ibs_state_reduction),
        ("ibs_municipal_reduction", item.ibs_municipal_reduction),
        ("cbs_reduction", item.cbs_reduction),
        ("effective_icms_rate", item.effective_icms_rate),
        ("effective_icms_reduction", item.effective_icms_reduction),
        ("ad_rem_reduction", item.ad_rem_reduction),
        ("biodiesel_rate", item.biodiesel_rate),
        ("origin_state_rate", item.origin_state_rate),
    ];
    for (field, value) in percentages {
        validate_percentage(field, value)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
