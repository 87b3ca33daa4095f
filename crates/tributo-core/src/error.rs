//! # Error Types
//!
//! Domain-specific error types for tributo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  TaxError              - Everything a calculation can fail with         │
//! │  ├── NoMatchingRule    - Strict lookup found no formula branch          │
//! │  ├── UnknownClassification - Code missing from a classification table  │
//! │  ├── DependencyCycle   - Calculation plan cannot be ordered             │
//! │  ├── InvalidConfig     - Engine configuration rejected                  │
//! │  ├── InvalidPayload    - ERP JSON could not be decoded                  │
//! │  └── Validation        - Wraps ValidationError                          │
//! │                                                                         │
//! │  ValidationError       - Taxable-item fields outside their domain       │
//! │                                                                         │
//! │  Flow: ValidationError → TaxError → ERP caller                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (table title, code, field)
//! 3. Errors are enum variants, never String
//! 4. Nothing is retried: every calculation is pure and deterministic

use thiserror::Error;

// =============================================================================
// Tax Error
// =============================================================================

/// Calculation errors.
///
/// A module either returns a complete result or one of these. Partial
/// results are never handed back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxError {
    /// A strict formula lookup matched zero branches.
    ///
    /// ## When This Occurs
    /// - ICMS-Desonerado "BasePorDentro" with a CST outside 20/30/40/70
    ///
    /// An unmatched configuration is a compliance defect. It is never
    /// silently replaced by a default value.
    #[error("No matching rule in '{table}' for {facts}")]
    NoMatchingRule { table: &'static str, facts: String },

    /// A categorical code is absent from its classification table.
    ///
    /// ## When This Occurs
    /// - Parsing a CST that is not part of the closed CST set
    /// - Parsing an unknown discount type, document type or calculation kind
    ///
    /// The CSOSN module does NOT raise this; it degrades to an explicit
    /// `Unknown` result instead.
    #[error("Unknown {kind} classification: '{code}'")]
    UnknownClassification { kind: &'static str, code: String },

    /// The calculation plan contains a dependency cycle.
    #[error("Dependency cycle detected at '{0}'")]
    DependencyCycle(String),

    /// Engine configuration could not be parsed or is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A taxable-item payload could not be decoded.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl TaxError {
    /// Shorthand used by the classification parsers.
    pub(crate) fn unknown(kind: &'static str, code: impl Into<String>) -> Self {
        TaxError::UnknownClassification {
            kind,
            code: code.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Taxable-item validation errors.
///
/// Raised by [`crate::validation::validate_item`] before any formula runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Amount must not be negative.
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: String },

    /// Percentage is outside [0, 100].
    #[error("{field} must be between 0 and 100 (got {value})")]
    PercentageOutOfRange { field: &'static str, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with TaxError.
pub type TaxResult<T> = Result<T, TaxError>;

// =============================================================================
// Unit Tests
// =============================================================================
