//! # Engine Configuration
//!
//! Tunable constants of the calculation engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. TOML text handed in by the caller (EngineConfig::from_toml_str)    │
//! │     The core crate never opens files; callers read them.               │
//! │                                                                         │
//! │  2. Default Values (lowest priority)                                   │
//! │     Statutory withholding thresholds: 10 / 10 / 10 / 29                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration Format
//! ```toml
//! [withholding]
//! service_tax = "10"        # ISSQN kept only above this amount
//! federal_retentions = "10" # joint gate for PIS + COFINS + CSLL
//! irrf = "10"
//! inss = "29"
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TaxError, TaxResult};

// =============================================================================
// Withholding Thresholds
// =============================================================================

/// Minimum amounts below which a withholding is not collected.
///
/// A computed amount equal to its threshold is dropped too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingThresholds {
    /// ISSQN service tax.
    #[serde(default = "default_service_tax")]
    pub service_tax: Decimal,

    /// Combined PIS + COFINS + CSLL withholding.
    #[serde(default = "default_federal_retentions")]
    pub federal_retentions: Decimal,

    /// Income tax withholding (IRRF).
    #[serde(default = "default_irrf")]
    pub irrf: Decimal,

    /// Social security withholding (INSS).
    #[serde(default = "default_inss")]
    pub inss: Decimal,
}

fn default_service_tax() -> Decimal {
    Decimal::TEN
}
fn default_federal_retentions() -> Decimal {
    Decimal::TEN
}
fn default_irrf() -> Decimal {
    Decimal::TEN
}
fn default_inss() -> Decimal {
    Decimal::from(29)
}

impl Default for WithholdingThresholds {
    fn default() -> Self {
        WithholdingThresholds {
            service_tax: default_service_tax(),
            federal_retentions: default_federal_retentions(),
            irrf: default_irrf(),
            inss: default_inss(),
        }
    }
}

// =============================================================================
// Main Engine Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Withholding thresholds used by the ISSQN module.
    #[serde(default)]
    pub withholding: WithholdingThresholds,
}

impl EngineConfig {
    /// Creates a config with the statutory defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a TOML document.
    ///
    /// Missing tables and keys fall back to their defaults.
    pub fn from_toml_str(contents: &str) -> TaxResult<Self> {
        let config: EngineConfig =
            toml::from_str(contents).map_err(|e| TaxError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        debug!(withholding = ?config.withholding, "Engine config loaded");
        Ok(config)
    }

    /// Renders the config as TOML.
    pub fn to_toml_string(&self) -> TaxResult<String> {
        toml::to_string_pretty(self).map_err(|e| TaxError::InvalidConfig(e.to_string()))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> TaxResult<()> {
        let thresholds = [
            ("service_tax", self.withholding.service_tax),
            ("federal_retentions", self.withholding.federal_retentions),
            ("irrf", self.withholding.irrf),
            ("inss", self.withholding.inss),
        ];
        for (name, value) in thresholds {
            if value < Decimal::ZERO {
                return Err(TaxError::InvalidConfig(format!(
                    "withholding.{} must not be negative, got: {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
