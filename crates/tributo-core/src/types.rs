//! # Domain Types
//!
//! Categorical codes carried by a taxable item.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Cst        │   │     Csosn       │   │  DiscountType   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  00 10 20 30 40 │   │  101 102 103    │   │  Conditional    │       │
//! │  │  41 50 51 60 70 │   │  201 202 203    │   │  Unconditional  │       │
//! │  │  90 02 15 53 61 │   │  300 400 500 900│   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌────────────────┐   │
//! │  │  DocumentType   │   │ DesoneradoCalculation│   │ TaxRegime      │   │
//! │  │  NFe CTe MFe    │   │ BaseSimples          │   │ OperationType  │   │
//! │  └─────────────────┘   │ BasePorDentro        │   │ PersonType     │   │
//! │                        └──────────────────────┘   └────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Every code travels as the text the invoicing documents use (`"20"`,
//! `"Condicional"`, `"NFe"`, `"BasePorDentro"`). Parsing is lenient about
//! case and accepts the English spelling too; an unknown text is an
//! [`TaxError::UnknownClassification`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TaxError;

/// Wires a code enum's `Display`/`FromStr` into serde as plain text.
macro_rules! text_code_serde {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl TryFrom<String> for $ty {
                type Error = TaxError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    value.parse()
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.to_string()
                }
            }
        )+
    };
}

// =============================================================================
// Discount Type
// =============================================================================

/// How the line discount relates to the product value.
///
/// ## Sign Convention
/// ```text
/// Conditional   → discount was already taken out of the product value and
///                 is ADDED back to the base before any reduction
/// Unconditional → discount genuinely lowers the base and is SUBTRACTED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DiscountType {
    /// Discount subject to a later condition ("Condicional").
    Conditional,
    /// Discount granted on the invoice itself ("Incondicional").
    #[default]
    Unconditional,
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountType::Conditional => write!(f, "Condicional"),
            DiscountType::Unconditional => write!(f, "Incondicional"),
        }
    }
}

impl FromStr for DiscountType {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "condicional" | "conditional" => Ok(DiscountType::Conditional),
            "incondicional" | "unconditional" => Ok(DiscountType::Unconditional),
            _ => Err(TaxError::unknown("discount type", s)),
        }
    }
}

// =============================================================================
// Document Type
// =============================================================================

/// Fiscal document the item is being issued on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DocumentType {
    /// Nota Fiscal Eletrônica (goods).
    NFe,
    /// Conhecimento de Transporte Eletrônico (freight).
    CTe,
    /// Manifesto Fiscal Eletrônico (retail).
    MFe,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::NFe => write!(f, "NFe"),
            DocumentType::CTe => write!(f, "CTe"),
            DocumentType::MFe => write!(f, "MFe"),
        }
    }
}

impl FromStr for DocumentType {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nfe" => Ok(DocumentType::NFe),
            "cte" => Ok(DocumentType::CTe),
            "mfe" => Ok(DocumentType::MFe),
            _ => Err(TaxError::unknown("document type", s)),
        }
    }
}

// =============================================================================
// Desonerado Calculation
// =============================================================================

/// Method used to quantify waived ICMS (ICMS desonerado).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DesoneradoCalculation {
    /// Rate applied straight to the ICMS base.
    BaseSimples,
    /// Tax-inclusive ("por dentro") gross-up of the base.
    BasePorDentro,
}

impl fmt::Display for DesoneradoCalculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesoneradoCalculation::BaseSimples => write!(f, "BaseSimples"),
            DesoneradoCalculation::BasePorDentro => write!(f, "BasePorDentro"),
        }
    }
}

impl FromStr for DesoneradoCalculation {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basesimples" | "simple" => Ok(DesoneradoCalculation::BaseSimples),
            "basepordentro" | "inclusive" => Ok(DesoneradoCalculation::BasePorDentro),
            _ => Err(TaxError::unknown("desonerado calculation", s)),
        }
    }
}

// =============================================================================
// CST (Código de Situação Tributária)
// =============================================================================

/// ICMS tax-situation code for the normal regime.
///
/// Closed set: anything else is rejected while parsing, so the dispatch
/// tables in [`crate::dispatch`] can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Cst {
    /// 00 - fully taxed.
    FullyTaxed,
    /// 10 - taxed, with ST collection.
    TaxedWithSt,
    /// 20 - reduced base.
    ReducedBase,
    /// 30 - exempt or not taxed, with ST collection.
    ExemptWithSt,
    /// 40 - exempt.
    Exempt,
    /// 41 - not taxed.
    NotTaxed,
    /// 50 - suspended.
    Suspended,
    /// 51 - deferred.
    Deferred,
    /// 60 - ST already collected.
    StCollectedPreviously,
    /// 70 - reduced base, with ST collection.
    ReducedBaseWithSt,
    /// 90 - other.
    Other,
    /// 02 - single-phase, own tax.
    MonophasicOwn,
    /// 15 - single-phase, own tax plus retention (biodiesel blend).
    MonophasicWithRetention,
    /// 53 - single-phase, deferred.
    MonophasicDeferred,
    /// 61 - single-phase, previously withheld.
    MonophasicPreviouslyWithheld,
}

impl Cst {
    /// Two-digit code as printed on the document.
    pub const fn code(&self) -> &'static str {
        match self {
            Cst::FullyTaxed => "00",
            Cst::TaxedWithSt => "10",
            Cst::ReducedBase => "20",
            Cst::ExemptWithSt => "30",
            Cst::Exempt => "40",
            Cst::NotTaxed => "41",
            Cst::Suspended => "50",
            Cst::Deferred => "51",
            Cst::StCollectedPreviously => "60",
            Cst::ReducedBaseWithSt => "70",
            Cst::Other => "90",
            Cst::MonophasicOwn => "02",
            Cst::MonophasicWithRetention => "15",
            Cst::MonophasicDeferred => "53",
            Cst::MonophasicPreviouslyWithheld => "61",
        }
    }

    /// Whether the code belongs to the single-phase fuel regime.
    pub const fn is_monophasic(&self) -> bool {
        matches!(
            self,
            Cst::MonophasicOwn
                | Cst::MonophasicWithRetention
                | Cst::MonophasicDeferred
                | Cst::MonophasicPreviouslyWithheld
        )
    }
}

impl fmt::Display for Cst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Cst {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "00" => Ok(Cst::FullyTaxed),
            "10" => Ok(Cst::TaxedWithSt),
            "20" => Ok(Cst::ReducedBase),
            "30" => Ok(Cst::ExemptWithSt),
            "40" => Ok(Cst::Exempt),
            "41" => Ok(Cst::NotTaxed),
            "50" => Ok(Cst::Suspended),
            "51" => Ok(Cst::Deferred),
            "60" => Ok(Cst::StCollectedPreviously),
            "70" => Ok(Cst::ReducedBaseWithSt),
            "90" => Ok(Cst::Other),
            "02" => Ok(Cst::MonophasicOwn),
            "15" => Ok(Cst::MonophasicWithRetention),
            "53" => Ok(Cst::MonophasicDeferred),
            "61" => Ok(Cst::MonophasicPreviouslyWithheld),
            _ => Err(TaxError::unknown("CST", s)),
        }
    }
}

// =============================================================================
// CSOSN (Código de Situação da Operação no Simples Nacional)
// =============================================================================

/// Tax-situation code for companies under the simplified regime.
///
/// The taxable item keeps the raw integer; classification happens on demand
/// through `TryFrom<u16>` so an unknown code can degrade gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Csosn {
    /// 101 - taxed with credit permission.
    CreditPermitted,
    /// 102 - taxed without credit permission.
    NoCredit,
    /// 103 - exempt for the gross-revenue band.
    RevenueBandExempt,
    /// 201 - with credit permission and ST collection.
    CreditWithSt,
    /// 202 - without credit permission, with ST collection.
    NoCreditWithSt,
    /// 203 - revenue-band exemption, with ST collection.
    RevenueBandExemptWithSt,
    /// 300 - immune.
    Immune,
    /// 400 - not taxed.
    NotTaxed,
    /// 500 - ICMS previously collected by ST.
    StCollectedPreviously,
    /// 900 - other.
    Other,
}

impl Csosn {
    /// Three-digit code.
    pub const fn code(&self) -> u16 {
        match self {
            Csosn::CreditPermitted => 101,
            Csosn::NoCredit => 102,
            Csosn::RevenueBandExempt => 103,
            Csosn::CreditWithSt => 201,
            Csosn::NoCreditWithSt => 202,
            Csosn::RevenueBandExemptWithSt => 203,
            Csosn::Immune => 300,
            Csosn::NotTaxed => 400,
            Csosn::StCollectedPreviously => 500,
            Csosn::Other => 900,
        }
    }
}

impl TryFrom<u16> for Csosn {
    type Error = TaxError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            101 => Ok(Csosn::CreditPermitted),
            102 => Ok(Csosn::NoCredit),
            103 => Ok(Csosn::RevenueBandExempt),
            201 => Ok(Csosn::CreditWithSt),
            202 => Ok(Csosn::NoCreditWithSt),
            203 => Ok(Csosn::RevenueBandExemptWithSt),
            300 => Ok(Csosn::Immune),
            400 => Ok(Csosn::NotTaxed),
            500 => Ok(Csosn::StCollectedPreviously),
            900 => Ok(Csosn::Other),
            other => Err(TaxError::unknown("CSOSN", other.to_string())),
        }
    }
}

impl From<Csosn> for u16 {
    fn from(value: Csosn) -> Self {
        value.code()
    }
}

impl fmt::Display for Csosn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// =============================================================================
// Informational Codes
// =============================================================================

/// Company tax regime (CRT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TaxRegime {
    /// Simplified regime; ICMS situation comes from the CSOSN.
    SimplesNacional,
    /// Normal regime; ICMS situation comes from the CST.
    RegimeNormal,
}

impl fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxRegime::SimplesNacional => write!(f, "SimplesNacional"),
            TaxRegime::RegimeNormal => write!(f, "RegimeNormal"),
        }
    }
}

impl FromStr for TaxRegime {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simplesnacional" | "simples" => Ok(TaxRegime::SimplesNacional),
            "regimenormal" | "normal" => Ok(TaxRegime::RegimeNormal),
            _ => Err(TaxError::unknown("tax regime", s)),
        }
    }
}

/// Whether goods stay inside the state or cross a state line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OperationType {
    Internal,
    Interstate,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::Internal => write!(f, "OperacaoInterna"),
            OperationType::Interstate => write!(f, "OperacaoInterestadual"),
        }
    }
}

impl FromStr for OperationType {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "operacaointerna" | "internal" => Ok(OperationType::Internal),
            "operacaointerestadual" | "interstate" => Ok(OperationType::Interstate),
            _ => Err(TaxError::unknown("operation type", s)),
        }
    }
}

/// Buyer kind: individual or company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PersonType {
    Natural,
    Legal,
}

impl fmt::Display for PersonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonType::Natural => write!(f, "Fisica"),
            PersonType::Legal => write!(f, "Juridica"),
        }
    }
}

impl FromStr for PersonType {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fisica" | "natural" => Ok(PersonType::Natural),
            "juridica" | "legal" => Ok(PersonType::Legal),
            _ => Err(TaxError::unknown("person type", s)),
        }
    }
}

text_code_serde!(
    DiscountType,
    DocumentType,
    DesoneradoCalculation,
    Cst,
    TaxRegime,
    OperationType,
    PersonType,
);

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_type_default() {
        assert_eq!(DiscountType::default(), DiscountType::Unconditional);
    }

    #[test]
    fn test_discount_type_parsing() {
        assert_eq!("Condicional".parse::<DiscountType>().unwrap(), DiscountType::Conditional);
        assert_eq!("conditional".parse::<DiscountType>().unwrap(), DiscountType::Conditional);
        assert_eq!("Incondicional".parse::<DiscountType>().unwrap(), DiscountType::Unconditional);
        assert!("Parcial".parse::<DiscountType>().is_err());
    }

    #[test]
    fn test_cst_codes_round_trip() {
        for code in ["00", "10", "20", "30", "40", "41", "50", "51", "60", "70", "90", "02", "15", "53", "61"] {
            let cst: Cst = code.parse().unwrap();
            assert_eq!(cst.code(), code);
            assert_eq!(cst.to_string(), code);
        }
    }

    #[test]
    fn test_unknown_cst_is_rejected() {
        let err = "99".parse::<Cst>().unwrap_err();
        assert_eq!(
            err,
            TaxError::UnknownClassification {
                kind: "CST",
                code: "99".to_string()
            }
        );
    }

    #[test]
    fn test_monophasic_cst() {
        assert!(Cst::MonophasicOwn.is_monophasic());
        assert!(Cst::MonophasicPreviouslyWithheld.is_monophasic());
        assert!(!Cst::Deferred.is_monophasic());
    }

    #[test]
    fn test_csosn_try_from() {
        assert_eq!(Csosn::try_from(900).unwrap(), Csosn::Other);
        assert_eq!(Csosn::try_from(102).unwrap().code(), 102);
        assert!(Csosn::try_from(999).is_err());
        assert!(Csosn::try_from(0).is_err());
    }

    #[test]
    fn test_codes_serialize_as_text() {
        assert_eq!(serde_json::to_string(&Cst::ReducedBase).unwrap(), "\"20\"");
        assert_eq!(serde_json::to_string(&DocumentType::CTe).unwrap(), "\"CTe\"");
        let discount: DiscountType = serde_json::from_str("\"Condicional\"").unwrap();
        assert_eq!(discount, DiscountType::Conditional);
        assert!(serde_json::from_str::<Cst>("\"7\"").is_err());
    }

    #[test]
    fn test_informational_codes() {
        assert_eq!("SimplesNacional".parse::<TaxRegime>().unwrap(), TaxRegime::SimplesNacional);
        assert_eq!("OperacaoInterestadual".parse::<OperationType>().unwrap(), OperationType::Interstate);
        assert_eq!(PersonType::Legal.to_string(), "Juridica");
    }
}
