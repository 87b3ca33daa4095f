//! # Taxable Item
//!
//! The input record of every calculation, plus [`LineAmounts`], the fact
//! projection most base formulas start from.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ERP payload (JSON) ──► TaxableItem ──► TaxCalculator (borrows &item)   │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                         item.amounts() ──► LineAmounts (Copy)           │
//! │                                              │                          │
//! │                          overrides applied HERE, never on the item:     │
//! │                            .without_ipi()          (ST own operation)   │
//! │                            .with_ipi_value(v)      (resolved IPI)       │
//! │                            .with_other_expenses(v) (effective rate)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The item is only ever borrowed immutably, so it is bit-for-bit the same
//! after a calculation as before it, failed calculations included.

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{TaxError, TaxResult};
use crate::types::{
    Cst, DesoneradoCalculation, DiscountType, DocumentType, OperationType, PersonType, TaxRegime,
};

// =============================================================================
// Taxable Item
// =============================================================================

/// One invoice line as seen by the tax engine.
///
/// Percentages are in [0, 100] unless noted. Every field defaults to zero
/// (or `None`/`false`), except `quantity` which defaults to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxableItem {
    // -------------------------------------------------------------------------
    // Monetary base
    // -------------------------------------------------------------------------
    /// Unit price of the product.
    pub product_value: Decimal,
    pub freight: Decimal,
    pub insurance: Decimal,
    pub other_expenses: Decimal,
    pub discount: Decimal,
    /// IPI already known for the line. Zero means "not computed yet".
    pub ipi_value: Decimal,
    pub quantity: Decimal,

    // -------------------------------------------------------------------------
    // Flags & codes
    // -------------------------------------------------------------------------
    pub is_service: bool,
    /// Fixed asset or own consumption: IPI joins the ICMS/PIS/COFINS bases.
    pub is_fixed_asset_or_consumption: bool,
    pub discount_type: DiscountType,
    #[serde(deserialize_with = "empty_as_none")]
    pub cst: Option<Cst>,
    /// Raw CSOSN; classified on demand by the CSOSN module.
    pub csosn: u16,
    #[serde(deserialize_with = "empty_as_none")]
    pub desonerado_calculation: Option<DesoneradoCalculation>,
    #[serde(deserialize_with = "empty_as_none")]
    pub tax_regime: Option<TaxRegime>,
    #[serde(deserialize_with = "empty_as_none")]
    pub operation_type: Option<OperationType>,
    #[serde(deserialize_with = "empty_as_none")]
    pub person_type: Option<PersonType>,
    #[serde(deserialize_with = "empty_as_none")]
    pub document: Option<DocumentType>,

    // -------------------------------------------------------------------------
    // ICMS / IPI / PIS / COFINS
    // -------------------------------------------------------------------------
    pub icms_rate: Decimal,
    pub icms_reduction: Decimal,
    pub ipi_rate: Decimal,
    pub pis_rate: Decimal,
    pub pis_reduction: Decimal,
    pub cofins_rate: Decimal,
    pub cofins_reduction: Decimal,
    /// CST 51 deferral percentage.
    pub deferral_rate: Decimal,
    pub deduct_icms_from_pis_cofins: bool,

    // -------------------------------------------------------------------------
    // ICMS-ST
    // -------------------------------------------------------------------------
    pub icms_st_rate: Decimal,
    /// Value-added margin (MVA). May exceed 100.
    pub mva_rate: Decimal,
    pub icms_st_reduction: Decimal,

    // -------------------------------------------------------------------------
    // FCP / credit / DIFAL
    // -------------------------------------------------------------------------
    pub fcp_rate: Decimal,
    pub fcp_st_rate: Decimal,
    pub fcp_st_retained_rate: Decimal,
    pub last_st_retained_base: Decimal,
    pub credit_rate: Decimal,
    pub difal_internal_rate: Decimal,
    pub difal_interstate_rate: Decimal,

    // -------------------------------------------------------------------------
    // ISSQN and federal withholdings
    // -------------------------------------------------------------------------
    pub issqn_rate: Decimal,
    pub withheld_pis_rate: Decimal,
    pub withheld_cofins_rate: Decimal,
    pub withheld_csll_rate: Decimal,
    pub withheld_irrf_rate: Decimal,
    pub withheld_inss_rate: Decimal,

    // -------------------------------------------------------------------------
    // Transparency (IBPT)
    // -------------------------------------------------------------------------
    pub ibpt_federal_rate: Decimal,
    pub ibpt_state_rate: Decimal,
    pub ibpt_municipal_rate: Decimal,
    pub ibpt_imported_federal_rate: Decimal,

    // -------------------------------------------------------------------------
    // IBS / CBS
    // -------------------------------------------------------------------------
    pub ibs_state_rate: Decimal,
    pub ibs_municipal_rate: Decimal,
    pub cbs_rate: Decimal,
    pub ibs_state_reduction: Decimal,
    pub ibs_municipal_reduction: Decimal,
    pub cbs_reduction: Decimal,
    /// When set, the value is added to the IBS/CBS base; otherwise subtracted.
    pub add_pis_to_ibs_cbs_base: bool,
    pub add_cofins_to_ibs_cbs_base: bool,
    pub add_icms_to_ibs_cbs_base: bool,
    pub add_issqn_to_ibs_cbs_base: bool,

    // -------------------------------------------------------------------------
    // Effective ICMS
    // -------------------------------------------------------------------------
    pub effective_icms_rate: Decimal,
    pub effective_icms_reduction: Decimal,

    // -------------------------------------------------------------------------
    // Single-phase (monofásico) ICMS
    // -------------------------------------------------------------------------
    pub monophasic_quantity: Decimal,
    /// Ad-rem rate: currency per unit, not a percentage.
    pub ad_rem_rate: Decimal,
    pub ad_rem_reduction: Decimal,
    pub biodiesel_rate: Decimal,
    pub origin_state_rate: Decimal,
    pub prior_monophasic_quantity: Decimal,
    /// Ad-rem rate of the earlier withholding: currency per unit.
    pub prior_ad_rem_rate: Decimal,
}

impl Default for TaxableItem {
    fn default() -> Self {
        Self {
            product_value: Decimal::ZERO,
            freight: Decimal::ZERO,
            insurance: Decimal::ZERO,
            other_expenses: Decimal::ZERO,
            discount: Decimal::ZERO,
            ipi_value: Decimal::ZERO,
            quantity: Decimal::ONE,
            is_service: false,
            is_fixed_asset_or_consumption: false,
            discount_type: DiscountType::default(),
            cst: None,
            csosn: 0,
            desonerado_calculation: None,
            tax_regime: None,
            operation_type: None,
            person_type: None,
            document: None,
            icms_rate: Decimal::ZERO,
            icms_reduction: Decimal::ZERO,
            ipi_rate: Decimal::ZERO,
            pis_rate: Decimal::ZERO,
            pis_reduction: Decimal::ZERO,
            cofins_rate: Decimal::ZERO,
            cofins_reduction: Decimal::ZERO,
            deferral_rate: Decimal::ZERO,
            deduct_icms_from_pis_cofins: false,
            icms_st_rate: Decimal::ZERO,
            mva_rate: Decimal::ZERO,
            icms_st_reduction: Decimal::ZERO,
            fcp_rate: Decimal::ZERO,
            fcp_st_rate: Decimal::ZERO,
            fcp_st_retained_rate: Decimal::ZERO,
            last_st_retained_base: Decimal::ZERO,
            credit_rate: Decimal::ZERO,
            difal_internal_rate: Decimal::ZERO,
            difal_interstate_rate: Decimal::ZERO,
            issqn_rate: Decimal::ZERO,
            withheld_pis_rate: Decimal::ZERO,
            withheld_cofins_rate: Decimal::ZERO,
            withheld_csll_rate: Decimal::ZERO,
            withheld_irrf_rate: Decimal::ZERO,
            withheld_inss_rate: Decimal::ZERO,
            ibpt_federal_rate: Decimal::ZERO,
            ibpt_state_rate: Decimal::ZERO,
            ibpt_municipal_rate: Decimal::ZERO,
            ibpt_imported_federal_rate: Decimal::ZERO,
            ibs_state_rate: Decimal::ZERO,
            ibs_municipal_rate: Decimal::ZERO,
            cbs_rate: Decimal::ZERO,
            ibs_state_reduction: Decimal::ZERO,
            ibs_municipal_reduction: Decimal::ZERO,
            cbs_reduction: Decimal::ZERO,
            add_pis_to_ibs_cbs_base: false,
            add_cofins_to_ibs_cbs_base: false,
            add_icms_to_ibs_cbs_base: false,
            add_issqn_to_ibs_cbs_base: false,
            effective_icms_rate: Decimal::ZERO,
            effective_icms_reduction: Decimal::ZERO,
            monophasic_quantity: Decimal::ZERO,
            ad_rem_rate: Decimal::ZERO,
            ad_rem_reduction: Decimal::ZERO,
            biodiesel_rate: Decimal::ZERO,
            origin_state_rate: Decimal::ZERO,
            prior_monophasic_quantity: Decimal::ZERO,
            prior_ad_rem_rate: Decimal::ZERO,
        }
    }
}

impl TaxableItem {
    /// Decodes an item from an ERP JSON payload.
    ///
    /// Missing fields take their defaults; codes are parsed from text. An
    /// unrecognised code fails with [`TaxError::UnknownClassification`],
    /// anything else malformed with [`TaxError::InvalidPayload`].
    pub fn from_json(payload: &str) -> TaxResult<Self> {
        let value: serde_json::Value = serde_json::from_str(payload).map_err(invalid_payload)?;
        check_codes(&value)?;
        serde_json::from_value(value).map_err(invalid_payload)
    }

    /// Projects the monetary facts shared by the base formulas.
    ///
    /// IPI is included exactly when the item is a fixed asset or for own
    /// consumption.
    pub fn amounts(&self) -> LineAmounts {
        LineAmounts {
            product_value: self.product_value,
            quantity: self.quantity,
            freight: self.freight,
            insurance: self.insurance,
            other_expenses: self.other_expenses,
            discount: self.discount,
            discount_type: self.discount_type,
            ipi_value: self.ipi_value,
            include_ipi: self.is_fixed_asset_or_consumption,
        }
    }

    /// `product_value × quantity`.
    pub fn subtotal(&self) -> Decimal {
        self.product_value * self.quantity
    }
}

fn invalid_payload(err: serde_json::Error) -> TaxError {
    TaxError::InvalidPayload(err.to_string())
}

/// Parses the textual codes of a payload ahead of decoding, keeping their
/// own error instead of serde's message.
fn check_codes(value: &serde_json::Value) -> TaxResult<()> {
    let code = |field: &str| {
        value
            .get(field)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|code| !code.is_empty())
    };

    if let Some(code) = code("cst") {
        code.parse::<Cst>()?;
    }
    if let Some(code) = code("discount_type") {
        code.parse::<DiscountType>()?;
    }
    if let Some(code) = code("desonerado_calculation") {
        code.parse::<DesoneradoCalculation>()?;
    }
    if let Some(code) = code("tax_regime") {
        code.parse::<TaxRegime>()?;
    }
    if let Some(code) = code("operation_type") {
        code.parse::<OperationType>()?;
    }
    if let Some(code) = code("person_type") {
        code.parse::<PersonType>()?;
    }
    if let Some(code) = code("document") {
        code.parse::<DocumentType>()?;
    }
    Ok(())
}

/// Treats an empty or missing code as `None` and parses anything else.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(code) => code.parse().map(Some).map_err(de::Error::custom),
    }
}

// =============================================================================
// Line Amounts (fact projection)
// =============================================================================

/// Monetary facts of a line, with explicit overrides.
///
/// `Copy` on purpose: each formula takes its own projection, adjusts it with
/// the `with_*`/`without_*` builders and drops it afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineAmounts {
    pub product_value: Decimal,
    pub quantity: Decimal,
    pub freight: Decimal,
    pub insurance: Decimal,
    pub other_expenses: Decimal,
    pub discount: Decimal,
    pub discount_type: DiscountType,
    pub ipi_value: Decimal,
    /// Whether `ipi_value` joins the base.
    pub include_ipi: bool,
}

impl LineAmounts {
    /// `product_value × quantity + freight + insurance + other_expenses`.
    pub fn gross(&self) -> Decimal {
        self.product_value * self.quantity + self.freight + self.insurance + self.other_expenses
    }

    /// The discount with its sign: `+` for Conditional, `−` for Unconditional.
    pub fn signed_discount(&self) -> Decimal {
        match self.discount_type {
            DiscountType::Conditional => self.discount,
            DiscountType::Unconditional => -self.discount,
        }
    }

    /// IPI share of the base (zero unless included).
    pub fn ipi_share(&self) -> Decimal {
        if self.include_ipi {
            self.ipi_value
        } else {
            Decimal::ZERO
        }
    }

    /// `gross + IPI share ± discount`, the raw base most modules start from.
    pub fn raw_base(&self) -> Decimal {
        self.gross() + self.ipi_share() + self.signed_discount()
    }

    /// Forces IPI out of the base.
    pub fn without_ipi(mut self) -> Self {
        self.include_ipi = false;
        self
    }

    /// Replaces the IPI value (inclusion unchanged).
    pub fn with_ipi_value(mut self, ipi_value: Decimal) -> Self {
        self.ipi_value = ipi_value;
        self
    }

    /// Replaces other expenses.
    pub fn with_other_expenses(mut self, other_expenses: Decimal) -> Self {
        self.other_expenses = other_expenses;
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> TaxableItem {
        TaxableItem {
            product_value: dec!(100),
            freight: dec!(10),
            insurance: dec!(5),
            other_expenses: dec!(2),
            discount: dec!(7),
            ipi_value: dec!(15),
            quantity: dec!(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_quantity_is_one() {
        let item = TaxableItem::default();
        assert_eq!(item.quantity, dec!(1));
        assert_eq!(item.discount_type, DiscountType::Unconditional);
        assert!(item.cst.is_none());
    }

    #[test]
    fn test_gross_and_discount_sign() {
        let item = sample();
        let amounts = item.amounts();
        assert_eq!(amounts.gross(), dec!(217));
        assert_eq!(amounts.signed_discount(), dec!(-7));
        assert_eq!(amounts.raw_base(), dec!(210));

        let conditional = TaxableItem {
            discount_type: DiscountType::Conditional,
            ..sample()
        };
        assert_eq!(conditional.amounts().raw_base(), dec!(224));
    }

    #[test]
    fn test_ipi_only_for_fixed_assets() {
        let item = TaxableItem {
            is_fixed_asset_or_consumption: true,
            ..sample()
        };
        assert_eq!(item.amounts().raw_base(), dec!(225));
        assert_eq!(item.amounts().without_ipi().raw_base(), dec!(210));
        assert_eq!(item.amounts().with_ipi_value(dec!(1.5)).raw_base(), dec!(211.5));
    }

    #[test]
    fn test_overrides_leave_item_untouched() {
        let item = sample();
        let before = item.clone();
        let _ = item.amounts().with_other_expenses(dec!(99)).without_ipi();
        assert_eq!(item, before);
    }

    #[test]
    fn test_from_json() {
        let payload = r#"{
            "product_value": "100.00",
            "discount": "5",
            "discount_type": "Condicional",
            "cst": "20",
            "icms_rate": "18",
            "document": "",
            "csosn": 900
        }"#;
        let item = TaxableItem::from_json(payload).unwrap();
        assert_eq!(item.product_value, dec!(100));
        assert_eq!(item.quantity, dec!(1));
        assert_eq!(item.discount_type, DiscountType::Conditional);
        assert_eq!(item.cst, Some(Cst::ReducedBase));
        assert_eq!(item.document, None);
        assert_eq!(item.csosn, 900);
    }

    #[test]
    fn test_from_json_rejects_unknown_cst() {
        let err = TaxableItem::from_json(r#"{"cst": "99"}"#).unwrap_err();
        assert!(matches!(
            err,
            TaxError::UnknownClassification { kind: "CST", ref code } if code == "99"
        ));
    }

    #[test]
    fn test_from_json_rejects_unknown_document() {
        let err = TaxableItem::from_json(r#"{"cst": "00", "document": "NFS-e"}"#).unwrap_err();
        assert!(matches!(err, TaxError::UnknownClassification { kind: "document type", .. }));
    }

    #[test]
    fn test_from_json_malformed_payload() {
        let err = TaxableItem::from_json(r#"{"cst": "00""#).unwrap_err();
        assert!(matches!(err, TaxError::InvalidPayload(_)));

        let err = TaxableItem::from_json(r#"{"product_value": "abc"}"#).unwrap_err();
        assert!(matches!(err, TaxError::InvalidPayload(_)));
    }
}
