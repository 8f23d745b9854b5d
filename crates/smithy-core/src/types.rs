use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tax::Province;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimal fractions (0.2965 = 29.65%). Fields that carry
/// annual percentages (mortgage and HELOC rates, matching the input contract)
/// say so in their doc comment.
pub type Rate = Decimal;

/// One real-estate asset's mortgage and, optionally, rental economics.
///
/// The rental-only fields are absent for the primary residence; an absent
/// value is treated as zero. Invariant (enforced by the caller, not the
/// engine): `current_amount_owing <= mortgage_amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyFinancials {
    pub mortgage_amount: Money,
    /// Annual interest rate in percent (5.5 = 5.5%)
    pub interest_rate: Decimal,
    pub amortization_years: u32,
    pub current_amount_owing: Money,
    pub property_value: Money,
    /// Override for the derived annuity payment. Zero is treated as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_rent: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_maintenance_fees: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_property_tax: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_insurance: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_utilities: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_management_fees: Option<Money>,
    /// Downpayment drawn on the HELOC to acquire the rental property
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downpayment_amount: Option<Money>,
    /// Annual rate in percent on the HELOC-funded downpayment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heloc_downpayment_interest: Option<Decimal>,
    /// Outstanding balance on the rental property's own mortgage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property2_mortgage_amount: Option<Money>,
    /// Annual rate in percent on the rental property's own mortgage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property2_mortgage_interest: Option<Decimal>,
}

/// The primary taxpayer's income position.
///
/// The marginal rate is always derived from the embedded tax tables; it is
/// never accepted as input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxpayerIncome {
    pub province: Province,
    /// Gross income minus RRSPs, pensions and similar adjustments
    pub net_taxable_income: Money,
    /// Other taxable income sources (informational)
    #[serde(default)]
    pub other_taxable_income: Money,
}

/// The spouse's income position. The spouse is assumed resident in the
/// primary taxpayer's province.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpouseIncome {
    pub net_taxable_income: Money,
    #[serde(default)]
    pub other_taxable_income: Money,
}

/// Full input to one projection. Constructed fresh per calculation; the
/// engine holds no state across calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorInput {
    pub primary_property: PropertyFinancials,
    pub income: TaxpayerIncome,
    /// Presence of a rental property triggers the rental and household logic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property2: Option<PropertyFinancials>,
    /// Presence of a spouse enables income splitting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse: Option<SpouseIncome>,
    /// Annual HELOC rate in percent. Zero falls back to the 7.2% default.
    #[serde(default)]
    pub heloc_interest_rate: Decimal,
    /// Ownership share of the rental property, in percent. Ignored (forced
    /// to 100) when no spouse is configured.
    #[serde(default = "full_ownership")]
    pub primary_owner_percentage: Decimal,
    #[serde(default)]
    pub spouse_percentage: Decimal,
    /// Recorded but not consumed: allocation follows the ownership
    /// percentages. Setting it produces a warning in the output envelope.
    #[serde(default)]
    pub rental_income_to_spouse: bool,
}

fn full_ownership() -> Decimal {
    Decimal::ONE_HUNDRED
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
