//! Scenario orchestration: the single entry point that drives rate
//! resolution, mortgage math, rental evaluation and household aggregation,
//! and assembles the result aggregate.

use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::diagnostics::{DiagnosticsSink, NoopSink};
use crate::household::{allocate_household, HouseholdAllocation, OwnershipSplit};
use crate::mortgage;
use crate::rental::{evaluate_rental_property, RentalMetrics};
use crate::tax::{Province, TaxTables};
use crate::types::{with_metadata, CalculatorInput, ComputationOutput, Money, Rate};
use crate::SmithyResult;

/// HELOC rate in percent applied when the input leaves the rate unset
pub const DEFAULT_HELOC_RATE_PCT: Decimal = dec!(7.2);

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Projected annual outcome of the Smith Manoeuvre.
///
/// A pure function of [`CalculatorInput`] and the embedded rate tables:
/// identical input always yields identical output. Rental and payoff fields
/// are absent when no rental property is configured or the payoff math is
/// not applicable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub equity_gained: Money,
    pub tax_savings: Money,
    /// HELOC interest on the recycled equity
    pub investment_loan_interest: Money,
    pub total_savings: Money,
    /// Additional monthly payment available for primary mortgage paydown
    pub monthly_cash_flow: Money,
    pub monthly_mortgage_payment: Money,
    pub monthly_interest_portion: Money,
    pub monthly_principal_portion: Money,
    pub annual_interest_portion: Money,
    pub heloc_interest_cost: Money,
    pub net_tax_benefit: Money,
    /// Annual HELOC rate actually applied, in percent
    pub heloc_interest_rate: Decimal,
    /// The primary taxpayer's resolved combined marginal rate
    pub marginal_tax_rate: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_property_cash_flow: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_property_tax_deductions: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_rental_income: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downpayment_amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heloc_downpayment_interest: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property2_mortgage_amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property2_mortgage_interest: Option<Money>,
    pub primary_tax_credits: Money,
    pub primary_tax_savings: Money,
    pub primary_increased_taxable_income: Money,
    pub spouse_tax_credits: Money,
    pub spouse_tax_savings: Money,
    pub spouse_increased_taxable_income: Money,
    pub household_tax_benefit: Money,
    /// Months to pay off the primary balance at the regular payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_payoff_months: Option<Decimal>,
    /// Months to pay off with the Smith Manoeuvre cash flow added
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerated_payoff_months: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_months_saved: Option<Decimal>,
}

/// The calculation engine: immutable rate tables plus an injected
/// diagnostics sink, both fixed at construction.
pub struct SmithManoeuvreEngine {
    tables: TaxTables,
    diagnostics: Box<dyn DiagnosticsSink>,
}

impl Default for SmithManoeuvreEngine {
    fn default() -> Self {
        SmithManoeuvreEngine::new(TaxTables::canada_2024(), Box::new(NoopSink))
    }
}

impl SmithManoeuvreEngine {
    pub fn new(tables: TaxTables, diagnostics: Box<dyn DiagnosticsSink>) -> Self {
        SmithManoeuvreEngine {
            tables,
            diagnostics,
        }
    }

    pub fn tables(&self) -> &TaxTables {
        &self.tables
    }

    /// Run one full projection.
    ///
    /// Value ranges are the caller's responsibility; degenerate numerics
    /// resolve to sentinels rather than errors. Structural problems (an
    /// amortization of zero years with no payment override) fail fast.
    pub fn calculate(
        &self,
        input: &CalculatorInput,
    ) -> SmithyResult<ComputationOutput<CalculationResult>> {
        let start = Instant::now();
        let mut warnings: Vec<String> = Vec::new();

        let primary = &input.primary_property;

        // Payment override wins when present; zero counts as absent
        let monthly_payment = match primary.monthly_payment.filter(|p| !p.is_zero()) {
            Some(payment) => payment,
            None => mortgage::monthly_payment(
                primary.mortgage_amount,
                primary.interest_rate,
                primary.amortization_years,
            )?,
        };

        // Interest/principal split on today's balance. Primary-residence
        // mortgage interest is NOT deductible; the deduction comes only from
        // the investment-purpose borrowing below.
        let monthly_rate = mortgage::monthly_rate_from_annual_pct(primary.interest_rate);
        let remaining_balance = if primary.current_amount_owing.is_zero() {
            primary.mortgage_amount
        } else {
            primary.current_amount_owing
        };
        let monthly_interest = remaining_balance * monthly_rate;
        let annual_interest = monthly_interest * MONTHS_PER_YEAR;
        let monthly_principal = monthly_payment - monthly_interest;

        // Equity freed by this year's principal paydown is re-borrowed at
        // the HELOC rate to fund the next investment tranche. The rental
        // sweep lands on the equity afterwards and is not re-borrowed.
        let mut equity_gained = monthly_principal * MONTHS_PER_YEAR;
        let heloc_rate_pct = if input.heloc_interest_rate.is_zero() {
            DEFAULT_HELOC_RATE_PCT
        } else {
            input.heloc_interest_rate
        };
        let heloc_interest = equity_gained * heloc_rate_pct / PERCENT;

        let primary_rate = self
            .tables
            .marginal_rate(&input.income.province, input.income.net_taxable_income);
        if let Province::Other(code) = &input.income.province {
            warnings.push(format!(
                "Unknown province code '{code}': applied the flat {} fallback rate",
                self.tables.unknown_province_rate
            ));
        }

        // Investment-purpose interest is deductible
        let heloc_tax_deduction = heloc_interest * primary_rate;

        let mut monthly_acceleration = heloc_tax_deduction / MONTHS_PER_YEAR;

        let rental_property = input
            .property2
            .as_ref()
            .filter(|p| !p.monthly_rent.unwrap_or_default().is_zero());

        let (rental, household, split) = match rental_property {
            Some(property) => {
                if input.rental_income_to_spouse {
                    warnings.push(
                        "rental_income_to_spouse is recorded but not applied: allocation \
                         follows the ownership percentages"
                            .to_string(),
                    );
                }

                let split = OwnershipSplit::resolve(
                    input.primary_owner_percentage,
                    input.spouse_percentage,
                    input.spouse.is_some(),
                );
                if input.spouse.is_some() && !split.is_partition() {
                    warnings.push(format!(
                        "Ownership percentages sum to {}, expected 100; allocation totals \
                         will not partition cleanly",
                        split.primary_pct + split.spouse_pct
                    ));
                }

                // Per-taxpayer rates are applied by the household split, so
                // the evaluation itself runs tax-free
                let metrics = evaluate_rental_property(property, Decimal::ZERO);

                // Spouse assumed resident in the primary taxpayer's province
                let spouse_rate = input
                    .spouse
                    .as_ref()
                    .map(|s| {
                        self.tables
                            .marginal_rate(&input.income.province, s.net_taxable_income)
                    })
                    .unwrap_or(Decimal::ZERO);

                let household = allocate_household(
                    &metrics,
                    &split,
                    primary_rate,
                    spouse_rate,
                    heloc_tax_deduction,
                );

                // 100% of rental income accelerates the primary mortgage and
                // builds primary-property equity
                monthly_acceleration += metrics.monthly_cash_flow;
                equity_gained += metrics.monthly_cash_flow * MONTHS_PER_YEAR;

                (Some(metrics), household, Some(split))
            }
            None => (
                None,
                HouseholdAllocation::heloc_only(heloc_tax_deduction),
                None,
            ),
        };

        let (regular_payoff, accelerated_payoff, payoff_saved) = payoff_projection(
            primary.current_amount_owing,
            monthly_payment,
            monthly_rate,
            monthly_acceleration,
        );

        let result = CalculationResult {
            equity_gained,
            tax_savings: household.household_tax_benefit,
            investment_loan_interest: heloc_interest,
            total_savings: household.household_tax_benefit,
            monthly_cash_flow: monthly_acceleration,
            monthly_mortgage_payment: monthly_payment,
            monthly_interest_portion: monthly_interest,
            monthly_principal_portion: monthly_principal,
            annual_interest_portion: annual_interest,
            heloc_interest_cost: heloc_interest,
            net_tax_benefit: household.household_tax_benefit,
            heloc_interest_rate: heloc_rate_pct,
            marginal_tax_rate: primary_rate,
            rental_property_cash_flow: rental.as_ref().map(|r| r.monthly_cash_flow),
            rental_property_tax_deductions: rental.as_ref().map(|r| r.annual_tax_deductions),
            net_rental_income: rental.as_ref().map(|r| r.net_rental_income),
            downpayment_amount: rental.as_ref().map(|r| r.downpayment_amount),
            heloc_downpayment_interest: rental.as_ref().map(|r| r.heloc_downpayment_interest),
            property2_mortgage_amount: rental.as_ref().map(|r| r.property2_mortgage_amount),
            property2_mortgage_interest: rental.as_ref().map(|r| r.property2_mortgage_interest),
            primary_tax_credits: household.primary.tax_credits,
            primary_tax_savings: household.primary.tax_savings,
            primary_increased_taxable_income: household.primary.increased_taxable_income,
            spouse_tax_credits: household.spouse.tax_credits,
            spouse_tax_savings: household.spouse.tax_savings,
            spouse_increased_taxable_income: household.spouse.increased_taxable_income,
            household_tax_benefit: household.household_tax_benefit,
            regular_payoff_months: regular_payoff,
            accelerated_payoff_months: accelerated_payoff,
            payoff_months_saved: payoff_saved,
        };

        self.emit_snapshot(input, &result, &rental, &split, primary_rate);

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Smith Manoeuvre projection: marginal-rate resolution, annuity \
             mortgage split, rental cash flow sweep, household allocation and \
             closed-form payoff estimates",
            &json!({
                "tax_year": "2024",
                "basic_personal_amount": self.tables.basic_personal_amount.to_string(),
                "heloc_rate_pct": heloc_rate_pct.to_string(),
                "province": input.income.province.code(),
                "has_rental_property": rental.is_some(),
                "has_spouse": input.spouse.is_some(),
            }),
            warnings,
            elapsed,
            result,
        ))
    }

    /// One diagnostic snapshot per calculation, fire-and-forget: a
    /// serialization hiccup here must never affect the returned result.
    fn emit_snapshot(
        &self,
        input: &CalculatorInput,
        result: &CalculationResult,
        rental: &Option<RentalMetrics>,
        split: &Option<OwnershipSplit>,
        primary_rate: Rate,
    ) {
        let snapshot = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "inputs": serde_json::to_value(input).unwrap_or_default(),
            "calculations": {
                "primary_marginal_rate": primary_rate.to_string(),
                "monthly_payment": result.monthly_mortgage_payment.to_string(),
                "monthly_interest": result.monthly_interest_portion.to_string(),
                "monthly_principal": result.monthly_principal_portion.to_string(),
                "equity_gained": result.equity_gained.to_string(),
                "heloc_rate_pct": result.heloc_interest_rate.to_string(),
                "heloc_interest": result.heloc_interest_cost.to_string(),
                "monthly_acceleration": result.monthly_cash_flow.to_string(),
                "ownership_split": serde_json::to_value(split).unwrap_or_default(),
                "rental": serde_json::to_value(rental).unwrap_or_default(),
                "household_tax_benefit": result.household_tax_benefit.to_string(),
                "regular_payoff_months": result.regular_payoff_months.map(|m| m.to_string()),
                "accelerated_payoff_months":
                    result.accelerated_payoff_months.map(|m| m.to_string()),
            },
        });
        self.diagnostics.record(&snapshot);
    }
}

/// One-shot projection over a default engine (embedded 2024 tables, no
/// diagnostics).
pub fn calculate_smith_manoeuvre(
    input: &CalculatorInput,
) -> SmithyResult<ComputationOutput<CalculationResult>> {
    SmithManoeuvreEngine::default().calculate(input)
}

/// Closed-form payoff estimates for the primary mortgage, regular versus
/// accelerated. All three are "not applicable" when the balance, payment or
/// rate is degenerate, or when acceleration saves nothing.
fn payoff_projection(
    balance: Money,
    monthly_payment: Money,
    monthly_rate: Rate,
    monthly_acceleration: Money,
) -> (Option<Decimal>, Option<Decimal>, Option<Decimal>) {
    if balance.is_zero() || monthly_payment.is_zero() || monthly_rate.is_zero() {
        return (None, None, None);
    }

    let regular = mortgage::months_to_payoff(balance, monthly_payment, monthly_rate);
    let additional = monthly_acceleration.max(Decimal::ZERO);
    let accelerated =
        mortgage::months_to_payoff(balance, monthly_payment + additional, monthly_rate);

    let saved = match (regular, accelerated) {
        (Some(regular), Some(accelerated)) if regular > accelerated => {
            Some(regular - accelerated)
        }
        _ => None,
    };

    (regular, accelerated, saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PropertyFinancials, SpouseIncome, TaxpayerIncome};
    use rust_decimal_macros::dec;

    fn primary_property() -> PropertyFinancials {
        PropertyFinancials {
            mortgage_amount: dec!(500000),
            interest_rate: dec!(5.5),
            amortization_years: 25,
            current_amount_owing: dec!(450000),
            property_value: dec!(650000),
            monthly_payment: None,
            monthly_rent: None,
            monthly_maintenance_fees: None,
            monthly_property_tax: None,
            monthly_insurance: None,
            monthly_utilities: None,
            property_management_fees: None,
            downpayment_amount: None,
            heloc_downpayment_interest: None,
            property2_mortgage_amount: None,
            property2_mortgage_interest: None,
        }
    }

    fn base_input() -> CalculatorInput {
        CalculatorInput {
            primary_property: primary_property(),
            income: TaxpayerIncome {
                province: Province::ON,
                net_taxable_income: dec!(85000),
                other_taxable_income: Decimal::ZERO,
            },
            property2: None,
            spouse: None,
            heloc_interest_rate: dec!(7.2),
            primary_owner_percentage: dec!(100),
            spouse_percentage: Decimal::ZERO,
            rental_income_to_spouse: false,
        }
    }

    #[test]
    fn test_payment_override_takes_precedence() {
        let mut input = base_input();
        input.primary_property.monthly_payment = Some(dec!(3200));
        let output = calculate_smith_manoeuvre(&input).unwrap();
        assert_eq!(output.result.monthly_mortgage_payment, dec!(3200));

        // A zero override falls back to the derived annuity payment
        input.primary_property.monthly_payment = Some(Decimal::ZERO);
        let output = calculate_smith_manoeuvre(&input).unwrap();
        assert!((output.result.monthly_mortgage_payment - dec!(3070.44)).abs() < dec!(0.5));
    }

    #[test]
    fn test_zero_heloc_rate_applies_default() {
        let mut input = base_input();
        input.heloc_interest_rate = Decimal::ZERO;
        let output = calculate_smith_manoeuvre(&input).unwrap();
        assert_eq!(output.result.heloc_interest_rate, DEFAULT_HELOC_RATE_PCT);
    }

    #[test]
    fn test_primary_interest_earns_no_deduction() {
        // Without a rental property the only benefit is the HELOC deduction
        let output = calculate_smith_manoeuvre(&base_input()).unwrap();
        let result = &output.result;
        let expected_deduction = result.heloc_interest_cost * result.marginal_tax_rate;
        assert_eq!(result.household_tax_benefit, expected_deduction);
        assert_eq!(result.primary_tax_savings, expected_deduction);
        assert!(result.annual_interest_portion > Decimal::ZERO);
    }

    #[test]
    fn test_heloc_interest_excludes_rental_sweep() {
        // HELOC interest accrues on the mortgage-paydown equity only; the
        // reported equity additionally carries the rental sweep
        let mut input = base_input();
        input.property2 = Some(PropertyFinancials {
            monthly_rent: Some(dec!(2500)),
            ..primary_property()
        });
        let with_rental = calculate_smith_manoeuvre(&input).unwrap();
        let without_rental = calculate_smith_manoeuvre(&base_input()).unwrap();

        assert_eq!(
            with_rental.result.heloc_interest_cost,
            without_rental.result.heloc_interest_cost
        );
        assert_eq!(
            with_rental.result.equity_gained,
            without_rental.result.equity_gained + dec!(2500) * dec!(12)
        );
    }

    #[test]
    fn test_unknown_province_warns_and_falls_back() {
        let mut input = base_input();
        input.income.province = Province::from_code("ZZ");
        let output = calculate_smith_manoeuvre(&input).unwrap();
        assert_eq!(output.result.marginal_tax_rate, dec!(0.25));
        assert!(output.warnings.iter().any(|w| w.contains("ZZ")));
    }

    #[test]
    fn test_inert_spouse_flag_warns_with_rental() {
        let mut input = base_input();
        input.rental_income_to_spouse = true;
        let output = calculate_smith_manoeuvre(&input).unwrap();
        assert!(output.warnings.is_empty(), "no rental, flag never consulted");

        input.property2 = Some(PropertyFinancials {
            monthly_rent: Some(dec!(2000)),
            ..primary_property()
        });
        input.spouse = Some(SpouseIncome {
            net_taxable_income: dec!(60000),
            other_taxable_income: Decimal::ZERO,
        });
        input.primary_owner_percentage = dec!(60);
        input.spouse_percentage = dec!(40);
        let output = calculate_smith_manoeuvre(&input).unwrap();
        assert!(output
            .warnings
            .iter()
            .any(|w| w.contains("rental_income_to_spouse")));
    }

    #[test]
    fn test_lopsided_percentages_warn() {
        let mut input = base_input();
        input.property2 = Some(PropertyFinancials {
            monthly_rent: Some(dec!(2000)),
            ..primary_property()
        });
        input.spouse = Some(SpouseIncome {
            net_taxable_income: dec!(60000),
            other_taxable_income: Decimal::ZERO,
        });
        input.primary_owner_percentage = dec!(70);
        input.spouse_percentage = dec!(40);
        let output = calculate_smith_manoeuvre(&input).unwrap();
        assert!(output.warnings.iter().any(|w| w.contains("sum to 110")));
    }

    #[test]
    fn test_rentless_property2_is_ignored() {
        let mut input = base_input();
        input.property2 = Some(primary_property()); // no rent configured
        let output = calculate_smith_manoeuvre(&input).unwrap();
        assert_eq!(output.result.rental_property_cash_flow, None);
        assert_eq!(output.result.spouse_tax_savings, Decimal::ZERO);
    }

    #[test]
    fn test_payoff_projection_sentinels() {
        // Zero balance: nothing to project
        let (regular, accelerated, saved) =
            payoff_projection(Decimal::ZERO, dec!(3000), dec!(0.004), dec!(500));
        assert_eq!((regular, accelerated, saved), (None, None, None));

        // Interest-only payment never amortizes
        let rate = dec!(0.004);
        let (regular, accelerated, saved) =
            payoff_projection(dec!(450000), dec!(450000) * rate, rate, Decimal::ZERO);
        assert_eq!((regular, accelerated, saved), (None, None, None));

        // Acceleration rescues an otherwise non-amortizing loan
        let (regular, accelerated, saved) =
            payoff_projection(dec!(450000), dec!(450000) * rate, rate, dec!(800));
        assert_eq!(regular, None);
        assert!(accelerated.is_some());
        assert_eq!(saved, None);
    }

    #[test]
    fn test_acceleration_shortens_payoff() {
        let output = calculate_smith_manoeuvre(&base_input()).unwrap();
        let result = &output.result;
        let regular = result.regular_payoff_months.unwrap();
        let accelerated = result.accelerated_payoff_months.unwrap();
        assert!(accelerated < regular);
        assert_eq!(
            result.payoff_months_saved.unwrap(),
            regular - accelerated
        );
    }
}
