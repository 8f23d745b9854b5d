use std::sync::Arc;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use smithy_core::diagnostics::{FileSink, MemorySink};
use smithy_core::tax::{Province, TaxTables};
use smithy_core::{
    calculate_smith_manoeuvre, CalculatorInput, PropertyFinancials, SmithManoeuvreEngine,
    SpouseIncome, TaxpayerIncome,
};

const TOLERANCE: Decimal = dec!(0.000001);

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

fn rental_property() -> PropertyFinancials {
    PropertyFinancials {
        mortgage_amount: dec!(350000),
        interest_rate: dec!(5.5),
        amortization_years: 25,
        current_amount_owing: dec!(280000),
        property_value: dec!(400000),
        monthly_payment: None,
        monthly_rent: Some(dec!(2500)),
        monthly_maintenance_fees: None,
        monthly_property_tax: None,
        monthly_insurance: None,
        monthly_utilities: None,
        property_management_fees: None,
        downpayment_amount: None,
        heloc_downpayment_interest: None,
        property2_mortgage_amount: Some(dec!(280000)),
        property2_mortgage_interest: Some(dec!(5.5)),
    }
}

fn heloc_only_input() -> CalculatorInput {
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

fn rental_input() -> CalculatorInput {
    CalculatorInput {
        property2: Some(rental_property()),
        ..heloc_only_input()
    }
}

fn household_input() -> CalculatorInput {
    CalculatorInput {
        spouse: Some(SpouseIncome {
            net_taxable_income: dec!(60000),
            other_taxable_income: Decimal::ZERO,
        }),
        primary_owner_percentage: dec!(60),
        spouse_percentage: dec!(40),
        ..rental_input()
    }
}

// ===========================================================================
// Scenario 1: primary residence only
// ===========================================================================

#[test]
fn test_heloc_only_scenario() {
    let output = calculate_smith_manoeuvre(&heloc_only_input()).unwrap();
    let result = &output.result;

    // ON at 85000: 20.5% federal + 9.15% provincial
    assert_eq!(result.marginal_tax_rate, dec!(0.2965));

    assert!(
        (result.monthly_mortgage_payment - dec!(3070.44)).abs() < dec!(0.5),
        "annuity payment, got {}",
        result.monthly_mortgage_payment
    );
    assert!((result.monthly_interest_portion - dec!(2062.50)).abs() < TOLERANCE);

    assert!(result.investment_loan_interest > Decimal::ZERO);
    assert!(result.household_tax_benefit > Decimal::ZERO);
    assert_eq!(
        result.household_tax_benefit,
        result.investment_loan_interest * result.marginal_tax_rate
    );

    // No rental property: the rental section stays absent
    assert_eq!(result.rental_property_cash_flow, None);
    assert_eq!(result.net_rental_income, None);
    assert_eq!(result.spouse_tax_savings, Decimal::ZERO);

    let serialized = serde_json::to_value(result).unwrap();
    assert!(serialized.get("rental_property_cash_flow").is_none());
}

// ===========================================================================
// Scenario 2: rental property, no spouse
// ===========================================================================

#[test]
fn test_rental_scenario_without_spouse() {
    let output = calculate_smith_manoeuvre(&rental_input()).unwrap();
    let result = &output.result;

    assert_eq!(result.rental_property_cash_flow, Some(dec!(2500)));
    assert_eq!(result.spouse_tax_savings, Decimal::ZERO);
    assert_eq!(result.spouse_increased_taxable_income, Decimal::ZERO);

    // Spouse absence forces the full allocation to the primary owner
    assert_eq!(result.primary_increased_taxable_income, dec!(30000));

    // 280000 * 5.5% of deductible rental mortgage interest
    let deductions = result.rental_property_tax_deductions.unwrap();
    assert!((deductions - dec!(15400)).abs() < dec!(0.0001), "got {deductions}");

    // Rental income joins the HELOC refund in the acceleration cash flow
    let heloc_monthly = result.investment_loan_interest * result.marginal_tax_rate / dec!(12);
    assert!((result.monthly_cash_flow - (heloc_monthly + dec!(2500))).abs() < TOLERANCE);

    // And the full year of rent lands in equity
    assert!((result.equity_gained
        - (result.monthly_principal_portion * dec!(12) + dec!(30000)))
    .abs()
        < TOLERANCE);
}

#[test]
fn test_rental_scenario_ignores_stored_percentages_without_spouse() {
    let mut input = rental_input();
    input.primary_owner_percentage = dec!(60);
    input.spouse_percentage = dec!(40);
    let output = calculate_smith_manoeuvre(&input).unwrap();

    assert_eq!(
        output.result.primary_increased_taxable_income,
        dec!(30000),
        "stored 60/40 split must not apply without a spouse"
    );
    assert_eq!(output.result.spouse_increased_taxable_income, Decimal::ZERO);
}

// ===========================================================================
// Scenario 3: rental property with income splitting
// ===========================================================================

#[test]
fn test_household_scenario_with_spouse() {
    let output = calculate_smith_manoeuvre(&household_input()).unwrap();
    let result = &output.result;

    // 60/40 of 2500 * 12
    assert_eq!(result.primary_increased_taxable_income, dec!(18000));
    assert_eq!(result.spouse_increased_taxable_income, dec!(12000));

    // Exact partition, no leakage
    assert_eq!(
        result.primary_increased_taxable_income + result.spouse_increased_taxable_income,
        dec!(30000)
    );
    let credits_sum = result.primary_tax_credits + result.spouse_tax_credits;
    assert!(
        (credits_sum - result.rental_property_tax_deductions.unwrap()).abs() < TOLERANCE,
        "credit allocation must partition the deduction total, got {credits_sum}"
    );

    assert_eq!(
        result.household_tax_benefit,
        result.primary_tax_savings + result.spouse_tax_savings
    );
}

#[test]
fn test_spouse_taxed_at_own_marginal_rate() {
    let output = calculate_smith_manoeuvre(&household_input()).unwrap();
    let result = &output.result;

    // Spouse at 60000 in ON: 15% federal + 5.05% provincial
    let spouse_rate = dec!(0.2005);
    let expected = result.spouse_tax_credits * spouse_rate
        - result.spouse_increased_taxable_income * spouse_rate;
    assert_eq!(result.spouse_tax_savings, expected);
}

// ===========================================================================
// Purity and diagnostics
// ===========================================================================

#[test]
fn test_identical_input_yields_identical_output() {
    let input = household_input();
    let first = calculate_smith_manoeuvre(&input).unwrap();
    let second = calculate_smith_manoeuvre(&input).unwrap();

    assert_eq!(first.result, second.result);
    assert_eq!(
        serde_json::to_string(&first.result).unwrap(),
        serde_json::to_string(&second.result).unwrap()
    );
}

#[test]
fn test_one_diagnostic_snapshot_per_calculation() {
    let sink = Arc::new(MemorySink::new());
    let engine = SmithManoeuvreEngine::new(TaxTables::canada_2024(), Box::new(sink.clone()));

    engine.calculate(&heloc_only_input()).unwrap();
    engine.calculate(&rental_input()).unwrap();
    assert_eq!(sink.len(), 2);

    let snapshot = &sink.snapshots()[0];
    assert!(snapshot.get("timestamp").is_some());
    assert!(snapshot.get("inputs").is_some());
    assert!(snapshot["calculations"].get("heloc_interest").is_some());
}

#[test]
fn test_sink_failure_never_affects_the_result() {
    let engine = SmithManoeuvreEngine::new(
        TaxTables::canada_2024(),
        Box::new(FileSink::new("/nonexistent-smithy-dir/diag.json")),
    );
    let output = engine.calculate(&heloc_only_input()).unwrap();
    assert!(output.result.household_tax_benefit > Decimal::ZERO);
}

// ===========================================================================
// Input contract
// ===========================================================================

#[test]
fn test_input_deserializes_from_published_shape() {
    let input: CalculatorInput = serde_json::from_str(
        r#"{
            "primary_property": {
                "mortgage_amount": "500000",
                "interest_rate": "5.5",
                "amortization_years": 25,
                "current_amount_owing": "450000",
                "property_value": "650000"
            },
            "income": {
                "province": "ON",
                "net_taxable_income": "85000"
            },
            "property2": {
                "mortgage_amount": "350000",
                "interest_rate": "5.5",
                "amortization_years": 25,
                "current_amount_owing": "280000",
                "property_value": "400000",
                "monthly_rent": "2500",
                "property2_mortgage_amount": "280000",
                "property2_mortgage_interest": "5.5"
            },
            "heloc_interest_rate": "7.2"
        }"#,
    )
    .unwrap();

    assert_eq!(input.income.province, Province::ON);
    assert_eq!(input.primary_owner_percentage, dec!(100));
    assert!(!input.rental_income_to_spouse);

    let output = calculate_smith_manoeuvre(&input).unwrap();
    assert_eq!(output.result.rental_property_cash_flow, Some(dec!(2500)));
}
