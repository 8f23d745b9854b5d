//! Rental property cash flow and deduction evaluation.
//!
//! Deliberately tax-rate agnostic: the caller threads in whichever marginal
//! rate applies, so the same evaluation can be reused per taxpayer.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::mortgage::monthly_rate_from_annual_pct;
use crate::types::{Money, PropertyFinancials, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Per-month and annualized economics of one rental property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalMetrics {
    /// Full rent, swept to the primary mortgage. Expenses are carried on the
    /// HELOC rather than netted here.
    pub monthly_cash_flow: Money,
    pub effective_monthly_rent: Money,
    /// Deductible expenses paid via the HELOC
    pub monthly_expenses: Money,
    pub monthly_rental_mortgage_interest: Money,
    pub annual_tax_deductions: Money,
    pub net_rental_income: Money,
    /// Financing breakdown, reported verbatim for display
    pub downpayment_amount: Money,
    /// Annualized interest on the HELOC-funded downpayment
    pub heloc_downpayment_interest: Money,
    pub property2_mortgage_amount: Money,
    /// Annualized interest on the rental property's own mortgage
    pub property2_mortgage_interest: Money,
}

/// Evaluate one rental property's monthly cash flow, deductible expenses and
/// net rental income at the supplied tax rate.
pub fn evaluate_rental_property(property: &PropertyFinancials, tax_rate: Rate) -> RentalMetrics {
    let monthly_rent = property.monthly_rent.unwrap_or_default();
    let maintenance = property.monthly_maintenance_fees.unwrap_or_default();
    let property_tax = property.monthly_property_tax.unwrap_or_default();
    let insurance = property.monthly_insurance.unwrap_or_default();
    let utilities = property.monthly_utilities.unwrap_or_default();
    let management_fees = property.property_management_fees.unwrap_or_default();

    // The rental mortgage balance falls back to the generic property fields
    // when no dedicated amount is given; zero counts as absent
    let mortgage_balance = first_non_zero([
        property.property2_mortgage_amount.unwrap_or_default(),
        property.current_amount_owing,
        property.mortgage_amount,
    ]);
    let mortgage_rate =
        monthly_rate_from_annual_pct(property.property2_mortgage_interest.unwrap_or_default());
    let monthly_mortgage_interest = mortgage_balance * mortgage_rate;

    let downpayment = property.downpayment_amount.unwrap_or_default();
    let downpayment_rate =
        monthly_rate_from_annual_pct(property.heloc_downpayment_interest.unwrap_or_default());
    let monthly_downpayment_interest = downpayment * downpayment_rate;

    // All rental income goes to the primary mortgage principal
    let monthly_cash_flow = monthly_rent;

    // Both interest legs are investment-purpose borrowing and deductible
    let monthly_expenses = maintenance
        + property_tax
        + insurance
        + utilities
        + management_fees
        + monthly_mortgage_interest
        + monthly_downpayment_interest;

    let annual_tax_deductions = monthly_expenses * MONTHS_PER_YEAR;
    let net_rental_income =
        monthly_cash_flow * MONTHS_PER_YEAR + annual_tax_deductions * tax_rate;

    RentalMetrics {
        monthly_cash_flow,
        effective_monthly_rent: monthly_rent,
        monthly_expenses,
        monthly_rental_mortgage_interest: monthly_mortgage_interest,
        annual_tax_deductions,
        net_rental_income,
        downpayment_amount: downpayment,
        heloc_downpayment_interest: monthly_downpayment_interest * MONTHS_PER_YEAR,
        property2_mortgage_amount: mortgage_balance,
        property2_mortgage_interest: monthly_mortgage_interest * MONTHS_PER_YEAR,
    }
}

fn first_non_zero<const N: usize>(candidates: [Money; N]) -> Money {
    candidates
        .into_iter()
        .find(|v| !v.is_zero())
        .unwrap_or_default()
}
