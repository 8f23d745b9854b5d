//! Household-level aggregation: ownership split of rental income and
//! deductions across two taxpayers, each at their own marginal rate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::rental::RentalMetrics;
use crate::types::{Money, Rate};

const FULL_SHARE: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Agreed fractional allocation of the rental property between co-owners,
/// in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OwnershipSplit {
    pub primary_pct: Decimal,
    pub spouse_pct: Decimal,
}

impl OwnershipSplit {
    /// Spouse absence always forces full allocation to the primary owner,
    /// regardless of the percentages stored in the input.
    pub fn resolve(primary_pct: Decimal, spouse_pct: Decimal, has_spouse: bool) -> Self {
        if has_spouse {
            OwnershipSplit {
                primary_pct,
                spouse_pct,
            }
        } else {
            OwnershipSplit {
                primary_pct: FULL_SHARE,
                spouse_pct: Decimal::ZERO,
            }
        }
    }

    pub fn is_partition(&self) -> bool {
        self.primary_pct + self.spouse_pct == FULL_SHARE
    }
}

/// One taxpayer's share of the rental position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxpayerPosition {
    /// Allocated share of the annual deductible expenses
    pub tax_credits: Money,
    /// Net annual tax effect: savings from credits minus tax on the
    /// allocated rental income
    pub tax_savings: Money,
    /// Allocated share of the annual rental income
    pub increased_taxable_income: Money,
}

impl TaxpayerPosition {
    fn zero() -> Self {
        TaxpayerPosition {
            tax_credits: Decimal::ZERO,
            tax_savings: Decimal::ZERO,
            increased_taxable_income: Decimal::ZERO,
        }
    }
}

/// Combined household outcome of the rental allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdAllocation {
    pub primary: TaxpayerPosition,
    pub spouse: TaxpayerPosition,
    pub household_tax_benefit: Money,
}

impl HouseholdAllocation {
    /// The degenerate no-rental case: the household benefit is the primary
    /// taxpayer's HELOC deduction alone.
    pub fn heloc_only(heloc_tax_deduction: Money) -> Self {
        HouseholdAllocation {
            primary: TaxpayerPosition {
                tax_credits: Decimal::ZERO,
                tax_savings: heloc_tax_deduction,
                increased_taxable_income: Decimal::ZERO,
            },
            spouse: TaxpayerPosition::zero(),
            household_tax_benefit: heloc_tax_deduction,
        }
    }
}

/// Partition the rental income and deductions by ownership percentage and
/// net out each taxpayer's position at their own marginal rate. The HELOC
/// investment-interest deduction accrues to the primary taxpayer only.
pub fn allocate_household(
    rental: &RentalMetrics,
    split: &OwnershipSplit,
    primary_rate: Rate,
    spouse_rate: Rate,
    heloc_tax_deduction: Money,
) -> HouseholdAllocation {
    let total_rental_income = rental.effective_monthly_rent * MONTHS_PER_YEAR;
    let primary_income = total_rental_income * split.primary_pct / FULL_SHARE;
    let spouse_income = total_rental_income * split.spouse_pct / FULL_SHARE;

    let total_credits = rental.annual_tax_deductions;
    let primary_credits = total_credits * split.primary_pct / FULL_SHARE;
    let spouse_credits = total_credits * split.spouse_pct / FULL_SHARE;

    let primary_savings =
        primary_credits * primary_rate - primary_income * primary_rate + heloc_tax_deduction;
    let spouse_savings = spouse_credits * spouse_rate - spouse_income * spouse_rate;

    let primary = TaxpayerPosition {
        tax_credits: primary_credits,
        tax_savings: primary_savings,
        increased_taxable_income: primary_income,
    };
    let spouse = TaxpayerPosition {
        tax_credits: spouse_credits,
        tax_savings: spouse_savings,
        increased_taxable_income: spouse_income,
    };
    let household_tax_benefit = primary.tax_savings + spouse.tax_savings;

    HouseholdAllocation {
        primary,
        spouse,
        household_tax_benefit,
    }
}
