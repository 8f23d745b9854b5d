//! Closed-form mortgage arithmetic: annuity payments, single-period
//! interest, and months-to-payoff. Degenerate rates resolve to defined
//! sentinels instead of NaN or infinity.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::SmithyError;
use crate::types::{Money, Rate};
use crate::SmithyResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Monthly rate from an annual percentage (5.5 -> 0.0045833...).
pub fn monthly_rate_from_annual_pct(annual_rate_pct: Rate) -> Rate {
    annual_rate_pct / PERCENT / MONTHS_PER_YEAR
}

/// Level payment that amortizes `principal` over `years` at the given
/// annual percentage rate. A zero rate degenerates to straight-line
/// repayment.
pub fn monthly_payment(principal: Money, annual_rate_pct: Rate, years: u32) -> SmithyResult<Money> {
    if years == 0 {
        return Err(SmithyError::InvalidInput {
            field: "amortization_years".into(),
            reason: "Amortization must cover at least one year".into(),
        });
    }

    let rate = monthly_rate_from_annual_pct(annual_rate_pct);
    let periods = Decimal::from(years) * MONTHS_PER_YEAR;

    if rate.is_zero() {
        return Ok(principal / periods);
    }

    let growth = (Decimal::ONE + rate).powd(periods);
    let annuity_factor = growth - Decimal::ONE;
    if annuity_factor.is_zero() {
        return Err(SmithyError::DivisionByZero {
            context: "annuity payment factor".into(),
        });
    }

    Ok(principal * rate * growth / annuity_factor)
}

/// Interest accruing this month on the current outstanding balance.
///
/// A single-period estimate, not an amortization-schedule walk: the split is
/// intentionally approximate for "today's" balance.
pub fn monthly_interest(balance: Money, annual_rate_pct: Rate) -> Money {
    balance * monthly_rate_from_annual_pct(annual_rate_pct)
}

/// Months until `balance` is fully repaid at `payment` per month:
/// `ln(P / (P - r*B)) / ln(1 + r)`.
///
/// Returns `None` when the payment does not cover the monthly interest, so
/// the loan never amortizes. A zero rate degenerates to straight-line
/// `balance / payment`.
pub fn months_to_payoff(balance: Money, payment: Money, monthly_rate: Rate) -> Option<Decimal> {
    if balance <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    if monthly_rate < Decimal::ZERO {
        return None;
    }
    if monthly_rate.is_zero() {
        if payment <= Decimal::ZERO {
            return None;
        }
        return Some(balance / payment);
    }
    if payment <= balance * monthly_rate {
        return None;
    }

    let numerator = (payment / (payment - monthly_rate * balance)).ln();
    let denominator = (Decimal::ONE + monthly_rate).ln();
    if denominator.is_zero() {
        return None;
    }

    Some(numerator / denominator)
}
