use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use smithy_core::mortgage;

/// Arguments for the annuity payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Mortgage principal
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent (5.5 = 5.5%)
    #[arg(long)]
    pub rate: Decimal,

    /// Amortization in years
    #[arg(long)]
    pub years: u32,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment = mortgage::monthly_payment(args.principal, args.rate, args.years)?;
    let first_month_interest = mortgage::monthly_interest(args.principal, args.rate);

    Ok(json!({
        "principal": args.principal.to_string(),
        "annual_rate_pct": args.rate.to_string(),
        "amortization_years": args.years,
        "monthly_payment": payment.round_dp(2).to_string(),
        "first_month_interest": first_month_interest.round_dp(2).to_string(),
        "first_month_principal": (payment - first_month_interest).round_dp(2).to_string(),
    }))
}

/// Arguments for the months-to-payoff estimate
#[derive(Args)]
pub struct PayoffArgs {
    /// Outstanding balance
    #[arg(long)]
    pub balance: Decimal,

    /// Monthly payment
    #[arg(long)]
    pub payment: Decimal,

    /// Annual interest rate in percent (5.5 = 5.5%)
    #[arg(long)]
    pub rate: Decimal,
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let monthly_rate = mortgage::monthly_rate_from_annual_pct(args.rate);
    let months = mortgage::months_to_payoff(args.balance, args.payment, monthly_rate);

    Ok(match months {
        Some(months) => json!({
            "balance": args.balance.to_string(),
            "monthly_payment": args.payment.to_string(),
            "months_to_payoff": months.round_dp(2).to_string(),
            "time_to_payoff": format_time_granular(months),
        }),
        None => json!({
            "balance": args.balance.to_string(),
            "monthly_payment": args.payment.to_string(),
            "months_to_payoff": Value::Null,
            "time_to_payoff": "never amortizes: payment does not cover interest",
        }),
    })
}

/// Render fractional months as whole years, months and days.
fn format_time_granular(months: Decimal) -> String {
    if months <= Decimal::ZERO {
        return "already paid off".to_string();
    }

    let years = (months / dec!(12)).floor();
    let remaining_months = (months - years * dec!(12)).floor();
    // Average days per month over a Gregorian year
    let days = ((months - months.floor()) * dec!(30.44)).floor();

    let mut parts: Vec<String> = Vec::new();
    if years > Decimal::ZERO {
        parts.push(format!("{years} years"));
    }
    if remaining_months > Decimal::ZERO {
        parts.push(format!("{remaining_months} months"));
    }
    if days > Decimal::ZERO {
        parts.push(format!("{days} days"));
    }
    if parts.is_empty() {
        parts.push("less than a day".to_string());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_granular() {
        assert_eq!(format_time_granular(dec!(300)), "25 years");
        assert_eq!(format_time_granular(dec!(302)), "25 years 2 months");
        assert_eq!(format_time_granular(dec!(0.5)), "15 days");
        assert_eq!(format_time_granular(dec!(-3)), "already paid off");
    }
}
