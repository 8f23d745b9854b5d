use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};

use smithy_core::tax::{Province, TaxTables};

/// Arguments for marginal tax rate resolution
#[derive(Args)]
pub struct TaxRateArgs {
    /// Two-letter province or territory code (e.g. ON)
    #[arg(long)]
    pub province: String,

    /// Net taxable income (gross minus RRSPs, pensions and similar)
    #[arg(long)]
    pub income: Decimal,
}

pub fn run_tax_rate(args: TaxRateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let tables = TaxTables::canada_2024();
    let province = Province::from_code(&args.province);
    let rate = tables.marginal_rate(&province, args.income);

    Ok(json!({
        "province": province.code(),
        "province_name": tables.schedule(&province).map(|s| s.name.clone()),
        "net_taxable_income": args.income.to_string(),
        "marginal_tax_rate": rate.to_string(),
        "is_fallback_rate": tables.schedule(&province).is_none(),
    }))
}

#[derive(Serialize)]
struct ProvinceRow {
    code: String,
    name: String,
    flat_provincial_rate: String,
}

pub fn run_provinces() -> Result<Value, Box<dyn std::error::Error>> {
    let tables = TaxTables::canada_2024();
    let rows: Vec<ProvinceRow> = tables
        .provinces
        .iter()
        .map(|(province, schedule)| ProvinceRow {
            code: province.code().to_string(),
            name: schedule.name.clone(),
            flat_provincial_rate: schedule.flat_rate.to_string(),
        })
        .collect();
    Ok(serde_json::to_value(rows)?)
}
