use serde_json::Value;

use super::format_cell;

/// Priority order of headline fields per command output.
const PRIORITY_KEYS: [&str; 6] = [
    "household_tax_benefit",
    "monthly_cash_flow",
    "marginal_tax_rate",
    "monthly_payment",
    "months_to_payoff",
    "equity_gained",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|map| map.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            if let Some(found) = map.get(key) {
                if !found.is_null() {
                    println!("{}", format_cell(found));
                    return;
                }
            }
        }
        if let Some((key, found)) = map.iter().next() {
            println!("{}: {}", key, format_cell(found));
            return;
        }
    }

    println!("{}", format_cell(result));
}
