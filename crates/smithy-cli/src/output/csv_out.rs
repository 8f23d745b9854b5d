use serde_json::Value;
use std::io;

use super::format_cell;

/// Write output as CSV to stdout: `field,value` rows for objects (the
/// result section of an envelope when present), header + rows for arrays.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut writer = csv::Writer::from_writer(stdout.lock());

    let unwrapped = value
        .as_object()
        .and_then(|map| map.get("result"))
        .unwrap_or(value);

    match unwrapped {
        Value::Object(map) => {
            let _ = writer.write_record(["field", "value"]);
            for (key, val) in map {
                let _ = writer.write_record([key.as_str(), &format_cell(val)]);
            }
        }
        Value::Array(rows) => write_rows(&mut writer, rows),
        other => {
            let _ = writer.write_record([format_cell(other)]);
        }
    }

    let _ = writer.flush();
}

fn write_rows(writer: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = writer.write_record(&headers);

    for row in rows {
        if let Value::Object(map) = row {
            let cells: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_cell).unwrap_or_default())
                .collect();
            let _ = writer.write_record(&cells);
        }
    }
}
