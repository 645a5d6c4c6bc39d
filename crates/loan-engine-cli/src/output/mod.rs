pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Scalar rendering shared by the table and CSV writers. Arrays of scalars
/// (the 12-month vectors) are joined with ", ".
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) if !arr.iter().any(Value::is_object) => arr
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(", "),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Flatten nested objects into `(dotted.key, value)` pairs, e.g. an active
/// loan row becomes `loan.id`, `projection.balance_fy1`, ...
fn flatten(value: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into("", value, &mut out);
    out
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(&path, val, out);
            }
        }
        _ => out.push((prefix.to_string(), format_value(value))),
    }
}

/// First array of objects in a result, the natural row set for tabular output.
fn row_set(result: &serde_json::Map<String, Value>) -> Option<(&str, &[Value])> {
    ["schedule", "scores", "active"].into_iter().find_map(|key| match result.get(key) {
        Some(Value::Array(rows)) if rows.iter().any(Value::is_object) => Some((key, rows.as_slice())),
        _ => None,
    })
}
