use serde_json::Value;

/// Key answer per command, in priority order.
const PRIORITY_KEYS: [&str; 4] = [
    "score",
    "remaining_months",
    "weighted_average_interest",
    "scores",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            match map.get(key) {
                Some(Value::Null) if key == "score" => {
                    println!("unscored");
                    return;
                }
                Some(Value::Null) | None => continue,
                Some(Value::Array(rows)) if key == "scores" => {
                    for row in rows {
                        println!(
                            "{}: {}",
                            format_minimal(&row["indicator"]),
                            format_minimal(&row["score"])
                        );
                    }
                    return;
                }
                Some(Value::Array(rates)) if key == "weighted_average_interest" => {
                    // Only the current month is populated.
                    println!("{}", rates.first().map(format_minimal).unwrap_or_default());
                    return;
                }
                Some(val) => {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
