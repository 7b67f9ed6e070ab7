use serde_json::Value;

/// Print just the key answer value from the output.
///
/// For a loan calculation that is the overall monthly payment; otherwise
/// fall back through the headline valuation figures.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(overall) = result_obj.pointer("/monthly_payment/overall") {
        if !overall.is_null() {
            println!("{}", format_minimal(overall));
            return;
        }
    }

    let priority_keys = [
        "npv",
        "effective_cost",
        "total_interest",
        "total_payments",
        "balloon_payment",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        // Fall back to first field
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
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
