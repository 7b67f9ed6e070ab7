use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
///
/// Three shapes come through here: the calculation envelope (result plus
/// warnings/methodology), the bare schedule array, and the compare map of
/// scenario name to result.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else if map.values().all(|v| v.is_object()) && !map.is_empty() {
                print_scenario_map(map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    if let Value::Object(res_map) = result {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        push_flattened(&mut builder, "", res_map);
        let table = Table::from(builder);
        println!("{}", table);
    } else {
        print_flat_object(&Value::Object(envelope.clone()));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

/// One summary row per scenario for the compare command.
fn print_scenario_map(map: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record([
        "Scenario",
        "Loan Type",
        "Monthly Payment",
        "Total Interest",
        "NPV",
        "Effective Cost",
    ]);

    for (name, result) in map {
        let lookup = |pointer: &str| {
            result
                .pointer(pointer)
                .map(format_value)
                .unwrap_or_else(|| "-".to_string())
        };
        builder.push_record([
            name.as_str(),
            &lookup("/loan_details/loan_type"),
            &lookup("/monthly_payment/overall"),
            &lookup("/total_interest"),
            &lookup("/npv"),
            &lookup("/effective_cost"),
        ]);
    }

    let table = Table::from(builder);
    println!("{}", table);
}

/// Columnar table for arrays of uniform objects (the schedule rows).
fn print_array_table(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", item);
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));

    for item in arr {
        if let Value::Object(row) = item {
            let cells: Vec<String> = headers
                .iter()
                .map(|h| row.get(h).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(cells);
        }
    }

    let table = Table::from(builder);
    println!("{}", table);
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        push_flattened(&mut builder, "", map);
        let table = Table::from(builder);
        println!("{}", table);
    }
}

/// Flatten nested objects into dotted keys; large arrays are summarized
/// rather than inlined (the schedule command prints them in full).
fn push_flattened(builder: &mut Builder, prefix: &str, map: &serde_json::Map<String, Value>) {
    for (key, val) in map {
        let label = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(nested) => push_flattened(builder, &label, nested),
            Value::Array(arr) => {
                builder.push_record([label.as_str(), &format!("[{} rows]", arr.len())]);
            }
            other => {
                builder.push_record([label.as_str(), &format_value(other)]);
            }
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
