use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, is_record_list, payload, record_headers};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    print!("{}", render_table(value));
}

pub fn render_table(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Object(map) if map.contains_key("result") => {
            render_object(payload(value), &mut out);
            render_footer(map, &mut out);
        }
        Value::Object(map) if map.get("results").is_some_and(is_record_list) => {
            render_sensitivity(map, &mut out);
            render_footer(map, &mut out);
        }
        Value::Object(_) => render_object(value, &mut out),
        Value::Array(arr) => render_records(arr, &mut out),
        _ => out.push_str(&format!("{}\n", value)),
    }
    out
}

/// Scalars go in a Field/Value table; record lists get their own titled table.
fn render_object(value: &Value, out: &mut String) {
    let Value::Object(map) = value else {
        out.push_str(&format!("{}\n", cell(value, "-")));
        return;
    };

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut nested = Vec::new();
    for (key, val) in map {
        if is_record_list(val) {
            nested.push((key, val));
        } else {
            builder.push_record([key.as_str(), &cell(val, "-")]);
        }
    }
    out.push_str(&format!("{}\n", Table::from(builder)));

    for (key, val) in nested {
        if let Value::Array(records) = val {
            out.push_str(&format!("\n{}:\n", key));
            render_records(records, out);
        }
    }
}

fn render_records(records: &[Value], out: &mut String) {
    if records.is_empty() {
        out.push_str("(empty)\n");
        return;
    }
    if !records.iter().all(Value::is_object) {
        for item in records {
            out.push_str(&format!("{}\n", cell(item, "-")));
        }
        return;
    }

    let headers = record_headers(records);
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|h| record.get(h.as_str()).map(|v| cell(v, "-")).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }
    out.push_str(&format!("{}\n", Table::from(builder)));
}

/// Two-way sweeps are pivoted into a grid; one-way sweeps stay a list.
fn render_sensitivity(map: &Map<String, Value>, out: &mut String) {
    let results = match map.get("results") {
        Some(Value::Array(results)) => results,
        _ => return,
    };
    let var1 = map.get("var1_name").map(|v| cell(v, "var1")).unwrap_or_default();
    let var2 = match map.get("var2_name") {
        Some(Value::String(name)) => name.clone(),
        _ => {
            render_records(results, out);
            return;
        }
    };

    let mut rows: Vec<String> = Vec::new();
    let mut cols: Vec<String> = Vec::new();
    for r in results {
        let v1 = r.get("var1_value").map(|v| cell(v, "")).unwrap_or_default();
        let v2 = r.get("var2_value").map(|v| cell(v, "")).unwrap_or_default();
        if !rows.contains(&v1) {
            rows.push(v1);
        }
        if !cols.contains(&v2) {
            cols.push(v2);
        }
    }

    let mut builder = Builder::default();
    let mut header = vec![format!("{} \\ {}", var1, var2)];
    header.extend(cols.iter().cloned());
    builder.push_record(header);

    for v1 in &rows {
        let mut line = vec![v1.clone()];
        for v2 in &cols {
            let pe = results
                .iter()
                .find(|r| {
                    r.get("var1_value").map(|v| cell(v, "")).as_deref() == Some(v1.as_str())
                        && r.get("var2_value").map(|v| cell(v, "")).as_deref() == Some(v2.as_str())
                })
                .and_then(|r| r.get("intrinsic_pe"))
                .map(|v| cell(v, "n/a"))
                .unwrap_or_else(|| "n/a".to_string());
            line.push(pe);
        }
        builder.push_record(line);
    }
    out.push_str(&format!("{}\n", Table::from(builder)));

    if let Some(base) = map.get("base_case_value") {
        out.push_str(&format!("Base case intrinsic P/E: {}\n", cell(base, "-")));
    }
}

fn render_footer(envelope: &Map<String, Value>, out: &mut String) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for w in warnings {
                if let Value::String(s) = w {
                    out.push_str(&format!("  - {}\n", s));
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        out.push_str(&format!("\nMethodology: {}\n", meth));
    }
}
