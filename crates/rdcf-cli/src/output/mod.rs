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

/// The `result` of a computation envelope, or the value itself.
pub(crate) fn payload(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Render a scalar for a single cell. `null` renders as `empty`.
pub(crate) fn cell(value: &Value, empty: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => empty.to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// True for a non-empty array whose elements are all objects.
pub(crate) fn is_record_list(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if !arr.is_empty() && arr.iter().all(Value::is_object))
}

/// Column names in first-seen order across all records.
pub(crate) fn record_headers(records: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for record in records {
        if let Value::Object(map) = record {
            for key in map.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_unwraps_envelope() {
        let v = json!({ "result": { "intrinsic_pe": "19.31" }, "warnings": [] });
        assert_eq!(payload(&v)["intrinsic_pe"], "19.31");
        let bare = json!([1, 2]);
        assert_eq!(payload(&bare), &bare);
    }

    #[test]
    fn test_record_headers_union() {
        let rows = vec![json!({ "a": 1 }), json!({ "a": 2, "b": 3 })];
        assert_eq!(record_headers(&rows), vec!["a".to_string(), "b".to_string()]);
        assert!(is_record_list(&json!(rows)));
        assert!(!is_record_list(&json!([])));
    }
}
