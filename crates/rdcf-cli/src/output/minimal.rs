use serde_json::Value;

use super::{cell, payload};

/// Headline fields, most specific first.
const HEADLINE_KEYS: [&str; 3] = ["overvaluation_pct", "intrinsic_pe", "base_case_value"];

/// Print just the headline number. Record lists print one `symbol value` line each.
pub fn print_minimal(value: &Value) {
    print!("{}", render_minimal(value));
}

pub fn render_minimal(value: &Value) -> String {
    match payload(value) {
        Value::Array(records) => records
            .iter()
            .map(|r| {
                let label = r
                    .get("symbol")
                    .or_else(|| r.get("year"))
                    .map(|v| cell(v, ""))
                    .unwrap_or_default();
                let headline = headline(r)
                    .or_else(|| r.get("present_value").map(|v| cell(v, "")))
                    .or_else(|| r.get("error").map(|v| cell(v, "")))
                    .unwrap_or_default();
                format!("{} {}\n", label, headline)
            })
            .collect(),
        body => match headline(body) {
            Some(s) => format!("{}\n", s),
            None => match body {
                Value::Object(map) => map
                    .iter()
                    .next()
                    .map(|(k, v)| format!("{}: {}\n", k, cell(v, "null")))
                    .unwrap_or_default(),
                other => format!("{}\n", cell(other, "null")),
            },
        },
    }
}

fn headline(value: &Value) -> Option<String> {
    HEADLINE_KEYS
        .iter()
        .filter_map(|k| value.get(*k))
        .find(|v| !v.is_null())
        .map(|v| cell(v, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefers_overvaluation() {
        let v = json!({ "result": { "intrinsic_pe": "19.31", "overvaluation_pct": "29.46" } });
        assert_eq!(render_minimal(&v), "29.46\n");
    }

    #[test]
    fn test_falls_back_to_intrinsic_pe() {
        let v = json!({ "result": { "intrinsic_pe": "19.31", "valuation": null } });
        assert_eq!(render_minimal(&v), "19.31\n");
    }

    #[test]
    fn test_company_rows() {
        let v = json!([
            { "symbol": "ITC", "intrinsic_pe": "19.31", "overvaluation_pct": "29.46", "error": null },
            { "symbol": "GHOST", "intrinsic_pe": null, "overvaluation_pct": null, "error": "No metrics" }
        ]);
        assert_eq!(render_minimal(&v), "ITC 29.46\nGHOST No metrics\n");
    }
}
