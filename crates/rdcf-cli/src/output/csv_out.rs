use serde_json::Value;
use std::io::{self, Write};

use super::{cell, is_record_list, payload, record_headers};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    match render_csv(value) {
        Ok(bytes) => {
            let _ = io::stdout().lock().write_all(&bytes);
        }
        Err(e) => eprintln!("CSV error: {}", e),
    }
}

/// Record lists (schedules, sweeps, company rows) become one CSV row per record.
/// Anything else is written as field,value pairs.
pub fn render_csv(value: &Value) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    let body = payload(value);
    match body {
        Value::Array(records) => write_records(&mut wtr, records)?,
        Value::Object(map) => {
            if let Some(Value::Array(results)) = map.get("results").filter(|v| is_record_list(v)) {
                write_records(&mut wtr, results)?;
            } else {
                wtr.write_record(["field", "value"])?;
                for (key, val) in map {
                    if !is_record_list(val) {
                        wtr.write_record([key.as_str(), &cell(val, "")])?;
                    }
                }
            }
        }
        _ => wtr.write_record([cell(body, "")])?,
    }

    wtr.into_inner().map_err(|e| e.to_string().into())
}

fn write_records<W: Write>(wtr: &mut csv::Writer<W>, records: &[Value]) -> csv::Result<()> {
    if !records.iter().all(Value::is_object) {
        for item in records {
            wtr.write_record([cell(item, "")])?;
        }
        return Ok(());
    }

    let headers = record_headers(records);
    wtr.write_record(&headers)?;
    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|h| record.get(h.as_str()).map(|v| cell(v, "")).unwrap_or_default())
            .collect();
        wtr.write_record(&row)?;
    }
    Ok(())
}
