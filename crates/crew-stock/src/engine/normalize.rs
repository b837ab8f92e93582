//! Reduce whatever a backend returned to display text
//!
//! Preference order:
//! 1. a report's `raw_output`, trimmed; empty when absent
//! 2. plain text, as is
//! 3. a JSON object's `raw_output` or `raw` string field
//! 4. a JSON string's contents
//! 5. the serialized JSON value
//!
//! A report's bookkeeping (iterations, tool calls) is never used as text, so
//! a report without an answer normalizes to an empty string.

use crew_core::BackendOutput;
use serde_json::Value;

const RAW_FIELDS: [&str; 2] = ["raw_output", "raw"];

/// Text for a backend result
pub fn normalize(output: &BackendOutput) -> String {
    match output {
        BackendOutput::Report(report) => report
            .raw_output
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        BackendOutput::Text(text) => text.clone(),
        BackendOutput::Json(value) => normalize_json(value),
    }
}

fn normalize_json(value: &Value) -> String {
    if let Value::Object(map) = value {
        let raw = RAW_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str));
        if let Some(raw) = raw {
            return raw.to_string();
        }
    }

    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
