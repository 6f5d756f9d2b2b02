//! Minimal typed wrapper around Yahoo Finance's `quoteSummary` envelope.
//!
//! Yahoo nests every numeric leaf as `{ "raw": f64, "fmt": "..." }`; rather
//! than modeling every module field-by-field we keep the payload as
//! `serde_json::Value` and pull fields with [`raw_f64`], since the upstream
//! schema is free to add fields without that breaking us.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteSummaryBody {
    pub result: Option<Vec<Value>>,
    pub error: Option<Value>,
}

/// Step into `value` following a dotted path, where a segment may be an
/// object key or, for array segments, a numeric index.
fn navigate<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut cur = value;
    for segment in path.split('.') {
        cur = match segment.parse::<usize>() {
            Ok(idx) => cur.get(idx)?,
            Err(_) => cur.get(segment)?,
        };
    }
    Some(cur)
}

/// Extract a `{"raw": ...}` numeric leaf at a dotted path within `value`.
pub(crate) fn raw_f64(value: &Value, path: &str) -> Option<f64> {
    let cur = navigate(value, path)?;
    cur.get("raw").and_then(Value::as_f64).or_else(|| cur.as_f64())
}

/// Extract a plain string field.
pub(crate) fn str_field<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    navigate(value, path)?.as_str()
}

/// Pull a `{raw}` series out of a list-of-statements module, most-recent-first
/// (Yahoo already orders annual statement history this way).
pub(crate) fn series_f64(value: &Value, list_path: &str, field: &str) -> Vec<f64> {
    navigate(value, list_path)
        .and_then(Value::as_array)
        .map(|statements| {
            statements
                .iter()
                .filter_map(|stmt| raw_f64(stmt, field))
                .collect()
        })
        .unwrap_or_default()
}
