//! Chunk metadata extraction.
//!
//! Derives a small descriptive record from a chunk: item count, field
//! names (or scalar type name), and a date range when a list of records
//! carries a recognizable date-like field. Pure function of its inputs
//! plus the current time.

use chrono::Utc;
use serde_json::{json, Map, Value};

/// Candidate date-like field names, highest priority first. The scan
/// stops at the first candidate present in the first element.
pub const DATE_FIELDS: [&str; 7] = [
    "date",
    "timestamp",
    "time",
    "created_at",
    "updated_at",
    "start_date",
    "end_date",
];

/// Extract a metadata record from a chunk.
///
/// Empty chunks (null, `[]`, `{}`, `""`) produce an empty record. All
/// other records carry `chunk_type`, a generation `timestamp`, an
/// `item_count`, and either `fields` (record shapes) or `data_type`
/// (scalar shapes). Lists of records are additionally scanned for a
/// `date_range`.
pub fn extract_metadata(chunk: &Value, chunk_type: &str) -> Value {
    if is_empty(chunk) {
        return json!({});
    }

    let mut meta = Map::new();
    meta.insert("chunk_type".to_string(), json!(chunk_type));
    meta.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));

    match chunk {
        Value::Array(items) => {
            meta.insert("item_count".to_string(), json!(items.len()));
            match items.first() {
                Some(Value::Object(first)) => {
                    let fields: Vec<&String> = first.keys().collect();
                    meta.insert("fields".to_string(), json!(fields));
                }
                Some(other) => {
                    meta.insert("data_type".to_string(), json!(type_name(other)));
                }
                // Empty arrays return early above.
                None => {}
            }
        }
        Value::Object(map) => {
            meta.insert("item_count".to_string(), json!(1));
            let fields: Vec<&String> = map.keys().collect();
            meta.insert("fields".to_string(), json!(fields));
        }
        other => {
            meta.insert("item_count".to_string(), json!(1));
            meta.insert("data_type".to_string(), json!(type_name(other)));
        }
    }

    if let Some(range) = extract_date_range(chunk) {
        meta.insert("date_range".to_string(), range);
    }

    Value::Object(meta)
}

/// Scan a list-of-records chunk for the highest-priority date-like field
/// and report that field's minimum and maximum value across all elements
/// that carry it.
///
/// Values are compared as raw strings (lexicographic), so they must be
/// comparably formatted (e.g. ISO-8601). No date parsing is performed. A
/// candidate whose values are not all strings is skipped in favor of the
/// next one.
fn extract_date_range(chunk: &Value) -> Option<Value> {
    let items = chunk.as_array()?;
    let first = items.first()?.as_object()?;

    for field in DATE_FIELDS {
        if !first.contains_key(field) {
            continue;
        }
        let values: Vec<&Value> = items
            .iter()
            .filter_map(|item| item.as_object())
            .filter_map(|obj| obj.get(field))
            .collect();
        if values.is_empty() || !values.iter().all(|v| v.is_string()) {
            continue;
        }
        let mut strings: Vec<&str> = values.iter().filter_map(|v| v.as_str()).collect();
        strings.sort_unstable();
        return Some(json!({
            "field": field,
            "min": strings.first()?,
            "max": strings.last()?,
        }));
    }

    None
}

fn is_empty(chunk: &Value) -> bool {
    match chunk {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_chunks_have_empty_metadata() {
        for chunk in [json!(null), json!([]), json!({}), json!("")] {
            assert_eq!(extract_metadata(&chunk, "t"), json!({}));
        }
    }

    #[test]
    fn test_list_of_records() {
        let chunk = json!([{"date": "2025-01-01", "glucose": 99}, {"date": "2025-01-02"}]);
        let meta = extract_metadata(&chunk, "day_wise_chunk_0");
        assert_eq!(meta["chunk_type"], "day_wise_chunk_0");
        assert_eq!(meta["item_count"], 2);
        assert_eq!(meta["fields"], json!(["date", "glucose"]));
        assert!(meta["timestamp"].is_string());
    }

    #[test]
    fn test_list_of_scalars() {
        let meta = extract_metadata(&json!([1, 2, 3]), "nums");
        assert_eq!(meta["item_count"], 3);
        assert_eq!(meta["data_type"], "number");
        assert!(meta.get("fields").is_none());
    }

    #[test]
    fn test_single_record() {
        let meta = extract_metadata(&json!({"a": 1, "b": 2}), "summary");
        assert_eq!(meta["item_count"], 1);
        assert_eq!(meta["fields"], json!(["a", "b"]));
    }

    #[test]
    fn test_scalar() {
        let meta = extract_metadata(&json!("hello"), "single_value");
        assert_eq!(meta["item_count"], 1);
        assert_eq!(meta["data_type"], "string");
    }

    #[test]
    fn test_date_range_min_max() {
        let chunk = json!([
            {"date": "2025-01-03"},
            {"date": "2025-01-01"},
            {"date": "2025-01-02"},
        ]);
        let meta = extract_metadata(&chunk, "t");
        assert_eq!(meta["date_range"]["field"], "date");
        assert_eq!(meta["date_range"]["min"], "2025-01-01");
        assert_eq!(meta["date_range"]["max"], "2025-01-03");
    }

    #[test]
    fn test_date_field_priority_stops_at_first_match() {
        // Both "date" and "created_at" present; "date" wins.
        let chunk = json!([
            {"date": "2025-02-01", "created_at": "2020-01-01"},
            {"date": "2025-02-02", "created_at": "2030-01-01"},
        ]);
        let meta = extract_metadata(&chunk, "t");
        assert_eq!(meta["date_range"]["field"], "date");
    }

    #[test]
    fn test_date_range_skips_elements_missing_the_field() {
        let chunk = json!([
            {"timestamp": "2025-03-05T08:00:00Z"},
            {"other": true},
            {"timestamp": "2025-03-01T12:00:00Z"},
        ]);
        let meta = extract_metadata(&chunk, "t");
        assert_eq!(meta["date_range"]["field"], "timestamp");
        assert_eq!(meta["date_range"]["min"], "2025-03-01T12:00:00Z");
        assert_eq!(meta["date_range"]["max"], "2025-03-05T08:00:00Z");
    }

    #[test]
    fn test_non_string_date_values_fall_to_next_candidate() {
        let chunk = json!([
            {"date": 20250101, "created_at": "2025-01-01"},
            {"date": 20250102, "created_at": "2025-01-02"},
        ]);
        let meta = extract_metadata(&chunk, "t");
        assert_eq!(meta["date_range"]["field"], "created_at");
    }

    #[test]
    fn test_no_date_field_no_range() {
        let meta = extract_metadata(&json!([{"a": 1}]), "t");
        assert!(meta.get("date_range").is_none());
    }
}
