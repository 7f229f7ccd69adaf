/// External feed ingestion.
///
/// Each data source gets its own file rather than bloating one parser:
/// - `http`      — `FeedSource` trait, blocking HTTP feed, URL helpers.
/// - `sites`     — site feed records → corrected `Site`s.
/// - `vessels`   — vessel feed records → `Vessel`s with inferred type.
/// - `synthetic` — procedural fallback dataset.
/// - `fixtures`  (test only) — representative feed payloads.

pub mod http;
pub mod sites;
pub mod synthetic;
pub mod vessels;

#[cfg(test)]
pub(crate) mod fixtures;

use serde_json::{Map, Value};

use crate::model::FeedError;

/// Keys under which paginated responses carry their record array.
const ENVELOPE_KEYS: [&str; 3] = ["items", "data", "localities"];

/// Unwraps a feed body into its list of raw records.
///
/// Accepts a bare JSON array or an object holding the array under one of
/// `ENVELOPE_KEYS`.
///
/// # Errors
/// - `FeedError::Parse` — not JSON, or no recognisable record array.
/// - `FeedError::EmptyPayload` — the record array is empty.
pub(crate) fn extract_records(json: &str) -> Result<Vec<Value>, FeedError> {
    let body: Value = serde_json::from_str(json)
        .map_err(|e| FeedError::Parse(format!("JSON deserialization failed: {}", e)))?;

    let records = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                FeedError::Parse(format!(
                    "object payload without a record array under {:?}",
                    ENVELOPE_KEYS
                ))
            })?,
        other => {
            return Err(FeedError::Parse(format!(
                "expected array or object payload, got {}",
                other
            )));
        }
    };

    if records.is_empty() {
        return Err(FeedError::EmptyPayload);
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Record field readers
// ---------------------------------------------------------------------------
//
// Feed revisions name the same field differently, and some records carry
// more than one spelling. Each reader takes the keys in precedence order and
// returns the first value of the expected type; a present value of the wrong
// type counts as absent, so one bad optional field never costs the record.

/// A raw feed record.
pub(crate) type Record = Map<String, Value>;

/// First finite number under `keys`.
pub(crate) fn number_field(record: &Record, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| record.get(*key).and_then(Value::as_f64))
        .find(|v| v.is_finite())
}

/// First non-blank string under `keys`, trimmed.
pub(crate) fn text_field(record: &Record, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// First boolean under `keys`.
pub(crate) fn flag_field(record: &Record, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| record.get(*key).and_then(Value::as_bool))
}

/// First identifier under `keys`: a non-blank string or an integer.
pub(crate) fn id_field(record: &Record, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(*key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Record {
        match serde_json::from_str(json) {
            Ok(Value::Object(map)) => map,
            other => panic!("test record must be an object, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_bare_array() {
        let records = extract_records(r#"[{"a":1},{"a":2}]"#).expect("array parses");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_extract_items_and_data_envelopes() {
        let items = extract_records(r#"{"items":[{"a":1}],"page":1}"#).expect("items parses");
        assert_eq!(items.len(), 1);
        let data = extract_records(r#"{"data":[{"a":1},{"a":2},{"a":3}]}"#).expect("data parses");
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_extract_empty_array_is_empty_payload() {
        assert_eq!(extract_records("[]"), Err(FeedError::EmptyPayload));
        assert_eq!(extract_records(r#"{"items":[]}"#), Err(FeedError::EmptyPayload));
    }

    #[test]
    fn test_extract_rejects_unknown_shapes() {
        assert!(matches!(extract_records(r#"{"rows":[1]}"#), Err(FeedError::Parse(_))));
        assert!(matches!(extract_records("42"), Err(FeedError::Parse(_))));
        assert!(matches!(extract_records("{ not json"), Err(FeedError::Parse(_))));
    }

    #[test]
    fn test_readers_follow_key_precedence() {
        let r = record(r#"{"id":"abc","localityNo":42,"lat":60.0,"latitude":61.0}"#);
        assert_eq!(id_field(&r, &["localityNo", "id"]).as_deref(), Some("42"));
        assert_eq!(id_field(&r, &["id", "localityNo"]).as_deref(), Some("abc"));
        assert_eq!(number_field(&r, &["lat", "latitude"]), Some(60.0));
    }

    #[test]
    fn test_wrong_type_counts_as_absent() {
        let r = record(r#"{"salinity":"n/a","diseaseCode":1,"inQuarantine":"yes","heading":"N"}"#);
        assert_eq!(number_field(&r, &["salinity"]), None);
        assert_eq!(text_field(&r, &["diseaseCode"]), None);
        assert_eq!(flag_field(&r, &["inQuarantine"]), None);
        // A malformed first spelling falls through to the next one.
        let r = record(r#"{"trueHeading":"N","heading":90}"#);
        assert_eq!(number_field(&r, &["trueHeading", "heading"]), Some(90.0));
    }

    #[test]
    fn test_id_rejects_blank_and_fractional() {
        let r = record(r#"{"a":"  ","b":4.5,"c":null,"d":" 17 "}"#);
        assert_eq!(id_field(&r, &["a", "b", "c"]), None);
        assert_eq!(id_field(&r, &["a", "d"]).as_deref(), Some("17"));
    }
}
