//! Shared utility functions for JSON fact extraction.
//!
//! ## JSON Extraction Helpers
//!
//! Ergonomic helpers for pulling values out of `serde_json::Value` blobs:
//! - `json_string` - Extract strings
//! - `json_i64` - Extract integers, numeric strings included
//! - `json_path` - Follow a dotted key path
//!
//! The flow parser walks vendor-defined definition documents with no formal
//! schema; these helpers keep each extraction site to one line and make the
//! "absent means default" behavior uniform.

use serde_json::Value;

/// Extract string from JSON value by key.
///
/// Replaces verbose `v.get("key")?.as_str()?.to_string()` patterns.
#[inline]
pub fn json_string(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(String::from)
}

/// Extract i64, accepting numeric strings as well (vendor blobs carry
/// numeric parameters both ways).
#[inline]
pub fn json_i64(value: &Value, key: &str) -> Option<i64> {
    let v = value.get(key)?;
    v.as_i64().or_else(|| v.as_str()?.trim().parse().ok())
}

/// Follow a dotted path of object keys, e.g. `"properties.definition"`.
pub fn json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for key in path.split('.') {
        current = current.get(key)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_string_extracts_by_key() {
        let v = json!({"name": "Sync accounts"});
        assert_eq!(json_string(&v, "name").as_deref(), Some("Sync accounts"));
        assert_eq!(json_string(&v, "missing"), None);
    }

    #[test]
    fn test_json_i64_accepts_numeric_strings() {
        let v = json!({"scope": "4", "stage": 20});
        assert_eq!(json_i64(&v, "scope"), Some(4));
        assert_eq!(json_i64(&v, "stage"), Some(20));
        assert_eq!(json_i64(&v, "missing"), None);
    }

    #[test]
    fn test_json_path_walks_nested_objects() {
        let v = json!({"properties": {"definition": {"triggers": {}}}});
        assert!(json_path(&v, "properties.definition.triggers").is_some());
        assert!(json_path(&v, "properties.missing.triggers").is_none());
    }
}
