//! Field access over untyped JSON payloads.
//!
//! The external APIs return heterogeneous, partially-optional shapes, so the
//! normalizers walk `serde_json::Value` with dotted paths and fail with an
//! error naming the exact missing field.

use scribe_core::errors::{FetchError, FetchOutcome};
use serde_json::Value;

/// Walk a dotted path (`"user.login"`, `"choices.0.text"`). Numeric segments
/// index arrays.
pub(crate) fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => current.get(segment),
    })
}

/// Required string field.
pub(crate) fn require_str<'a>(value: &'a Value, path: &str) -> FetchOutcome<&'a str> {
    lookup(value, path)
        .and_then(Value::as_str)
        .ok_or_else(|| FetchError::malformed(format!("missing field `{path}`")))
}

/// Required unsigned integer field.
pub(crate) fn require_u64(value: &Value, path: &str) -> FetchOutcome<u64> {
    lookup(value, path)
        .and_then(Value::as_u64)
        .ok_or_else(|| FetchError::malformed(format!("missing field `{path}`")))
}

/// Required array field.
pub(crate) fn require_array<'a>(value: &'a Value, path: &str) -> FetchOutcome<&'a [Value]> {
    lookup(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| FetchError::malformed(format!("missing field `{path}`")))
}

/// Optional string field; `null` and absent are both `None`.
pub(crate) fn optional_str<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    lookup(value, path).and_then(Value::as_str)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn lookup_walks_objects_and_arrays() {
        let value = json!({"choices": [{"message": {"content": "hi"}}]});
        assert_eq!(
            lookup(&value, "choices.0.message.content").and_then(Value::as_str),
            Some("hi")
        );
    }

    #[test]
    fn require_str_names_the_missing_path() {
        let value = json!({"user": {}});
        let err = require_str(&value, "user.login").unwrap_err();
        assert_matches!(err, FetchError::Malformed { context } => {
            assert!(context.contains("user.login"));
        });
    }

    #[test]
    fn require_str_rejects_wrong_type() {
        let value = json!({"number": 12});
        assert_matches!(require_str(&value, "number"), Err(FetchError::Malformed { .. }));
    }

    #[test]
    fn optional_str_treats_null_as_absent() {
        let value = json!({"body": null});
        assert_eq!(optional_str(&value, "body"), None);
    }
}
