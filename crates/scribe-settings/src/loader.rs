//! Settings loading: defaults ← file ← environment.
//!
//! The file is deep-merged over compiled defaults so partial files stay
//! valid across schema additions. `SCRIBE_*` environment variables override
//! individual scalars on top of the merged result, and `${VAR}` references
//! in secret-bearing fields are resolved last.

use std::env;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::errors::Result;
use crate::types::ScribeSettings;

/// Default settings file location: `~/.scribe/settings.json`.
#[must_use]
pub fn settings_path() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".scribe")
        .join("settings.json")
}

/// Load settings from the default path.
pub fn load_settings() -> Result<ScribeSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from `path`, merging over defaults and applying
/// environment overrides. A missing file is not an error — defaults plus
/// environment apply.
pub fn load_settings_from_path(path: &Path) -> Result<ScribeSettings> {
    let defaults = serde_json::to_value(ScribeSettings::default())?;

    let merged = if path.exists() {
        let raw = std::fs::read_to_string(path)?;
        let file: Value = serde_json::from_str(&raw)?;
        deep_merge(defaults, file)
    } else {
        defaults
    };

    let mut settings: ScribeSettings = serde_json::from_value(apply_env_overrides(merged))?;
    resolve_secrets(&mut settings);
    Ok(settings)
}

/// Recursively merge `overlay` onto `base`. Objects merge key-by-key;
/// any other overlay value replaces the base value.
#[must_use]
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                let _ = base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Scalar overrides from `SCRIBE_*` environment variables.
fn apply_env_overrides(mut merged: Value) -> Value {
    let string_overrides: [(&str, &[&str]); 5] = [
        ("SCRIBE_GITHUB_TOKEN", &["github", "token"]),
        ("SCRIBE_GITHUB_REPOSITORY", &["github", "repository"]),
        ("SCRIBE_JIRA_URL", &["jira", "url"]),
        ("SCRIBE_MODEL_URL", &["model", "url"]),
        ("SCRIBE_LOG_LEVEL", &["logging", "level"]),
    ];
    for (var, path) in string_overrides {
        if let Ok(value) = env::var(var) {
            set_path(&mut merged, path, Value::String(value));
        }
    }

    if let Ok(value) = env::var("SCRIBE_COOLDOWN_SECS") {
        match value.parse::<i64>() {
            Ok(secs) => set_path(
                &mut merged,
                &["session", "commandCooldownSecs"],
                Value::from(secs),
            ),
            Err(_) => warn!(value, "ignoring non-numeric SCRIBE_COOLDOWN_SECS"),
        }
    }

    merged
}

fn set_path(root: &mut Value, path: &[&str], value: Value) {
    let mut cursor = root;
    for key in &path[..path.len() - 1] {
        cursor = cursor
            .as_object_mut()
            .expect("settings root is an object")
            .entry((*key).to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    if let Some(map) = cursor.as_object_mut() {
        let _ = map.insert(path[path.len() - 1].to_string(), value);
    }
}

/// Resolve `${VAR}` references in secret-bearing fields.
fn resolve_secrets(settings: &mut ScribeSettings) {
    settings.github.token = resolve_env_ref(&settings.github.token);
    settings.jira.email = resolve_env_ref(&settings.jira.email);
    settings.jira.api_token = resolve_env_ref(&settings.jira.api_token);
}

/// Resolve a `${VAR}` reference from the environment.
///
/// Plain values pass through unchanged; an unset referenced variable
/// resolves to the empty string (the affected client then fails with a
/// readable auth error rather than sending a literal `${VAR}`).
#[must_use]
pub fn resolve_env_ref(value: &str) -> String {
    if let Some(name) = value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        match env::var(name) {
            Ok(resolved) => resolved,
            Err(_) => {
                warn!(variable = name, "referenced environment variable is not set");
                String::new()
            }
        }
    } else {
        value.to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn deep_merge_is_recursive() {
        let base = serde_json::json!({"a": {"x": 1, "y": 2}, "b": 3});
        let overlay = serde_json::json!({"a": {"y": 9}});
        let merged = deep_merge(base, overlay);
        assert_eq!(merged, serde_json::json!({"a": {"x": 1, "y": 9}, "b": 3}));
    }

    #[test]
    fn deep_merge_scalar_replaces() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"a": [2]}));
        assert_eq!(merged, serde_json::json!({"a": [2]}));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings.session.max_book_pages, 50);
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"github": {{"repository": "octo/repo", "token": "plain-token"}}, "session": {{"maxBookPages": 12}}}}"#
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.github.repository, "octo/repo");
        assert_eq!(settings.github.token, "plain-token");
        assert_eq!(settings.session.max_book_pages, 12);
        // Untouched sections keep defaults.
        assert_eq!(settings.model.max_tokens, 2048);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }

    #[test]
    fn plain_values_pass_through_resolution() {
        assert_eq!(resolve_env_ref("literal-token"), "literal-token");
    }

    #[test]
    fn unset_reference_resolves_empty() {
        assert_eq!(resolve_env_ref("${SCRIBE_TEST_UNSET_VAR_XYZ}"), "");
    }

    #[test]
    fn home_resolving_reference_resolves_nonempty() {
        // HOME is set in every environment the tests run in.
        assert_ne!(resolve_env_ref("${HOME}"), "${HOME}");
    }
}
