//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so a partial
//! JSON file is valid — missing fields get their compiled default. Token
//! fields may hold a `${VAR}` reference that the loader resolves from the
//! environment, so secrets never have to live in the file itself.

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// Loaded from `~/.scribe/settings.json` with defaults applied for missing
/// fields and `SCRIBE_*` environment overrides applied on top.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScribeSettings {
    /// Settings schema version.
    pub version: String,
    /// Source-control API settings.
    pub github: GithubSettings,
    /// Issue-tracker API settings.
    pub jira: JiraSettings,
    /// Model-server settings.
    pub model: ModelSettings,
    /// Per-session behavior (cooldown, book size).
    pub session: SessionSettings,
    /// Prompt templates for model-backed commands.
    pub prompts: PromptSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for ScribeSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            github: GithubSettings::default(),
            jira: JiraSettings::default(),
            model: ModelSettings::default(),
            session: SessionSettings::default(),
            prompts: PromptSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Source-control API settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GithubSettings {
    /// API token; `${VAR}` references are resolved from the environment.
    pub token: String,
    /// Repository in `owner/name` form.
    pub repository: String,
    /// REST API base URL.
    pub api_url: String,
    /// Default project board number for `board view`.
    pub project_number: u64,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            token: "${GITHUB_TOKEN}".to_string(),
            repository: String::new(),
            api_url: "https://api.github.com".to_string(),
            project_number: 1,
        }
    }
}

/// Issue-tracker API settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JiraSettings {
    /// Tracker base URL (e.g. `https://example.atlassian.net`).
    pub url: String,
    /// Account email for basic auth; `${VAR}` references are resolved.
    pub email: String,
    /// API token for basic auth; `${VAR}` references are resolved.
    pub api_token: String,
    /// Project key used by list/create presets.
    pub project_key: String,
}

impl Default for JiraSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            email: "${JIRA_EMAIL}".to_string(),
            api_token: "${JIRA_API_TOKEN}".to_string(),
            project_key: String::new(),
        }
    }
}

/// Model-server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSettings {
    /// Server base URL.
    pub url: String,
    /// Model ID sent with every request.
    pub model: String,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Connect/read/write timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 2048,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

/// Per-session behavior settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    /// Seconds an actor must wait between commands; `<= 0` disables the gate.
    pub command_cooldown_secs: i64,
    /// Page cap handed to the pagination engine.
    pub max_book_pages: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            command_cooldown_secs: 5,
            max_book_pages: 50,
        }
    }
}

/// Prompt templates for model-backed commands.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptSettings {
    /// Review template; `{pr_data}` is replaced with the PR summary + diff.
    pub review: String,
    /// Explain template; `{code}` is replaced with the fetched file.
    pub explain: String,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            review: "Review this pull request and point out bugs, risks, and \
                     improvements:\n{pr_data}"
                .to_string(),
            explain: "Explain this code:\n{code}".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default tracing directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_shipped_config() {
        let settings = ScribeSettings::default();
        assert_eq!(settings.github.api_url, "https://api.github.com");
        assert_eq!(settings.model.url, "http://localhost:8000");
        assert_eq!(settings.model.max_tokens, 2048);
        assert_eq!(settings.session.command_cooldown_secs, 5);
        assert_eq!(settings.session.max_book_pages, 50);
    }

    #[test]
    fn partial_json_fills_missing_fields() {
        let settings: ScribeSettings =
            serde_json::from_str(r#"{"github": {"repository": "octo/repo"}}"#).unwrap();
        assert_eq!(settings.github.repository, "octo/repo");
        assert_eq!(settings.github.api_url, "https://api.github.com");
        assert_eq!(settings.session.max_book_pages, 50);
    }

    #[test]
    fn camel_case_wire_format() {
        let json = serde_json::to_value(ScribeSettings::default()).unwrap();
        assert!(json["model"]["maxTokens"].is_u64());
        assert!(json["session"]["commandCooldownSecs"].is_i64());
    }
}
