//! Issue-tracker REST adapter.
//!
//! Basic auth (account email + API token). Issue descriptions arrive as a
//! nested rich-document structure; [`flatten_document`] reduces it to plain
//! text, and [`text_document`] builds the single-paragraph inverse for
//! create/comment payloads.

use std::time::Duration;

use scribe_core::errors::{FetchError, FetchOutcome};
use scribe_core::records::{Issue, UNASSIGNED};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::fields::{lookup, optional_str, require_array, require_str};

/// Request timeout for tracker calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tracker adapter configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Tracker base URL, no trailing slash.
    pub url: String,
    /// Account email for basic auth.
    pub email: String,
    /// API token for basic auth.
    pub api_token: String,
    /// Project key used by search/create presets.
    pub project_key: String,
}

/// Issue-tracker REST client.
pub struct JiraClient {
    config: JiraConfig,
    client: reqwest::Client,
}

impl JiraClient {
    /// Create a new client. A trailing slash on the base URL is trimmed.
    #[must_use]
    pub fn new(mut config: JiraConfig) -> Self {
        while config.url.ends_with('/') {
            config.url.pop();
        }
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Project key this client is configured for.
    #[must_use]
    pub fn project_key(&self) -> &str {
        &self.config.project_key
    }

    /// Fetch one issue by key.
    #[instrument(skip(self))]
    pub async fn issue(&self, key: &str) -> FetchOutcome<Issue> {
        let url = format!("{}/rest/api/3/issue/{key}", self.config.url);
        let value = self.get_json(&url, "Failed to fetch issue").await?;
        parse_issue(&value, &self.config.url)
    }

    /// Search issues with a JQL query.
    #[instrument(skip(self, jql))]
    pub async fn search_issues(&self, jql: &str, max_results: u32) -> FetchOutcome<Vec<Issue>> {
        let url = format!("{}/rest/api/3/search", self.config.url);
        let body = json!({ "jql": jql, "maxResults": max_results });
        let value = self.post_json(&url, &body, "Failed to search issues").await?;

        let raw_issues = require_array(&value, "issues")?;
        let mut issues = Vec::with_capacity(raw_issues.len());
        for raw in raw_issues {
            issues.push(parse_issue(raw, &self.config.url)?);
        }
        debug!(count = issues.len(), "searched issues");
        Ok(issues)
    }

    /// Create an issue and return it fully populated.
    ///
    /// The create response only carries the new key, so the issue is
    /// re-fetched for its full details.
    #[instrument(skip(self, description))]
    pub async fn create_issue(
        &self,
        summary: &str,
        description: &str,
        issue_type: &str,
    ) -> FetchOutcome<Issue> {
        let url = format!("{}/rest/api/3/issue", self.config.url);

        let mut fields = json!({
            "project": { "key": self.config.project_key },
            "summary": summary,
            "issuetype": { "name": issue_type },
        });
        if !description.is_empty() {
            fields["description"] = text_document(description);
        }

        let value = self
            .post_json(&url, &json!({ "fields": fields }), "Failed to create issue")
            .await?;
        let key = require_str(&value, "key")?.to_owned();
        debug!(key, "created issue");

        self.issue(&key).await
    }

    /// Move an issue through the transition whose name matches
    /// (case-insensitively); `NotFound` when the workflow has no such
    /// transition from the issue's current status.
    #[instrument(skip(self))]
    pub async fn transition_issue(&self, key: &str, transition_name: &str) -> FetchOutcome<()> {
        let url = format!("{}/rest/api/3/issue/{key}/transitions", self.config.url);

        let value = self.get_json(&url, "Failed to get transitions").await?;
        let transitions = require_array(&value, "transitions")?;
        let transition_id = transitions
            .iter()
            .find(|t| {
                optional_str(t, "name").is_some_and(|n| n.eq_ignore_ascii_case(transition_name))
            })
            .and_then(|t| optional_str(t, "id"))
            .ok_or_else(|| {
                FetchError::not_found(format!("transition '{transition_name}' for issue {key}"))
            })?;

        let body = json!({ "transition": { "id": transition_id } });
        let _ = self
            .post_json(&url, &body, "Failed to transition issue")
            .await?;
        Ok(())
    }

    /// Add a plain-text comment to an issue.
    #[instrument(skip(self, comment))]
    pub async fn add_comment(&self, key: &str, comment: &str) -> FetchOutcome<()> {
        let url = format!("{}/rest/api/3/issue/{key}/comment", self.config.url);
        let body = json!({ "body": text_document(comment) });
        let _ = self.post_json(&url, &body, "Failed to add comment").await?;
        Ok(())
    }

    async fn get_json(&self, url: &str, context: &str) -> FetchOutcome<Value> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| FetchError::transport(format!("{context}: {e}")))?;
        Self::json_body(response, context).await
    }

    async fn post_json(&self, url: &str, body: &Value, context: &str) -> FetchOutcome<Value> {
        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(|e| FetchError::transport(format!("{context}: {e}")))?;
        Self::json_body(response, context).await
    }

    async fn json_body(response: reqwest::Response, context: &str) -> FetchOutcome<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = if body.is_empty() {
                status.to_string()
            } else {
                format!("{status} - {body}")
            };
            return Err(FetchError::status(status.as_u16(), format!("{context}: {detail}")));
        }

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::transport(format!("{context}: {e}")))?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| FetchError::malformed(format!("invalid JSON: {e}")))
    }
}

/// Normalize one issue payload.
///
/// Required: `key`, `fields.summary`, `fields.status.name`,
/// `fields.issuetype.name`. The description is flattened to plain text
/// (empty when absent); an absent or null assignee becomes [`UNASSIGNED`].
/// The canonical URL is derived from the tracker base URL and the key.
pub fn parse_issue(value: &Value, base_url: &str) -> FetchOutcome<Issue> {
    let key = require_str(value, "key")?.to_owned();

    let description = lookup(value, "fields.description")
        .filter(|d| !d.is_null())
        .map(flatten_document)
        .unwrap_or_default();

    let assignee = optional_str(value, "fields.assignee.displayName")
        .unwrap_or(UNASSIGNED)
        .to_owned();

    let url = format!("{base_url}/browse/{key}");

    Ok(Issue {
        key,
        summary: require_str(value, "fields.summary")?.to_owned(),
        description,
        status: require_str(value, "fields.status.name")?.to_owned(),
        issue_type: require_str(value, "fields.issuetype.name")?.to_owned(),
        assignee,
        url,
    })
}

/// Flatten a rich-document value to plain text.
///
/// Concatenates the text runs of each top-level block, one block per line,
/// and trims the result. Non-text runs (mentions, media) contribute nothing.
#[must_use]
pub fn flatten_document(doc: &Value) -> String {
    let mut text = String::new();
    if let Some(blocks) = doc.get("content").and_then(Value::as_array) {
        for block in blocks {
            if let Some(runs) = block.get("content").and_then(Value::as_array) {
                for run in runs {
                    if let Some(run_text) = run.get("text").and_then(Value::as_str) {
                        text.push_str(run_text);
                    }
                }
            }
            text.push('\n');
        }
    }
    text.trim().to_owned()
}

/// Build a single-paragraph rich document from plain text.
#[must_use]
pub fn text_document(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [{ "type": "text", "text": text }]
        }]
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const BASE: &str = "https://tracker.example.com";

    fn issue_payload(key: &str) -> Value {
        json!({
            "key": key,
            "fields": {
                "summary": "Login times out",
                "description": {
                    "type": "doc",
                    "version": 1,
                    "content": [
                        { "type": "paragraph", "content": [
                            { "type": "text", "text": "Session expires " },
                            { "type": "text", "text": "after 5s." }
                        ]},
                        { "type": "paragraph", "content": [
                            { "type": "text", "text": "Seen on prod." }
                        ]}
                    ]
                },
                "status": { "name": "In Progress" },
                "issuetype": { "name": "Bug" },
                "assignee": { "displayName": "Dana Field" }
            }
        })
    }

    fn test_client(base: &str) -> JiraClient {
        JiraClient::new(JiraConfig {
            url: base.to_string(),
            email: "bot@example.com".into(),
            api_token: "token".into(),
            project_key: "PROJ".into(),
        })
    }

    // ── parse_issue ──────────────────────────────────────────────────────

    #[test]
    fn parse_full_payload() {
        let issue = parse_issue(&issue_payload("PROJ-12"), BASE).unwrap();
        assert_eq!(issue.key, "PROJ-12");
        assert_eq!(issue.summary, "Login times out");
        assert_eq!(issue.description, "Session expires after 5s.\nSeen on prod.");
        assert_eq!(issue.status, "In Progress");
        assert_eq!(issue.issue_type, "Bug");
        assert_eq!(issue.assignee, "Dana Field");
        assert_eq!(issue.url, "https://tracker.example.com/browse/PROJ-12");
    }

    #[test]
    fn parse_missing_description_is_empty() {
        let mut payload = issue_payload("PROJ-1");
        assert!(payload["fields"].as_object_mut().unwrap().remove("description").is_some());
        let issue = parse_issue(&payload, BASE).unwrap();
        assert_eq!(issue.description, "");
    }

    #[test]
    fn parse_null_assignee_is_unassigned() {
        let mut payload = issue_payload("PROJ-1");
        payload["fields"]["assignee"] = Value::Null;
        let issue = parse_issue(&payload, BASE).unwrap();
        assert_eq!(issue.assignee, UNASSIGNED);
    }

    #[test]
    fn parse_missing_summary_is_malformed() {
        let mut payload = issue_payload("PROJ-1");
        assert!(payload["fields"].as_object_mut().unwrap().remove("summary").is_some());
        let err = parse_issue(&payload, BASE).unwrap_err();
        assert_matches!(err, FetchError::Malformed { context } => {
            assert!(context.contains("fields.summary"));
        });
    }

    // ── flatten_document ─────────────────────────────────────────────────

    #[test]
    fn flatten_concatenates_runs_per_block() {
        let doc = json!({
            "content": [
                { "content": [{ "text": "one " }, { "text": "two" }] },
                { "content": [{ "text": "three" }] }
            ]
        });
        assert_eq!(flatten_document(&doc), "one two\nthree");
    }

    #[test]
    fn flatten_skips_blocks_without_runs() {
        let doc = json!({
            "content": [
                { "type": "rule" },
                { "content": [{ "text": "after the rule" }] }
            ]
        });
        assert_eq!(flatten_document(&doc), "after the rule");
    }

    #[test]
    fn flatten_empty_document() {
        assert_eq!(flatten_document(&json!({ "content": [] })), "");
        assert_eq!(flatten_document(&json!({})), "");
    }

    #[test]
    fn text_document_round_trips_through_flatten() {
        assert_eq!(flatten_document(&text_document("report body")), "report body");
    }

    // ── HTTP ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn issue_fetch_parses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/PROJ-12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(issue_payload("PROJ-12")))
            .mount(&server)
            .await;

        let issue = test_client(&server.uri()).issue("PROJ-12").await.unwrap();
        assert_eq!(issue.key, "PROJ-12");
        assert!(issue.url.starts_with(&server.uri()));
    }

    #[tokio::test]
    async fn search_parses_each_hit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/3/search"))
            .and(body_partial_json(json!({ "maxResults": 20 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issues": [issue_payload("PROJ-1"), issue_payload("PROJ-2")]
            })))
            .mount(&server)
            .await;

        let issues = test_client(&server.uri())
            .search_issues("project = PROJ", 20)
            .await
            .unwrap();
        assert_eq!(issues.len(), 2);
    }

    #[tokio::test]
    async fn create_refetches_full_issue() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/3/issue"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "key": "PROJ-77" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/PROJ-77"))
            .respond_with(ResponseTemplate::new(200).set_body_json(issue_payload("PROJ-77")))
            .expect(1)
            .mount(&server)
            .await;

        let issue = test_client(&server.uri())
            .create_issue("Login times out", "details", "Bug")
            .await
            .unwrap();
        assert_eq!(issue.key, "PROJ-77");
    }

    #[tokio::test]
    async fn transition_matches_name_case_insensitively() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/PROJ-1/transitions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "transitions": [
                    { "id": "11", "name": "To Do" },
                    { "id": "21", "name": "In Progress" }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/api/3/issue/PROJ-1/transitions"))
            .and(body_partial_json(json!({ "transition": { "id": "21" } })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server.uri())
            .transition_issue("PROJ-1", "in progress")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_transition_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/PROJ-1/transitions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "transitions": [] })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .transition_issue("PROJ-1", "Done")
            .await
            .unwrap_err();
        assert_matches!(err, FetchError::NotFound { .. });
    }

    #[tokio::test]
    async fn error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/PROJ-1"))
            .respond_with(ResponseTemplate::new(400).set_body_string("field 'project' is required"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).issue("PROJ-1").await.unwrap_err();
        assert_matches!(err, FetchError::Transport { status: Some(400), message } => {
            assert!(message.contains("field 'project' is required"));
        });
    }
}
