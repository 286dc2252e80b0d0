//! Source-control REST adapter: pull requests, diffs, file contents, issues.
//!
//! Bearer auth, versioned media-type Accept headers, one attempt per call —
//! failures surface to the caller, nothing is retried here.

use std::time::Duration;

use scribe_core::errors::{FetchError, FetchOutcome};
use scribe_core::records::PullRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::fields::{optional_str, require_str, require_u64};

/// JSON media type for the REST API.
const ACCEPT_JSON: &str = "application/vnd.github.v3+json";

/// Media type that makes the PR endpoint return the unified diff.
const ACCEPT_DIFF: &str = "application/vnd.github.v3.diff";

/// Media type that makes the contents endpoint return the raw file.
const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";

/// Request timeout for REST calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source-control adapter configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GithubConfig {
    /// API token.
    pub token: String,
    /// Repository in `owner/name` form.
    pub repository: String,
    /// REST API base URL.
    pub api_url: String,
}

/// Source-control REST client.
pub struct GithubClient {
    config: GithubConfig,
    client: reqwest::Client,
}

impl GithubClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: GithubConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Create a new client with a shared HTTP client.
    #[must_use]
    pub fn with_client(config: GithubConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Repository this client is bound to.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.config.repository
    }

    /// Fetch a single pull request by number.
    #[instrument(skip(self), fields(repo = %self.config.repository))]
    pub async fn pull_request(&self, number: u64) -> FetchOutcome<PullRequest> {
        let url = format!(
            "{}/repos/{}/pulls/{number}",
            self.config.api_url, self.config.repository
        );
        let body = self.get_text(&url, ACCEPT_JSON, "Failed to fetch PR").await?;
        let value: Value = parse_json(&body)?;
        parse_pull_request(&value)
    }

    /// List open pull requests, newest first.
    #[instrument(skip(self), fields(repo = %self.config.repository))]
    pub async fn list_pull_requests(&self) -> FetchOutcome<Vec<PullRequest>> {
        let url = format!(
            "{}/repos/{}/pulls?state=open&sort=created&direction=desc",
            self.config.api_url, self.config.repository
        );
        let body = self.get_text(&url, ACCEPT_JSON, "Failed to list PRs").await?;
        let value: Value = parse_json(&body)?;
        let items = value
            .as_array()
            .ok_or_else(|| FetchError::malformed("expected a PR array"))?;

        let mut prs = Vec::with_capacity(items.len());
        for item in items {
            prs.push(parse_pull_request(item)?);
        }
        debug!(count = prs.len(), "listed open pull requests");
        Ok(prs)
    }

    /// The most recently created open pull request.
    pub async fn latest_pull_request(&self) -> FetchOutcome<PullRequest> {
        let mut prs = self.list_pull_requests().await?;
        if prs.is_empty() {
            return Err(FetchError::not_found("open pull request"));
        }
        Ok(prs.remove(0))
    }

    /// Fetch the unified diff of a pull request.
    #[instrument(skip(self), fields(repo = %self.config.repository))]
    pub async fn pull_request_diff(&self, number: u64) -> FetchOutcome<String> {
        let url = format!(
            "{}/repos/{}/pulls/{number}",
            self.config.api_url, self.config.repository
        );
        self.get_text(&url, ACCEPT_DIFF, "Failed to fetch diff").await
    }

    /// Fetch a file's raw contents from the repository's default branch.
    #[instrument(skip(self), fields(repo = %self.config.repository))]
    pub async fn file_contents(&self, path: &str) -> FetchOutcome<String> {
        let url = format!(
            "{}/repos/{}/contents/{path}",
            self.config.api_url, self.config.repository
        );
        self.get_text(&url, ACCEPT_RAW, "Failed to fetch file").await
    }

    /// Create an issue; returns the new issue's number.
    #[instrument(skip(self, body), fields(repo = %self.config.repository))]
    pub async fn create_issue(&self, title: &str, body: Option<&str>) -> FetchOutcome<u64> {
        let url = format!(
            "{}/repos/{}/issues",
            self.config.api_url, self.config.repository
        );
        let mut request_body = json!({ "title": title });
        if let Some(body) = body.filter(|b| !b.is_empty()) {
            request_body["body"] = json!(body);
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .header(reqwest::header::ACCEPT, ACCEPT_JSON)
            .timeout(REQUEST_TIMEOUT)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| FetchError::transport(format!("Failed to create issue: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(
                status.as_u16(),
                format!("Failed to create issue: {status}"),
            ));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| FetchError::transport(format!("Failed to create issue: {e}")))?;
        let number = require_u64(&value, "number")?;
        debug!(number, "created issue");
        Ok(number)
    }

    async fn get_text(&self, url: &str, accept: &'static str, context: &str) -> FetchOutcome<String> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.token)
            .header(reqwest::header::ACCEPT, accept)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| FetchError::transport(format!("{context}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(
                status.as_u16(),
                format!("{context}: {status}"),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::transport(format!("{context}: {e}")))
    }
}

fn parse_json(body: &str) -> FetchOutcome<Value> {
    serde_json::from_str(body).map_err(|e| FetchError::malformed(format!("invalid JSON: {e}")))
}

/// Normalize one pull-request payload.
///
/// Required: `number`, `title`, `state`, `user.login`, `html_url`,
/// `created_at`. `body` defaults to empty when null or absent; `head.ref`
/// is optional and left unset when the payload has none.
pub fn parse_pull_request(value: &Value) -> FetchOutcome<PullRequest> {
    Ok(PullRequest {
        number: require_u64(value, "number")?,
        title: require_str(value, "title")?.to_owned(),
        body: optional_str(value, "body").unwrap_or_default().to_owned(),
        state: require_str(value, "state")?.to_owned(),
        author: require_str(value, "user.login")?.to_owned(),
        branch: optional_str(value, "head.ref").map(str::to_owned),
        url: require_str(value, "html_url")?.to_owned(),
        created_at: require_str(value, "created_at")?.to_owned(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
