//! Project-board GraphQL adapter.
//!
//! Boards are ProjectV2 nodes: a listing query resolves board numbers to
//! node IDs, an items query walks the board. Items whose linked content is
//! missing or has no `number` are draft notes, not issues — they are
//! skipped, not errors.

use std::time::Duration;

use scribe_core::errors::{FetchError, FetchOutcome};
use scribe_core::records::{NO_STATUS, Project, ProjectBoard, ProjectItem};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::fields::{lookup, optional_str, require_array, require_str, require_u64};

/// Default GraphQL endpoint.
const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Request timeout for GraphQL calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Board adapter configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectsConfig {
    /// API token.
    pub token: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// GraphQL endpoint override (tests); default is the public endpoint.
    pub graphql_url: Option<String>,
}

/// Project-board GraphQL client.
pub struct ProjectsClient {
    config: ProjectsConfig,
    client: reqwest::Client,
}

impl ProjectsClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: ProjectsConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// List the repository's boards (first 10).
    #[instrument(skip(self), fields(owner = %self.config.owner, repo = %self.config.repo))]
    pub async fn list_projects(&self) -> FetchOutcome<Vec<Project>> {
        let query = format!(
            r#"{{
  repository(owner: "{}", name: "{}") {{
    projectsV2(first: 10) {{
      nodes {{ id number title url }}
    }}
  }}
}}"#,
            self.config.owner, self.config.repo
        );

        let response = self.execute_graphql(&query, "Failed to list projects").await?;
        parse_projects(&response)
    }

    /// Fetch one board with its items (first 50).
    ///
    /// The board number is resolved to a node ID via the listing; an unknown
    /// number is `NotFound`.
    #[instrument(skip(self), fields(owner = %self.config.owner, repo = %self.config.repo))]
    pub async fn project_board(&self, number: u64) -> FetchOutcome<ProjectBoard> {
        let projects = self.list_projects().await?;
        let project = projects
            .into_iter()
            .find(|p| p.number == number)
            .ok_or_else(|| FetchError::not_found(format!("project #{number}")))?;

        let query = format!(
            r#"{{
  node(id: "{}") {{
    ... on ProjectV2 {{
      items(first: 50) {{
        nodes {{
          id
          content {{
            ... on Issue {{ number title state url }}
          }}
          fieldValues(first: 8) {{
            nodes {{
              ... on ProjectV2ItemFieldSingleSelectValue {{
                name
                field {{
                  ... on ProjectV2SingleSelectField {{ name }}
                }}
              }}
            }}
          }}
        }}
      }}
    }}
  }}
}}"#,
            project.id
        );

        let response = self
            .execute_graphql(&query, "Failed to fetch project board")
            .await?;
        let nodes = lookup(&response, "data.node.items.nodes")
            .ok_or_else(|| FetchError::malformed("missing field `data.node.items.nodes`"))?;
        let items = parse_board_items(nodes)?;
        debug!(number, items = items.len(), "fetched project board");

        Ok(ProjectBoard {
            number,
            title: project.title,
            items,
        })
    }

    async fn execute_graphql(&self, query: &str, context: &str) -> FetchOutcome<Value> {
        let url = self
            .config
            .graphql_url
            .as_deref()
            .unwrap_or(DEFAULT_GRAPHQL_URL);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.token)
            .timeout(REQUEST_TIMEOUT)
            .json(&json!({ "query": query }))
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

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::transport(format!("{context}: {e}")))?;

        // A 200 with an `errors` array is still a failed query.
        if let Some(errors) = body.get("errors") {
            return Err(FetchError::transport(format!("GraphQL errors: {errors}")));
        }

        Ok(body)
    }
}

/// Normalize the board-listing response.
pub fn parse_projects(response: &Value) -> FetchOutcome<Vec<Project>> {
    let nodes = require_array(response, "data.repository.projectsV2.nodes")?;
    let mut projects = Vec::with_capacity(nodes.len());
    for node in nodes {
        projects.push(Project {
            id: require_str(node, "id")?.to_owned(),
            number: require_u64(node, "number")?,
            title: require_str(node, "title")?.to_owned(),
            url: require_str(node, "url")?.to_owned(),
        });
    }
    Ok(projects)
}

/// Normalize a board's item node list.
///
/// Items with missing/null content or no `number` are skipped silently.
/// The status label comes from the first field value whose field is named
/// `"Status"`; [`NO_STATUS`] when none matches.
pub fn parse_board_items(nodes: &Value) -> FetchOutcome<Vec<ProjectItem>> {
    let nodes = nodes
        .as_array()
        .ok_or_else(|| FetchError::malformed("expected a board item array"))?;

    let mut items = Vec::new();
    for item in nodes {
        let Some(content) = item.get("content").filter(|c| !c.is_null()) else {
            continue;
        };
        let Some(number) = content.get("number").and_then(Value::as_u64) else {
            continue;
        };

        let mut status = NO_STATUS.to_owned();
        if let Some(field_values) = lookup(item, "fieldValues.nodes").and_then(Value::as_array) {
            for field_value in field_values {
                let label = optional_str(field_value, "name");
                let field_name = optional_str(field_value, "field.name");
                if let (Some(label), Some("Status")) = (label, field_name) {
                    status = label.to_owned();
                    break;
                }
            }
        }

        items.push(ProjectItem {
            number,
            title: require_str(content, "title")?.to_owned(),
            state: require_str(content, "state")?.to_owned(),
            status,
            url: require_str(content, "url")?.to_owned(),
        });
    }

    Ok(items)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
