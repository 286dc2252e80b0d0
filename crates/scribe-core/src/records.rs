//! Canonical records for external entities.
//!
//! These are the normalized forms the rest of the system works with. Each is
//! created fresh per fetch, lives for one command invocation, and is dropped
//! after delivery — nothing here is cached or shared across invocations.

use serde::{Deserialize, Serialize};

/// Assignee sentinel used when an issue has no assignee.
pub const UNASSIGNED: &str = "Unassigned";

/// Status sentinel used when a board item carries no "Status" field value.
pub const NO_STATUS: &str = "No Status";

/// A pull request, as normalized from the source-control API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number, unique within a repository.
    pub number: u64,
    /// Title line.
    pub title: String,
    /// Body text; empty when the payload had none.
    pub body: String,
    /// State as reported by the API ("open"/"closed").
    pub state: String,
    /// Author login.
    pub author: String,
    /// Source branch name, when the payload provided one.
    pub branch: Option<String>,
    /// Canonical web URL.
    pub url: String,
    /// Creation timestamp, kept as the opaque string the API returned.
    pub created_at: String,
}

impl PullRequest {
    /// Branch name for display; `"?"` when the payload had none.
    #[must_use]
    pub fn branch_display(&self) -> &str {
        self.branch.as_deref().unwrap_or("?")
    }
}

/// A tracker issue, as normalized from the issue-tracker API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue key, unique within a tracker project (e.g. `PROJ-123`).
    pub key: String,
    /// Summary line.
    pub summary: String,
    /// Description flattened to plain text; empty when absent.
    pub description: String,
    /// Workflow status name.
    pub status: String,
    /// Issue type name (Bug, Task, ...).
    pub issue_type: String,
    /// Assignee display name, or [`UNASSIGNED`].
    pub assignee: String,
    /// Canonical web URL.
    pub url: String,
}

/// A project board reference from the board listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Opaque node ID used to fetch the board's items.
    pub id: String,
    /// Board number shown to users.
    pub number: u64,
    /// Board title.
    pub title: String,
    /// Canonical web URL.
    pub url: String,
}

/// A project board with its issue items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBoard {
    /// Board number.
    pub number: u64,
    /// Board title.
    pub title: String,
    /// Items in board order. Non-issue items (draft notes) are not included.
    pub items: Vec<ProjectItem>,
}

/// One issue item on a project board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectItem {
    /// Linked issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Issue state as reported.
    pub state: String,
    /// Board status column label, or [`NO_STATUS`].
    pub status: String,
    /// Canonical web URL.
    pub url: String,
}
