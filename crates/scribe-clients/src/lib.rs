//! # scribe-clients
//!
//! External-service adapters for Scribe:
//!
//! - [`github`] — source-control REST API (pull requests, diffs, file
//!   contents, issue creation)
//! - [`projects`] — project-board GraphQL API (board listing and walking)
//! - [`jira`] — issue-tracker REST API (get/search/create/transition/
//!   comment, rich-document flattening)
//! - [`llm`] — model server (completion + chat endpoints with the
//!   chat→completion fallback)
//!
//! Each adapter owns its `reqwest::Client` with a fixed per-service request
//! timeout and converts every failure into a [`scribe_core::errors::FetchError`].
//! Response normalization lives in pure `parse_*` functions over
//! `serde_json::Value`, so the shape handling is testable without HTTP.

#![deny(unsafe_code)]

mod fields;

pub mod github;
pub mod jira;
pub mod llm;
pub mod projects;

pub use github::{GithubClient, GithubConfig};
pub use jira::{JiraClient, JiraConfig};
pub use llm::{ModelClient, ModelConfig};
pub use projects::{ProjectsClient, ProjectsConfig};
