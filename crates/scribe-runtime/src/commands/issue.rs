//! Issue-tracker commands: `issue-create`, `issue-view`, `issue-list`.

use std::sync::Arc;

use scribe_core::book::paginate;
use scribe_core::ids::ActorId;
use scribe_core::records::Issue;
use scribe_settings::get_settings;

use super::{CommandOutput, Scribe};
use crate::host::{Book, Host};

/// Result cap for issue searches.
const SEARCH_LIMIT: u32 = 20;

/// Separator between summary and description in `issue-create`.
const DESCRIPTION_SEPARATOR: &str = " | ";

impl Scribe {
    /// `issue-create <type> <summary> [| description]`.
    pub fn issue_create(&self, host: &mut dyn Host, actor: ActorId, args: &[&str]) {
        if !self.check_cooldown(host, actor) {
            return;
        }
        if args.len() < 2 {
            host.send_message(actor, "Usage: issue-create <type> <summary> [| description]");
            host.send_message(actor, "Types: Bug, Task, Story");
            return;
        }

        let issue_type = args[0].to_owned();
        let rest = args[1..].join(" ");
        let (summary, description) = match rest.split_once(DESCRIPTION_SEPARATOR) {
            Some((summary, description)) => (summary.to_owned(), description.to_owned()),
            None => (rest, String::new()),
        };

        host.send_message(actor, &format!("Creating {issue_type} in tracker..."));

        let jira = Arc::clone(&self.jira);
        self.submit_command(actor, async move {
            let issue = jira.create_issue(&summary, &description, &issue_type).await?;
            Ok(CommandOutput::Lines(vec![
                format!("✓ Created {}: {}", issue.key, issue.summary),
                format!("View at: {}", issue.url),
            ]))
        });
    }

    /// `issue-view <key>` — deliver one issue as a book.
    pub fn issue_view(&self, host: &mut dyn Host, actor: ActorId, key: Option<&str>) {
        if !self.check_cooldown(host, actor) {
            return;
        }
        let Some(key) = key else {
            host.send_message(actor, "Usage: issue-view <issue-key>");
            return;
        };
        let key = key.to_uppercase();

        host.send_message(actor, &format!("Fetching {key}..."));

        let jira = Arc::clone(&self.jira);
        let max_pages = get_settings().session.max_book_pages;

        self.submit_command(actor, async move {
            let issue = jira.issue(&key).await?;
            let note = format!("✓ {} details in book!", issue.key);
            let book = Book {
                title: issue.key.clone(),
                author: "Jira".to_owned(),
                document: paginate(&format_issue(&issue), max_pages),
            };
            Ok(CommandOutput::Book { book, note })
        });
    }

    /// `issue-list [mine|bugs|all]` — search with a preset query and
    /// deliver the hits as a book.
    pub fn issue_list(&self, host: &mut dyn Host, actor: ActorId, filter: Option<&str>) {
        if !self.check_cooldown(host, actor) {
            return;
        }

        let project_key = get_settings().jira.project_key.clone();
        let (jql, list_name) = preset_query(filter, &project_key);

        host.send_message(actor, "Searching issues...");

        let jira = Arc::clone(&self.jira);
        let max_pages = get_settings().session.max_book_pages;

        self.submit_command(actor, async move {
            let issues = jira.search_issues(&jql, SEARCH_LIMIT).await?;
            if issues.is_empty() {
                return Ok(CommandOutput::Lines(vec!["No issues found!".to_owned()]));
            }

            let note = format!("✓ Found {} issue(s)!", issues.len());
            let book = Book {
                title: list_name.clone(),
                author: "Jira".to_owned(),
                document: paginate(&format_issue_list(&list_name, &issues), max_pages),
            };
            Ok(CommandOutput::Book { book, note })
        });
    }
}

/// JQL presets keyed by the filter word.
fn preset_query(filter: Option<&str>, project_key: &str) -> (String, String) {
    match filter.map(str::to_lowercase).as_deref() {
        Some("mine") => (
            "assignee = currentUser() AND resolution = Unresolved ORDER BY updated DESC"
                .to_owned(),
            "My Issues".to_owned(),
        ),
        Some("bugs") => (
            format!(
                "project = {project_key} AND type = Bug AND resolution = Unresolved \
                 ORDER BY priority DESC"
            ),
            "Open Bugs".to_owned(),
        ),
        Some("all") => (
            format!("project = {project_key} ORDER BY updated DESC"),
            "All Issues".to_owned(),
        ),
        _ => (
            format!("project = {project_key} AND resolution = Unresolved ORDER BY updated DESC"),
            "Open Issues".to_owned(),
        ),
    }
}

fn format_issue(issue: &Issue) -> String {
    format!(
        "{}\n---\n\nType: {}\nStatus: {}\nAssignee: {}\n\nDescription:\n{}\n\n---\nURL: {}",
        issue.summary,
        issue.issue_type,
        issue.status,
        issue.assignee,
        if issue.description.is_empty() {
            "(no description)"
        } else {
            &issue.description
        },
        issue.url
    )
}

fn format_issue_list(list_name: &str, issues: &[Issue]) -> String {
    let mut content = String::new();
    content.push_str(&format!(
        "{list_name}\nFound {} issue(s)\n---\n\n",
        issues.len()
    ));
    for issue in issues {
        content.push_str(&format!(
            "[{}] {}\nStatus: {} | Type: {}\nAssignee: {}\n\n",
            issue.key, issue.summary, issue.status, issue.issue_type, issue.assignee
        ));
    }
    content
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use scribe_core::records::UNASSIGNED;

    use super::*;

    fn issue(key: &str, description: &str) -> Issue {
        Issue {
            key: key.to_owned(),
            summary: "Login times out".to_owned(),
            description: description.to_owned(),
            status: "Open".to_owned(),
            issue_type: "Bug".to_owned(),
            assignee: UNASSIGNED.to_owned(),
            url: format!("https://tracker.example.com/browse/{key}"),
        }
    }

    #[test]
    fn preset_default_is_open_issues() {
        let (jql, name) = preset_query(None, "PROJ");
        assert!(jql.contains("project = PROJ"));
        assert!(jql.contains("resolution = Unresolved"));
        assert_eq!(name, "Open Issues");
    }

    #[test]
    fn preset_mine_ignores_project() {
        let (jql, name) = preset_query(Some("MINE"), "PROJ");
        assert!(jql.contains("currentUser()"));
        assert!(!jql.contains("PROJ"));
        assert_eq!(name, "My Issues");
    }

    #[test]
    fn preset_bugs_filters_type() {
        let (jql, _) = preset_query(Some("bugs"), "PROJ");
        assert!(jql.contains("type = Bug"));
    }

    #[test]
    fn unknown_filter_falls_back_to_default() {
        let (_, name) = preset_query(Some("weird"), "PROJ");
        assert_eq!(name, "Open Issues");
    }

    #[test]
    fn view_layout_shows_placeholder_for_empty_description() {
        let content = format_issue(&issue("PROJ-1", ""));
        assert!(content.contains("Description:\n(no description)"));
        assert!(content.contains("Assignee: Unassigned"));
    }

    #[test]
    fn list_layout_counts_and_keys() {
        let content = format_issue_list("Open Issues", &[issue("PROJ-1", ""), issue("PROJ-2", "d")]);
        assert!(content.starts_with("Open Issues\nFound 2 issue(s)"));
        assert!(content.contains("[PROJ-1] Login times out"));
        assert!(content.contains("[PROJ-2]"));
    }
}
