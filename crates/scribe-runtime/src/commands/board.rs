//! Project-board commands: `board-list` and `board-view`.

use scribe_core::book::paginate;
use scribe_core::ids::ActorId;
use scribe_core::records::{Project, ProjectBoard};
use scribe_settings::get_settings;

use super::{CommandOutput, Scribe, short_repo};
use crate::host::{Book, Host};

impl Scribe {
    /// `board-list` — list the repository's boards as chat lines.
    pub fn board_list(&self, host: &mut dyn Host, actor: ActorId) {
        if !self.check_cooldown(host, actor) {
            return;
        }
        host.send_message(actor, "Fetching projects...");

        let projects = self.projects();
        self.submit_command(actor, async move {
            let listing = projects.list_projects().await?;
            if listing.is_empty() {
                return Ok(CommandOutput::Lines(vec!["No projects found!".to_owned()]));
            }
            Ok(CommandOutput::Lines(format_project_lines(&listing)))
        });
    }

    /// `board-view [number]` — deliver one board as a book, grouped by
    /// status. Without an argument the configured default board is used.
    pub fn board_view(&self, host: &mut dyn Host, actor: ActorId, number: Option<&str>) {
        if !self.check_cooldown(host, actor) {
            return;
        }

        let settings = get_settings();
        let number = match number {
            Some(raw) => match raw.parse::<u64>() {
                Ok(number) => number,
                Err(_) => {
                    host.send_message(actor, &format!("Invalid project number: {raw}"));
                    return;
                }
            },
            None => settings.github.project_number,
        };

        host.send_message(actor, "Fetching project board...");

        let projects = self.projects();
        let repository = settings.github.repository.clone();
        let max_pages = settings.session.max_book_pages;

        self.submit_command(actor, async move {
            let board = projects.project_board(number).await?;
            let note = format!("✓ Project board with {} items!", board.items.len());
            let book = Book {
                title: format!("{} Project #{}", short_repo(&repository), board.number),
                author: "GitHub".to_owned(),
                document: paginate(&format_board(&board), max_pages),
            };
            Ok(CommandOutput::Book { book, note })
        });
    }
}

fn format_project_lines(projects: &[Project]) -> Vec<String> {
    let mut lines = vec!["Projects:".to_owned()];
    for project in projects {
        lines.push(format!("  #{}: {}", project.number, project.title));
    }
    lines.push("Use board-view <number> to view a board".to_owned());
    lines
}

/// Board layout: title, per-status counts, then the items grouped by
/// status in first-appearance order.
fn format_board(board: &ProjectBoard) -> String {
    // First-appearance order keeps the output stable run to run.
    let mut statuses: Vec<&str> = Vec::new();
    for item in &board.items {
        if !statuses.contains(&item.status.as_str()) {
            statuses.push(&item.status);
        }
    }

    let mut content = String::new();
    content.push_str(&board.title);
    content.push_str("\n---\n\n");

    content.push_str("Summary:\n");
    for status in &statuses {
        let count = board.items.iter().filter(|i| i.status == *status).count();
        content.push_str(&format!("  {status}: {count}\n"));
    }
    content.push_str("\n---\n\n");

    for status in &statuses {
        content.push_str(&format!("[{status}]\n"));
        for item in board.items.iter().filter(|i| i.status == *status) {
            content.push_str(&format!(
                "#{}: {}\n  State: {}\n\n",
                item.number, item.title, item.state
            ));
        }
        content.push('\n');
    }

    content
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
