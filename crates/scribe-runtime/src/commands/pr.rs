//! Pull-request commands: `pr-list` and `pr-review`.

use std::sync::Arc;

use scribe_core::book::paginate;
use scribe_core::ids::ActorId;
use scribe_core::records::PullRequest;
use scribe_core::text::tail_truncate;
use scribe_settings::get_settings;

use super::{CommandOutput, Scribe, short_repo};
use crate::host::{Book, Host};

/// Review prompts are cut when the PR data exceeds this many characters...
const REVIEW_INPUT_LIMIT: usize = 4000;

/// ...keeping this much of the tail (later diff hunks carry the signal).
const REVIEW_INPUT_KEEP: usize = 3000;

/// Which PR a review targets.
enum ReviewTarget {
    Latest,
    Number(u64),
}

impl Scribe {
    /// `pr-list` — deliver the open pull requests as a book.
    pub fn pr_list(&self, host: &mut dyn Host, actor: ActorId) {
        if !self.check_cooldown(host, actor) {
            return;
        }
        host.send_message(actor, "Fetching pull requests...");

        let github = self.github();
        let settings = get_settings();
        let repository = settings.github.repository.clone();
        let max_pages = settings.session.max_book_pages;

        self.submit_command(actor, async move {
            let prs = github.list_pull_requests().await?;
            if prs.is_empty() {
                return Ok(CommandOutput::Lines(vec![
                    "No open pull requests found!".to_owned(),
                ]));
            }

            let note = format!("Found {} open PRs! Check your inventory.", prs.len());
            let book = Book {
                title: format!("PRs: {repository}"),
                author: "GitHub".to_owned(),
                document: paginate(&format_pr_list(&prs), max_pages),
            };
            Ok(CommandOutput::Book { book, note })
        });
    }

    /// `pr-review <latest|number>` — fetch the PR and its diff, ask the
    /// model for a review, deliver it as a book.
    pub fn pr_review(&self, host: &mut dyn Host, actor: ActorId, target: Option<&str>) {
        if !self.check_cooldown(host, actor) {
            return;
        }

        let Some(target) = target else {
            host.send_message(actor, "Usage: pr-review <latest|PR number>");
            return;
        };
        let target = if target.eq_ignore_ascii_case("latest") {
            ReviewTarget::Latest
        } else {
            match target.parse::<u64>() {
                Ok(number) => ReviewTarget::Number(number),
                Err(_) => {
                    host.send_message(actor, &format!("Invalid PR number: {target}"));
                    return;
                }
            }
        };

        host.send_message(actor, "Fetching PR data...");

        let github = self.github();
        let model = Arc::clone(&self.model);
        let settings = get_settings();
        let repository = settings.github.repository.clone();
        let template = settings.prompts.review.clone();
        let max_pages = settings.session.max_book_pages;

        self.submit_command(actor, async move {
            let pr = match target {
                ReviewTarget::Latest => github.latest_pull_request().await?,
                ReviewTarget::Number(number) => github.pull_request(number).await?,
            };
            let diff = github.pull_request_diff(pr.number).await?;

            let pr_data = format!(
                "Title: {}\nAuthor: {}\nDescription: {}\n\nDiff:\n{diff}",
                pr.title, pr.author, pr.body
            );
            let pr_data = tail_truncate(&pr_data, REVIEW_INPUT_LIMIT, REVIEW_INPUT_KEEP);
            let prompt = template.replace("{pr_data}", &pr_data);

            let review = model.complete(&prompt).await?;

            let book = Book {
                title: format!("{} PR #{}", short_repo(&repository), pr.number),
                author: "AI Assistant".to_owned(),
                document: paginate(&format_review(&pr, &review), max_pages),
            };
            Ok(CommandOutput::Book {
                book,
                note: "PR review complete! Check your inventory.".to_owned(),
            })
        });
    }
}

fn format_pr_list(prs: &[PullRequest]) -> String {
    let mut content = String::new();
    content.push_str("OPEN PULL REQUESTS\n");
    content.push_str("==================\n\n");

    for pr in prs {
        content.push_str(&format!(
            "#{}: {}\nAuthor: {}\nBranch: {}\nCreated: {}\n\n",
            pr.number,
            pr.title,
            pr.author,
            pr.branch_display(),
            pr.created_at
        ));
    }

    content.push_str("\nUse pr-review <number> to review a specific PR");
    content
}

fn format_review(pr: &PullRequest, review: &str) -> String {
    format!(
        "PR #{}: {}\nAuthor: {}\nBranch: {}\n---\n\nAI REVIEW:\n\n{review}\n\n---\nURL: {}",
        pr.number,
        pr.title,
        pr.author,
        pr.branch_display(),
        pr.url
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
