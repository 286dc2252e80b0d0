//! Repository commands: `repo` (show) and `repo <ref>` (set).
//!
//! Setting the repository updates the settings singleton and rebuilds the
//! source-control clients; both commands are synchronous (no fetch, no
//! cooldown).

use std::sync::LazyLock;

use regex::Regex;
use scribe_core::ids::ActorId;
use scribe_settings::{get_settings, init_settings};
use tracing::info;

use super::Scribe;
use crate::host::Host;

/// Matches a repository web URL (`https://github.com/owner/repo`, with or
/// without scheme, `.git` suffix, or extra path segments).
static REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com[/:]([^/]+)/([^/.]+)").expect("valid repo URL pattern")
});

/// Matches the bare `owner/repo` form.
static OWNER_REPO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^/]+)/([^/]+)$").expect("valid owner/repo pattern"));

/// Parse a repository reference from either a web URL or `owner/repo`.
pub fn parse_repo_ref(input: &str) -> Option<(String, String)> {
    let captures = REPO_URL
        .captures(input)
        .or_else(|| OWNER_REPO.captures(input))?;
    Some((captures[1].to_owned(), captures[2].to_owned()))
}

impl Scribe {
    /// `repo <owner/repo | url>` — switch the active repository.
    pub fn repo_set(&self, host: &mut dyn Host, actor: ActorId, input: &str) {
        let Some((owner, repo)) = parse_repo_ref(input) else {
            host.send_message(actor, "Invalid format! Use 'owner/repo' or a repository URL");
            return;
        };
        let repository = format!("{owner}/{repo}");

        let mut settings = (*get_settings()).clone();
        settings.github.repository.clone_from(&repository);
        init_settings(settings);
        self.rebuild_github_clients();
        info!(%repository, "repository changed");

        host.send_message(actor, &format!("✓ Repository changed to: {repository}"));
        host.send_message(actor, "You can now use pr-list and board-list with this repo!");
    }

    /// `repo` — show the active repository.
    pub fn repo_show(&self, host: &mut dyn Host, actor: ActorId) {
        let settings = get_settings();
        let repository = if settings.github.repository.is_empty() {
            "Not set".to_owned()
        } else {
            settings.github.repository.clone()
        };

        host.send_message(actor, "Current repository:");
        host.send_message(actor, &format!("  {repository}"));
        host.send_message(actor, &format!("  https://github.com/{repository}"));
        host.send_message(actor, "Use repo <owner/repo> to change it");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_owner_repo() {
        assert_eq!(
            parse_repo_ref("octo/repo"),
            Some(("octo".to_owned(), "repo".to_owned()))
        );
    }

    #[test]
    fn parses_https_url() {
        assert_eq!(
            parse_repo_ref("https://github.com/vllm-project/vllm"),
            Some(("vllm-project".to_owned(), "vllm".to_owned()))
        );
    }

    #[test]
    fn parses_git_ssh_form() {
        assert_eq!(
            parse_repo_ref("git@github.com:octo/repo"),
            Some(("octo".to_owned(), "repo".to_owned()))
        );
    }

    #[test]
    fn url_with_git_suffix_drops_it() {
        assert_eq!(
            parse_repo_ref("https://github.com/octo/repo.git"),
            Some(("octo".to_owned(), "repo".to_owned()))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_repo_ref("not a repo"), None);
        assert_eq!(parse_repo_ref("too/many/parts"), None);
    }
}
