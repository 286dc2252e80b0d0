//! Command handlers.
//!
//! Every fetching handler follows the same linear pass: parse args, check
//! the cooldown gate synchronously, send a progress line, submit the fetch
//! work, and let the delivery queue hand the formatted result (or a single
//! `Error:` line) back to the host. Formatting and pagination happen inside
//! the worker; the host thread only ever executes deliveries.

mod ai;
mod board;
mod issue;
mod pr;
mod repo;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use scribe_clients::{
    GithubClient, GithubConfig, JiraClient, JiraConfig, ModelClient, ModelConfig, ProjectsClient,
    ProjectsConfig,
};
use scribe_core::cooldown::{CooldownGate, unix_millis};
use scribe_core::errors::FetchOutcome;
use scribe_core::ids::ActorId;
use scribe_settings::{ScribeSettings, get_settings};
use tracing::{error, info};

use crate::dispatch::Dispatcher;
use crate::host::{Book, Host};

/// What a completed fetch hands back for delivery.
pub enum CommandOutput {
    /// Plain chat lines.
    Lines(Vec<String>),
    /// A book plus the chat line announcing it.
    Book {
        /// The book to put in the actor's inventory.
        book: Book,
        /// Completion message shown alongside.
        note: String,
    },
}

/// The command engine: cooldown gate, service clients, and dispatcher.
///
/// One instance serves every actor in the session. The source-control
/// clients sit behind a lock so `repo set` can swap them for a new
/// repository without tearing down the engine.
pub struct Scribe {
    gate: CooldownGate,
    dispatcher: Dispatcher,
    github: RwLock<Arc<GithubClient>>,
    projects: RwLock<Arc<ProjectsClient>>,
    jira: Arc<JiraClient>,
    model: Arc<ModelClient>,
}

impl Scribe {
    /// Build the engine and its service clients from the current settings.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        let settings = get_settings();
        let (github, projects) = build_github_clients(&settings);

        let jira = JiraClient::new(JiraConfig {
            url: settings.jira.url.clone(),
            email: settings.jira.email.clone(),
            api_token: settings.jira.api_token.clone(),
            project_key: settings.jira.project_key.clone(),
        });

        let model = ModelClient::new(ModelConfig {
            url: settings.model.url.clone(),
            model: settings.model.model.clone(),
            max_tokens: settings.model.max_tokens,
            temperature: settings.model.temperature,
            timeout: Duration::from_secs(settings.model.timeout_secs),
        });

        Self {
            gate: CooldownGate::new(),
            dispatcher,
            github: RwLock::new(Arc::new(github)),
            projects: RwLock::new(Arc::new(projects)),
            jira: Arc::new(jira),
            model: Arc::new(model),
        }
    }

    /// Route one command invocation.
    ///
    /// `command` is the bare command name; `args` its whitespace-split
    /// arguments. Unknown commands print the help text.
    pub fn handle(&self, host: &mut dyn Host, actor: ActorId, command: &str, args: &[&str]) {
        match command {
            "pr-list" | "prs" => self.pr_list(host, actor),
            "pr-review" | "review" => self.pr_review(host, actor, args.first().copied()),
            "board-list" | "boards" => self.board_list(host, actor),
            "board-view" | "board" => self.board_view(host, actor, args.first().copied()),
            "ask" => self.ask(host, actor, args),
            "explain" => self.explain(host, actor, args.first().copied()),
            "issue-create" => self.issue_create(host, actor, args),
            "issue-view" => self.issue_view(host, actor, args.first().copied()),
            "issue-list" => self.issue_list(host, actor, args.first().copied()),
            "repo" => match args.first() {
                Some(_) => self.repo_set(host, actor, &args.join(" ")),
                None => self.repo_show(host, actor),
            },
            _ => Self::help(host, actor),
        }
    }

    /// Print the command overview.
    pub fn help(host: &mut dyn Host, actor: ActorId) {
        host.send_message(actor, "Commands:");
        host.send_message(actor, "  repo [owner/repo] - show or change the repository");
        host.send_message(actor, "  pr-list - list open pull requests");
        host.send_message(actor, "  pr-review <latest|#> - review a pull request");
        host.send_message(actor, "  board-list - list project boards");
        host.send_message(actor, "  board-view [#] - view a project board");
        host.send_message(actor, "  ask <message> - ask the assistant");
        host.send_message(actor, "  explain <path> - explain a file from the repository");
        host.send_message(actor, "  issue-create <type> <summary> [| description]");
        host.send_message(actor, "  issue-view <key> / issue-list [mine|bugs|all]");
    }

    /// Swap the source-control clients for the currently configured
    /// repository. Called after `repo set` updates the settings.
    pub fn rebuild_github_clients(&self) {
        let settings = get_settings();
        let (github, projects) = build_github_clients(&settings);
        *self.github.write() = Arc::new(github);
        *self.projects.write() = Arc::new(projects);
        info!(repository = %settings.github.repository, "source-control clients rebuilt");
    }

    // ── shared helpers ───────────────────────────────────────────────────

    /// Gate check; on rejection tells the actor how long to wait and
    /// schedules nothing.
    fn check_cooldown(&self, host: &mut dyn Host, actor: ActorId) -> bool {
        let window = get_settings().session.command_cooldown_secs;
        if self.gate.try_acquire(actor, window, unix_millis()) {
            return true;
        }
        host.send_message(
            actor,
            &format!("Please wait {window} seconds between commands!"),
        );
        false
    }

    /// Submit fetch work whose output is delivered with [`deliver`].
    fn submit_command<W>(&self, actor: ActorId, work: W)
    where
        W: Future<Output = FetchOutcome<CommandOutput>> + Send + 'static,
    {
        self.dispatcher
            .submit(actor, work, move |host, outcome| deliver(host, actor, outcome));
    }

    fn github(&self) -> Arc<GithubClient> {
        Arc::clone(&self.github.read())
    }

    fn projects(&self) -> Arc<ProjectsClient> {
        Arc::clone(&self.projects.read())
    }
}

/// Hand one finished invocation to the host.
fn deliver(host: &mut dyn Host, actor: ActorId, outcome: FetchOutcome<CommandOutput>) {
    match outcome {
        Ok(CommandOutput::Lines(lines)) => {
            for line in lines {
                host.send_message(actor, &line);
            }
        }
        Ok(CommandOutput::Book { book, note }) => {
            host.give_book(actor, book);
            host.send_message(actor, &note);
        }
        Err(error) => {
            error!(%actor, %error, "command failed");
            host.send_message(actor, &format!("Error: {error}"));
        }
    }
}

fn build_github_clients(settings: &ScribeSettings) -> (GithubClient, ProjectsClient) {
    let repository = settings.github.repository.as_str();
    let (owner, repo) = repository.split_once('/').unwrap_or((repository, ""));

    let github = GithubClient::new(GithubConfig {
        token: settings.github.token.clone(),
        repository: repository.to_owned(),
        api_url: settings.github.api_url.clone(),
    });

    let projects = ProjectsClient::new(ProjectsConfig {
        token: settings.github.token.clone(),
        owner: owner.to_owned(),
        repo: repo.to_owned(),
        graphql_url: Some(format!(
            "{}/graphql",
            settings.github.api_url.trim_end_matches('/')
        )),
    });

    (github, projects)
}

/// Repository name without its owner prefix, for short book titles.
fn short_repo(repository: &str) -> &str {
    repository
        .split_once('/')
        .map_or(repository, |(_, name)| name)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use scribe_core::errors::FetchError;

    use super::*;
    use crate::host::testutil::RecordingHost;

    #[test]
    fn short_repo_strips_owner() {
        assert_eq!(short_repo("octo/repo"), "repo");
        assert_eq!(short_repo("just-a-name"), "just-a-name");
    }

    #[test]
    fn deliver_lines() {
        let mut host = RecordingHost::default();
        let actor = ActorId::random();
        deliver(
            &mut host,
            actor,
            Ok(CommandOutput::Lines(vec!["one".into(), "two".into()])),
        );
        assert_eq!(host.messages.len(), 2);
        assert!(host.books.is_empty());
    }

    #[test]
    fn deliver_book_sends_note_too() {
        let mut host = RecordingHost::default();
        let actor = ActorId::random();
        deliver(
            &mut host,
            actor,
            Ok(CommandOutput::Book {
                book: Book {
                    title: "PRs: octo/repo".into(),
                    author: "GitHub".into(),
                    document: scribe_core::book::paginate("content", 5),
                },
                note: "Done!".into(),
            }),
        );
        assert_eq!(host.books.len(), 1);
        assert_eq!(host.messages, vec![(actor, "Done!".to_owned())]);
    }

    #[test]
    fn deliver_failure_is_one_readable_line() {
        let mut host = RecordingHost::default();
        let actor = ActorId::random();
        deliver(
            &mut host,
            actor,
            Err(FetchError::status(502, "Failed to fetch PR: 502 Bad Gateway")),
        );
        assert_eq!(
            host.messages,
            vec![(actor, "Error: Failed to fetch PR: 502 Bad Gateway".to_owned())]
        );
        assert!(host.books.is_empty());
    }
}
