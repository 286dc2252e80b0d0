//! Assistant commands: `ask` and `explain`.

use std::sync::Arc;

use scribe_core::book::paginate;
use scribe_core::ids::ActorId;
use scribe_core::text::{char_len, head_truncate};
use scribe_settings::get_settings;

use super::{CommandOutput, Scribe};
use crate::host::{Book, Host};

/// Replies under this many characters (and without line breaks) go out as a
/// chat line instead of a book.
const CHAT_REPLY_LIMIT: usize = 200;

/// Explain prompts keep at most this many characters of the fetched file.
const EXPLAIN_INPUT_KEEP: usize = 3000;

impl Scribe {
    /// `ask <message>` — chat with the model; short answers come back as
    /// chat, long answers as a book.
    pub fn ask(&self, host: &mut dyn Host, actor: ActorId, args: &[&str]) {
        if !self.check_cooldown(host, actor) {
            return;
        }
        if args.is_empty() {
            host.send_message(actor, "Usage: ask <message>");
            return;
        }
        let message = args.join(" ");

        host.send_message(actor, "Asking AI...");

        let model = Arc::clone(&self.model);
        let max_pages = get_settings().session.max_book_pages;

        self.submit_command(actor, async move {
            let reply = model.chat(&message).await?;

            if char_len(&reply) < CHAT_REPLY_LIMIT && !reply.contains('\n') {
                return Ok(CommandOutput::Lines(vec![format!("AI: {reply}")]));
            }

            let content =
                format!("Your question:\n{message}\n\n---\n\nAI Response:\n{reply}");
            Ok(CommandOutput::Book {
                book: Book {
                    title: "AI Chat".to_owned(),
                    author: "AI Assistant".to_owned(),
                    document: paginate(&content, max_pages),
                },
                note: "AI response received! Check your inventory.".to_owned(),
            })
        });
    }

    /// `explain <path>` — fetch a file from the repository and deliver the
    /// model's explanation alongside the code.
    pub fn explain(&self, host: &mut dyn Host, actor: ActorId, path: Option<&str>) {
        if !self.check_cooldown(host, actor) {
            return;
        }
        let Some(path) = path else {
            host.send_message(actor, "Usage: explain <file path in repo>");
            return;
        };
        let path = path.to_owned();

        host.send_message(actor, "Fetching code from repository...");

        let github = self.github();
        let model = Arc::clone(&self.model);
        let settings = get_settings();
        let template = settings.prompts.explain.clone();
        let max_pages = settings.session.max_book_pages;

        self.submit_command(actor, async move {
            let code = github.file_contents(&path).await?;

            // Head cut: the top of a file (imports, types, entry points) is
            // what an explanation needs most.
            let snippet = head_truncate(&code, EXPLAIN_INPUT_KEEP, EXPLAIN_INPUT_KEEP);
            let prompt = template.replace("{code}", &snippet);
            let explanation = model.complete(&prompt).await?;

            let content = format!(
                "File: {path}\n---\n\nEXPLANATION:\n\n{explanation}\n\n---\n\nCODE:\n{snippet}"
            );
            Ok(CommandOutput::Book {
                book: Book {
                    title: format!("Code: {path}"),
                    author: "AI Assistant".to_owned(),
                    document: paginate(&content, max_pages),
                },
                note: "Code explanation complete! Check your inventory.".to_owned(),
            })
        });
    }
}
