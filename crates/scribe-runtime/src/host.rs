//! The synchronous context's visible surface.
//!
//! The hosting runtime owns a single-threaded loop with all user-visible
//! session state. Scribe never touches that state directly: command handlers
//! and the delivery queue act on it only through [`Host`], and only from the
//! host's own thread.

use scribe_core::book::Document;
use scribe_core::ids::ActorId;

/// A written book ready to hand to an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Cover title.
    pub title: String,
    /// Displayed author.
    pub author: String,
    /// Paginated contents.
    pub document: Document,
}

/// Operations the hosting runtime exposes to Scribe.
///
/// Implementations are not required to be thread-safe; every call happens on
/// the synchronous context (command handlers run there, and queued
/// deliveries are executed by [`crate::dispatch::DeliveryQueue::drain`],
/// which the host calls from its own tick).
pub trait Host {
    /// Show a single chat line to an actor.
    fn send_message(&mut self, actor: ActorId, message: &str);

    /// Put a book into an actor's inventory.
    fn give_book(&mut self, actor: ActorId, book: Book);
}
