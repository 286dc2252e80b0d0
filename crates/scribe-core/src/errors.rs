//! Error taxonomy for fetch operations.
//!
//! Every failure a command can hit maps onto one of four variants. A rejected
//! cooldown is deliberately *not* an error — the gate returns `bool` and the
//! handler reports the wait synchronously.

use thiserror::Error;

/// Result of one fetch invocation: the normalized value or a single
/// readable failure. Produced once, never partially updated.
pub type FetchOutcome<T> = Result<T, FetchError>;

/// Failure of a background fetch, carried back to the synchronous context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Non-success HTTP status or a network-level failure from a service.
    #[error("{message}")]
    Transport {
        /// HTTP status, when the request got far enough to have one.
        status: Option<u16>,
        /// Readable description, including the status line and any error body.
        message: String,
    },

    /// Response payload missing a required field or failing a shape
    /// expectation.
    #[error("malformed response: {context}")]
    Malformed {
        /// Which field or shape expectation was violated.
        context: String,
    },

    /// A requested entity (PR, issue, board) does not exist.
    #[error("{what} not found")]
    NotFound {
        /// Description of the missing entity.
        what: String,
    },

    /// Failure at the task boundary itself (panic inside a worker).
    #[error("internal error: {message}")]
    Internal {
        /// Readable description of the failure.
        message: String,
    },
}

impl FetchError {
    /// Transport failure with an HTTP status.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Transport failure without a status (connect error, timeout).
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Malformed-payload failure naming the offending field.
    #[must_use]
    pub fn malformed(context: impl Into<String>) -> Self {
        Self::Malformed {
            context: context.into(),
        }
    }

    /// Missing-entity failure.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Task-boundary failure.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
