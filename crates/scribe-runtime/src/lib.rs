//! # scribe-runtime
//!
//! Command handlers and async fetch coordination for Scribe.
//!
//! - **Host**: the trait through which the synchronous context is reached
//! - **Dispatcher / `DeliveryQueue`**: run fetch work on the tokio worker
//!   pool, hand results back on the host's own tick
//! - **Commands**: one handler per user command, gluing
//!   gate → fetch → normalize → format → paginate → deliver
//!
//! ## Crate Position
//!
//! Aggregation layer. Depends on: scribe-core, scribe-clients,
//! scribe-settings. The hosting runtime embeds this crate.

#![deny(unsafe_code)]

pub mod commands;
pub mod dispatch;
pub mod host;

pub use commands::{CommandOutput, Scribe};
pub use dispatch::{Dispatcher, DeliveryQueue};
pub use host::{Book, Host};
