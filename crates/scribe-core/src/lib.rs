//! # scribe-core
//!
//! Foundation types, errors, branded IDs, and utilities for Scribe.
//!
//! This crate provides the shared vocabulary that all other Scribe crates
//! depend on:
//!
//! - **Branded IDs**: [`ids::ActorId`] as a newtype over a session UUID
//! - **Records**: [`records::PullRequest`], [`records::Issue`],
//!   [`records::ProjectBoard`] — the canonical forms of external entities
//! - **Errors**: [`errors::FetchError`] taxonomy via `thiserror`
//! - **Books**: [`book::paginate`] — the deterministic page splitter
//! - **Cooldown**: [`cooldown::CooldownGate`] per-actor rate limiting
//! - **Text**: [`text`] — char-safe truncation for prompt assembly
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other scribe crates.

#![deny(unsafe_code)]

pub mod book;
pub mod cooldown;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod records;
pub mod text;
