//! jules-sync - resumable access to Jules session activity logs.
//!
//! The API exposes each session's activities as a forward-only, cursor
//! paginated, append-only stream. This crate layers on top of it:
//!
//! - a retrying transport ([`api::transport`]) that backs off on 429/503,
//! - bounded filtered reads ([`sync::fetch_filtered`]),
//! - tail location without a reverse cursor ([`sync::latest`]),
//! - incremental polling from a caller-held cursor ([`sync::poll`]),
//! - a blocking wait for a matching activity ([`sync::wait_for`]).

pub mod api;
pub mod app;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod sync;
pub mod test_utils;

pub use error::{JulesError, Result};
