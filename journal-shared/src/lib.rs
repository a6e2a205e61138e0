//! # Journal Shared Library
//!
//! Domain types, persistence and business logic for the journal web app.
//!
//! ## Module Organization
//!
//! - `models`: Users, entries, reset tokens and date ranges
//! - `auth`: Password hashing, session tokens, reset token generation
//! - `store`: Storage trait with flat-file and PostgreSQL backends
//! - `db`: PostgreSQL pool and migrations
//! - `services`: Account and entry operations
//! - `summarize`: LLM summarization client
//! - `error`: Domain error type

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod summarize;

pub use error::{JournalError, JournalResult};

/// Current version of the journal shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
