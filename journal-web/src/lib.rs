//! # Journal Web Server Library
//!
//! Server-rendered journaling app: accounts, entries, date filters and
//! LLM summaries of selected entries.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTML error pages
//! - `middleware`: Security headers and cookie sessions
//! - `routes`: Page handlers
//! - `views`: Askama templates

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod views;
