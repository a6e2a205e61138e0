//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - A router over a flat-file store in a temporary directory
//! - A stub summarizer that records what it was asked to summarize
//! - Form, cookie and body helpers for driving the router

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use journal_shared::{
    models::{Entry, User},
    summarize::{Sentiment, SummarizeError, Summarizer, Summary},
};
use journal_web::{
    app::{build_router, AppState},
    config::Config,
};
use std::{
    io,
    sync::{Arc, Mutex},
};
use tempfile::TempDir;
use tower::Service as _;
use tracing::{subscriber::DefaultGuard, Level};

pub const PASSWORD: &str = "Quiet#Morning7";

/// Summarizer double returning a fixed summary
#[derive(Default)]
pub struct StubSummarizer {
    /// Titles of the entries seen by the last call
    pub seen: Mutex<Vec<String>>,
}

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize(&self, entries: &[Entry]) -> Result<Summary, SummarizeError> {
        if entries.is_empty() {
            return Err(SummarizeError::NoEntries);
        }
        if let Ok(mut seen) = self.seen.lock() {
            *seen = entries.iter().map(|e| e.title.clone()).collect();
        }

        Ok(Summary {
            summary: format!("A calm stretch across {} entries.", entries.len()),
            sentiment: Sentiment::Positive,
            insights: vec!["Walks help".to_string()],
        })
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    _dir: TempDir,
    pub app: Router,
    pub state: AppState,
}

impl TestContext {
    /// Creates a context with a [`StubSummarizer`]
    pub async fn new() -> Self {
        Self::with_summarizer(Arc::new(StubSummarizer::default())).await
    }

    pub async fn with_summarizer(summarizer: Arc<dyn Summarizer>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_string_lossy().to_string();

        let config = Config::from_vars(|key| match key {
            "SESSION_SECRET" => Some("test-secret-key-at-least-32-bytes-long".to_string()),
            "STORAGE_MODE" => Some("files".to_string()),
            "DATA_DIR" => Some(data_dir.clone()),
            _ => None,
        })
        .unwrap();

        let store = config.storage.open().await.unwrap();
        let state = AppState::new(store, summarizer, config);
        let app = build_router(state.clone());

        TestContext {
            _dir: dir,
            app,
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().call(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form_body(fields))).unwrap())
            .await
    }

    /// Registers an account and returns its session cookie
    pub async fn register(&self, email: &str, name: &str) -> String {
        let response = self
            .post_form(
                "/register",
                &[
                    ("email", email),
                    ("password", PASSWORD),
                    ("confirm_password", PASSWORD),
                    ("name", name),
                ],
                None,
            )
            .await;

        session_cookie(&response).expect("registration should set a session cookie")
    }

    pub async fn user(&self, email: &str) -> User {
        self.state
            .store
            .find_user_by_email(email)
            .await
            .unwrap()
            .unwrap()
    }
}

/// Percent-encodes form fields
pub fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

/// `name=value` of the session cookie set by `response`, if any
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| v.starts_with("journal_session="))
        .filter_map(|v| v.split(';').next())
        .map(str::to_string)
        .find(|pair| pair.len() > "journal_session=".len())
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

/// Log output captured by [`capture_logs`]
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Records events up to `level` on the current thread until the guard drops
pub fn capture_logs(level: Level) -> (DefaultGuard, LogBuffer) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    (tracing::subscriber::set_default(subscriber), buffer)
}
