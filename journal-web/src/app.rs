/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use journal_web::{app::AppState, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let store = config.storage.open().await?;
/// let summarizer = journal_web::app::summarizer_from_config(&config)?;
/// let state = AppState::new(store, summarizer, config);
/// let app = journal_web::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{security::SecurityHeadersLayer, session::require_session},
    routes,
};
use axum::{
    routing::{get, post},
    Router,
};
use journal_shared::{
    services::{AuthService, EntryService},
    store::JournalStore,
    summarize::{ChatCompletionsSummarizer, DisabledSummarizer, Summarizer},
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub store: Arc<dyn JournalStore>,

    /// Account operations
    pub auth: AuthService,

    /// Entry operations
    pub entries: EntryService,

    /// Summarization client
    pub summarizer: Arc<dyn Summarizer>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn JournalStore>, summarizer: Arc<dyn Summarizer>, config: Config) -> Self {
        Self {
            auth: AuthService::new(store.clone()),
            entries: EntryService::new(store.clone()),
            store,
            summarizer,
            config: Arc::new(config),
        }
    }

    /// Gets the session signing secret
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Picks the summarizer for `config`: a live client, or one that always
/// answers `NotConfigured`
pub fn summarizer_from_config(config: &Config) -> anyhow::Result<Arc<dyn Summarizer>> {
    match &config.llm {
        Some(llm) => {
            info!(endpoint = %llm.endpoint, model = %llm.model, "Summarization enabled");
            Ok(Arc::new(ChatCompletionsSummarizer::new(llm.clone())?))
        }
        None => {
            info!("Summarization disabled: no LLM endpoint configured");
            Ok(Arc::new(DisabledSummarizer))
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health              # Health check (public, JSON)
/// ├── GET|POST /login           # Public account pages
/// ├── GET|POST /register
/// ├── GET|POST /forgot
/// ├── GET|POST /reset
/// ├── GET  /logout
/// └── (session required)
///     ├── GET  /                # Quick entry + recent entries
///     ├── GET  /past            # Filtered history
///     ├── GET|POST /new
///     ├── GET|POST /edit/:id
///     ├── POST /delete/:id
///     ├── POST /delete_bulk
///     └── POST /summarize
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. Compression
/// 3. Logging (tower-http TraceLayer)
/// 4. Session check (protected routes only)
pub fn build_router(state: AppState) -> Router {
    // Health check (public, no session)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Account pages (public)
    let auth_routes = Router::new()
        .route(
            "/login",
            get(routes::auth::login_page).post(routes::auth::login_submit),
        )
        .route(
            "/register",
            get(routes::auth::register_page).post(routes::auth::register_submit),
        )
        .route(
            "/forgot",
            get(routes::auth::forgot_page).post(routes::auth::forgot_submit),
        )
        .route(
            "/reset",
            get(routes::auth::reset_page).post(routes::auth::reset_submit),
        )
        .route("/logout", get(routes::auth::logout));

    // Journal pages (require a session)
    let journal_routes = Router::new()
        .route("/", get(routes::entries::index))
        .route("/past", get(routes::entries::past))
        .route(
            "/new",
            get(routes::entries::new_page).post(routes::entries::new_submit),
        )
        .route(
            "/edit/:id",
            get(routes::entries::edit_page).post(routes::entries::edit_submit),
        )
        .route("/delete/:id", post(routes::entries::delete))
        .route("/delete_bulk", post(routes::entries::delete_bulk))
        .route("/summarize", post(routes::summarize::summarize))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .merge(health_routes)
        .merge(auth_routes)
        .merge(journal_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(SecurityHeadersLayer::new(state.config.server.production))
        .with_state(state)
}
