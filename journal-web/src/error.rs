/// Error handling for the web server
///
/// This module provides a unified error type that maps to HTML error pages.
/// Handlers return `Result<T, WebError>`; domain errors convert with `?`.
///
/// # Status mapping
///
/// | Domain error | Status |
/// |---|---|
/// | `Validation`, `TokenInvalid`, `TokenExpired` | 400 |
/// | `InvalidCredentials` | 401 |
/// | `NotFound` | 404 |
/// | `DuplicateEmail` | 409 |
/// | `Upstream` | 502 |
/// | storage / hashing failures | 500 |

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use journal_shared::JournalError;
use std::fmt;

use crate::views::ErrorTemplate;

/// Web result type alias
pub type WebResult<T> = Result<T, WebError>;

/// Unified web error type
#[derive(Debug)]
pub enum WebError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate email
    Conflict(String),

    /// Bad gateway (502) - summarization endpoint failed
    Upstream(String),

    /// Internal server error (500)
    InternalError(String),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Conflict(_) => StatusCode::CONFLICT,
            WebError::Upstream(_) => StatusCode::BAD_GATEWAY,
            WebError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the user
    fn public_message(&self) -> String {
        match self {
            WebError::BadRequest(msg)
            | WebError::Unauthorized(msg)
            | WebError::NotFound(msg)
            | WebError::Conflict(msg) => msg.clone(),
            WebError::Upstream(_) => {
                "The summarization service is unavailable. Please try again later.".to_string()
            }
            WebError::InternalError(_) => "An internal error occurred".to_string(),
        }
    }
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            WebError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            WebError::NotFound(msg) => write!(f, "Not found: {}", msg),
            WebError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            WebError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            WebError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for WebError {}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            // Log internal errors but don't expose details to clients
            WebError::InternalError(msg) => tracing::error!("Internal error: {}", msg),
            WebError::Upstream(msg) => tracing::warn!("Upstream error: {}", msg),
            _ => tracing::debug!(status = status.as_u16(), "{}", self),
        }

        let page = ErrorTemplate {
            current_user: None,
            status: status.as_u16(),
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.public_message(),
        };

        match askama::Template::render(&page) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Error page failed to render: {}", e);
                (status, page.message).into_response()
            }
        }
    }
}

/// Convert domain errors to web errors
impl From<JournalError> for WebError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::DuplicateEmail => WebError::Conflict(err.to_string()),
            JournalError::InvalidCredentials => WebError::Unauthorized(err.to_string()),
            JournalError::TokenInvalid | JournalError::TokenExpired => {
                WebError::BadRequest(err.to_string())
            }
            JournalError::NotFound => WebError::NotFound(err.to_string()),
            JournalError::Upstream(msg) => WebError::Upstream(msg),
            JournalError::Validation(msg) => WebError::BadRequest(msg),
            JournalError::Storage(e) => WebError::InternalError(format!("Storage error: {}", e)),
            JournalError::Password(e) => {
                WebError::InternalError(format!("Password operation failed: {}", e))
            }
        }
    }
}

/// Convert template errors to web errors
impl From<askama::Error> for WebError {
    fn from(err: askama::Error) -> Self {
        WebError::InternalError(format!("Template error: {}", err))
    }
}

/// Convert session token errors to web errors
impl From<journal_shared::auth::session::SessionError> for WebError {
    fn from(err: journal_shared::auth::session::SessionError) -> Self {
        WebError::InternalError(format!("Session error: {}", err))
    }
}
