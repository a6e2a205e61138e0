/// Route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Login, registration, password reset, logout
/// - `entries`: Home page, history, create/edit/delete
/// - `summarize`: Summaries of selected entries

pub mod auth;
pub mod entries;
pub mod health;
pub mod summarize;

use axum::http::StatusCode;
use journal_shared::JournalError;
use uuid::Uuid;

use crate::error::WebError;

/// Splits errors a form can show inline from ones that need an error page
pub(crate) fn recoverable(err: JournalError) -> Result<(StatusCode, String), WebError> {
    match err {
        JournalError::Validation(_)
        | JournalError::DuplicateEmail
        | JournalError::InvalidCredentials
        | JournalError::TokenInvalid
        | JournalError::TokenExpired => {
            let message = err.to_string();
            Ok((WebError::from(err).status(), message))
        }
        other => Err(other.into()),
    }
}

/// Parses repeated `selected` form values; malformed ids are dropped
pub(crate) fn parse_ids(values: &[String]) -> Vec<Uuid> {
    values
        .iter()
        .filter_map(|v| Uuid::parse_str(v.trim()).ok())
        .collect()
}
