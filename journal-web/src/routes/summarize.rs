/// Summaries of selected entries
///
/// `POST /summarize` with repeated `selected` fields. Summaries are shown
/// once and never stored. Upstream failures render a notice on the summary
/// page instead of an error page.

use crate::{
    app::AppState,
    error::{WebError, WebResult},
    middleware::session::CurrentUser,
    routes::parse_ids,
    views::{render, rows, SummaryTemplate},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use journal_shared::{summarize::SummarizeError, JournalError};
use serde::Deserialize;
use tracing::{info, warn};

/// Summarize form; `selected` repeats once per checked entry
#[derive(Debug, Deserialize)]
pub struct SummarizeForm {
    #[serde(default)]
    pub selected: Vec<String>,
}

fn notice_for(err: &SummarizeError) -> &'static str {
    match err {
        SummarizeError::NoEntries => "Select at least one entry to summarize.",
        SummarizeError::NotConfigured => {
            "Summaries are not available: no summarization service is configured."
        }
        SummarizeError::Http(_) | SummarizeError::Status { .. } => {
            "The summarization service is unavailable. Please try again later."
        }
        SummarizeError::Malformed(_) => {
            "The summarization service returned an unexpected answer. Please try again."
        }
    }
}

pub async fn summarize(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    axum_extra::extract::Form(form): axum_extra::extract::Form<SummarizeForm>,
) -> WebResult<Response> {
    let ids = parse_ids(&form.selected);
    let entries = state.entries.select(user.id, &ids).await?;

    let (status, summary, notice) = match state.summarizer.summarize(&entries).await {
        Ok(summary) => {
            info!(user_id = %user.id, entries = entries.len(), "Generated summary");
            (StatusCode::OK, Some(summary), None)
        }
        Err(err) => {
            if !matches!(err, SummarizeError::NoEntries) {
                warn!(user_id = %user.id, error = %err, "Summarization failed");
            }
            let notice = notice_for(&err).to_string();
            // NoEntries -> 400, everything else -> 502
            let status = WebError::from(JournalError::from(err)).status();
            (status, None, Some(notice))
        }
    };

    let page = SummaryTemplate {
        current_user: Some(user.name),
        summary,
        notice,
        entries: rows(&entries),
    };
    Ok((status, render(&page)?).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices() {
        assert!(notice_for(&SummarizeError::NotConfigured).contains("not available"));
        assert!(notice_for(&SummarizeError::NoEntries).contains("at least one"));
        assert!(notice_for(&SummarizeError::Status {
            status: 500,
            body: String::new()
        })
        .contains("unavailable"));
    }
}
