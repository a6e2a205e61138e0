/// Askama page templates
///
/// Every page extends `base.html`, which reads `current_user` for the
/// navigation bar. Templates live in `journal-web/templates/` and are
/// compiled into the binary; askama escapes all interpolated text.

use askama::Template;
use axum::response::Html;
use journal_shared::{models::Entry, summarize::Summary};

use crate::error::WebResult;

/// Renders a template into an HTML body
pub fn render<T: Template>(template: &T) -> WebResult<Html<String>> {
    Ok(Html(template.render()?))
}

/// Entry prepared for display
pub struct EntryRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub display_time: String,
}

impl From<&Entry> for EntryRow {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id.to_string(),
            title: entry.title.clone(),
            content: entry.content.clone(),
            display_time: entry.display_time(),
        }
    }
}

pub fn rows(entries: &[Entry]) -> Vec<EntryRow> {
    entries.iter().map(EntryRow::from).collect()
}

/// Home page: quick entry form and recent entries
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub current_user: Option<String>,
    pub entries: Vec<EntryRow>,
    pub saved: bool,
}

/// Filtered history
#[derive(Template)]
#[template(path = "past.html")]
pub struct PastTemplate {
    pub current_user: Option<String>,
    pub entries: Vec<EntryRow>,
    pub preset: &'static str,
    pub start: String,
    pub end: String,
    /// Where bulk actions return to
    pub next: String,
}

/// New and edit share one form
#[derive(Template)]
#[template(path = "entry_form.html")]
pub struct EntryFormTemplate {
    pub current_user: Option<String>,
    pub heading: &'static str,
    pub action: String,
    pub title: String,
    pub content: String,
    pub error: Option<String>,
}

/// Summary result, or a notice when summarization failed
#[derive(Template)]
#[template(path = "summary.html")]
pub struct SummaryTemplate {
    pub current_user: Option<String>,
    pub summary: Option<Summary>,
    pub notice: Option<String>,
    pub entries: Vec<EntryRow>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub current_user: Option<String>,
    pub email: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<String>,
    pub email: String,
    pub name: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "forgot.html")]
pub struct ForgotTemplate {
    pub current_user: Option<String>,
    pub sent: bool,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "reset.html")]
pub struct ResetTemplate {
    pub current_user: Option<String>,
    pub token: String,
    pub error: Option<String>,
}

/// Error page rendered by [`crate::error::WebError`]
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub current_user: Option<String>,
    pub status: u16,
    pub title: String,
    pub message: String,
}
