/// Journal pages
///
/// All handlers run behind the session middleware and act on the signed-in
/// user's entries only. Unknown or foreign entry ids render 404 for single
/// entry pages and are skipped silently by bulk actions.

use crate::{
    app::AppState,
    error::{WebError, WebResult},
    middleware::session::CurrentUser,
    routes::{parse_ids, recoverable},
    views::{render, rows, EntryFormTemplate, IndexTemplate, PastTemplate},
};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use chrono::{NaiveDate, Utc};
use journal_shared::{
    models::{DateRange, EntryChanges, Preset},
    services::entries::RECENT_ENTRIES,
};
use serde::Deserialize;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Home page query
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    /// Set after creating an entry
    pub saved: Option<String>,
}

/// History filter
#[derive(Debug, Default, Deserialize)]
pub struct PastQuery {
    pub preset: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// New/edit entry form
#[derive(Debug, Deserialize)]
pub struct EntryForm {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: String,
}

/// Bulk delete form; `selected` repeats once per checked entry
#[derive(Debug, Deserialize)]
pub struct BulkForm {
    #[serde(default)]
    pub selected: Vec<String>,

    /// Page to return to; relative paths only
    pub next: Option<String>,
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v.trim(), DATE_FORMAT).ok())
}

/// Accepts only same-site relative paths
pub(crate) fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}

fn parse_entry_id(id: &str) -> WebResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| WebError::NotFound("Entry not found".to_string()))
}

pub async fn index(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<IndexQuery>,
) -> WebResult<Response> {
    let entries = state.entries.recent(user.id, RECENT_ENTRIES).await?;

    let page = IndexTemplate {
        current_user: Some(user.name),
        entries: rows(&entries),
        saved: query.saved.is_some(),
    };
    Ok(render(&page)?.into_response())
}

pub async fn past(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<PastQuery>,
) -> WebResult<Response> {
    let preset = query
        .preset
        .as_deref()
        .and_then(|p| p.parse::<Preset>().ok())
        .unwrap_or(Preset::All);
    let start = parse_date(query.start.as_deref());
    let end = parse_date(query.end.as_deref());

    let range = match preset {
        Preset::Week | Preset::Month | Preset::Year => DateRange::preset(preset, Utc::now()),
        Preset::All | Preset::Custom => DateRange::between(start, end),
    };
    let entries = state.entries.list(user.id, &range).await?;

    let start = start.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default();
    let end = end.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default();
    let next = format!("/past?preset={}&start={}&end={}", preset.as_str(), start, end);

    let page = PastTemplate {
        current_user: Some(user.name),
        entries: rows(&entries),
        preset: preset.as_str(),
        start,
        end,
        next,
    };
    Ok(render(&page)?.into_response())
}

pub async fn new_page(Extension(CurrentUser(user)): Extension<CurrentUser>) -> WebResult<Response> {
    let page = EntryFormTemplate {
        current_user: Some(user.name),
        heading: "New entry",
        action: "/new".to_string(),
        title: String::new(),
        content: String::new(),
        error: None,
    };
    Ok(render(&page)?.into_response())
}

pub async fn new_submit(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<EntryForm>,
) -> WebResult<Response> {
    match state.entries.create(user.id, &form.title, &form.content).await {
        Ok(_) => Ok(Redirect::to("/?saved=1").into_response()),
        Err(err) => {
            let (status, message) = recoverable(err)?;
            let page = EntryFormTemplate {
                current_user: Some(user.name),
                heading: "New entry",
                action: "/new".to_string(),
                title: form.title,
                content: form.content,
                error: Some(message),
            };
            Ok((status, render(&page)?).into_response())
        }
    }
}

pub async fn edit_page(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> WebResult<Response> {
    let entry = state.entries.get(user.id, parse_entry_id(&id)?).await?;

    let page = EntryFormTemplate {
        current_user: Some(user.name),
        heading: "Edit entry",
        action: format!("/edit/{}", entry.id),
        title: entry.title,
        content: entry.content,
        error: None,
    };
    Ok(render(&page)?.into_response())
}

pub async fn edit_submit(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Form(form): Form<EntryForm>,
) -> WebResult<Response> {
    let entry_id = parse_entry_id(&id)?;
    let changes = EntryChanges {
        title: Some(form.title.clone()),
        content: Some(form.content.clone()),
    };

    match state.entries.update(user.id, entry_id, changes).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(err) => {
            let (status, message) = recoverable(err)?;
            let page = EntryFormTemplate {
                current_user: Some(user.name),
                heading: "Edit entry",
                action: format!("/edit/{}", entry_id),
                title: form.title,
                content: form.content,
                error: Some(message),
            };
            Ok((status, render(&page)?).into_response())
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> WebResult<Redirect> {
    if let Ok(entry_id) = Uuid::parse_str(&id) {
        state.entries.delete(user.id, entry_id).await?;
    }
    Ok(Redirect::to("/"))
}

pub async fn delete_bulk(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    axum_extra::extract::Form(form): axum_extra::extract::Form<BulkForm>,
) -> WebResult<Redirect> {
    let ids = parse_ids(&form.selected);
    if !ids.is_empty() {
        state.entries.delete_bulk(user.id, &ids).await?;
    }
    Ok(Redirect::to(safe_next(form.next.as_deref())))
}
