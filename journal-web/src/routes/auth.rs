/// Account pages
///
/// # Endpoints
///
/// - `GET|POST /login` - Sign in, sets the session cookie
/// - `GET|POST /register` - Create an account and sign in
/// - `GET|POST /forgot` - Request a password reset link
/// - `GET|POST /reset?token=...` - Choose a new password
/// - `GET /logout` - Drop the session cookie
///
/// Reset links are written to the log at DEBUG; there is no email delivery.

use crate::{
    app::AppState,
    error::WebResult,
    middleware::session::{clear_session, session_cookie, session_user},
    routes::recoverable,
    views::{render, ForgotTemplate, LoginTemplate, RegisterTemplate, ResetTemplate},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use chrono::Duration;
use journal_shared::{auth::session, models::User};
use serde::Deserialize;
use tracing::{debug, info};

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,
}

/// Login page query
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// Set after a successful password reset
    pub reset: Option<String>,
}

/// Registration form
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,

    /// Must match `password` when present
    pub confirm_password: Option<String>,

    /// Optional display name
    #[serde(default)]
    pub name: String,
}

/// Forgot-password form
#[derive(Debug, Deserialize)]
pub struct ForgotForm {
    #[serde(default)]
    pub email: String,
}

/// Reset page query
#[derive(Debug, Default, Deserialize)]
pub struct ResetQuery {
    pub token: Option<String>,
}

/// Reset form
#[derive(Debug, Deserialize)]
pub struct ResetForm {
    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub password: String,

    pub confirm_password: Option<String>,
}

const PASSWORD_MISMATCH: &str = "Passwords do not match";

/// Issues a session cookie for `user` and sends them home
fn sign_in(state: &AppState, jar: CookieJar, user: &User) -> WebResult<Response> {
    let token = session::issue_session_token(
        user.id,
        state.session_secret(),
        Duration::hours(state.config.session.ttl_hours),
    )?;
    let jar = jar.add(session_cookie(token, state.config.server.production));

    Ok((jar, Redirect::to("/")).into_response())
}

pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> WebResult<Response> {
    if session_user(&state, &jar).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let page = LoginTemplate {
        current_user: None,
        email: String::new(),
        error: None,
        notice: query
            .reset
            .map(|_| "Your password has been updated. Please log in.".to_string()),
    };
    Ok(render(&page)?.into_response())
}

pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> WebResult<Response> {
    match state.auth.authenticate(&form.email, &form.password).await {
        Ok(user) => sign_in(&state, jar, &user),
        Err(err) => {
            let (status, message) = recoverable(err)?;
            let page = LoginTemplate {
                current_user: None,
                email: form.email.trim().to_string(),
                error: Some(message),
                notice: None,
            };
            Ok((status, render(&page)?).into_response())
        }
    }
}

pub async fn register_page(State(state): State<AppState>, jar: CookieJar) -> WebResult<Response> {
    if session_user(&state, &jar).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let page = RegisterTemplate {
        current_user: None,
        email: String::new(),
        name: String::new(),
        error: None,
    };
    Ok(render(&page)?.into_response())
}

pub async fn register_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> WebResult<Response> {
    let result = match form.confirm_password.as_deref() {
        Some(confirm) if confirm != form.password => {
            Err((StatusCode::BAD_REQUEST, PASSWORD_MISMATCH.to_string()))
        }
        _ => match state
            .auth
            .register(&form.email, &form.password, &form.name)
            .await
        {
            Ok(user) => Ok(user),
            Err(err) => Err(recoverable(err)?),
        },
    };

    match result {
        Ok(user) => sign_in(&state, jar, &user),
        Err((status, message)) => {
            let page = RegisterTemplate {
                current_user: None,
                email: form.email.trim().to_string(),
                name: form.name.trim().to_string(),
                error: Some(message),
            };
            Ok((status, render(&page)?).into_response())
        }
    }
}

pub async fn forgot_page() -> WebResult<Response> {
    let page = ForgotTemplate {
        current_user: None,
        sent: false,
        error: None,
    };
    Ok(render(&page)?.into_response())
}

/// Always answers the same way, whether or not the email is registered
pub async fn forgot_submit(
    State(state): State<AppState>,
    Form(form): Form<ForgotForm>,
) -> WebResult<Response> {
    if form.email.trim().is_empty() {
        let page = ForgotTemplate {
            current_user: None,
            sent: false,
            error: Some("Please enter your email address".to_string()),
        };
        return Ok((StatusCode::BAD_REQUEST, render(&page)?).into_response());
    }

    if let Some(issued) = state.auth.request_reset(&form.email).await? {
        info!(
            user_id = %issued.user_id,
            expires_at = %issued.expires_at,
            "Password reset link issued"
        );
        // Stands in for email delivery; the link carries the secret token
        debug!(
            user_id = %issued.user_id,
            reset_link = %state.config.reset_link(&issued.token),
            "Password reset link"
        );
    }

    let page = ForgotTemplate {
        current_user: None,
        sent: true,
        error: None,
    };
    Ok(render(&page)?.into_response())
}

pub async fn reset_page(
    State(state): State<AppState>,
    Query(query): Query<ResetQuery>,
) -> WebResult<Response> {
    let token = query.token.unwrap_or_default();
    state.auth.check_reset_token(&token).await?;

    let page = ResetTemplate {
        current_user: None,
        token,
        error: None,
    };
    Ok(render(&page)?.into_response())
}

pub async fn reset_submit(
    State(state): State<AppState>,
    Form(form): Form<ResetForm>,
) -> WebResult<Response> {
    let result = match form.confirm_password.as_deref() {
        Some(confirm) if confirm != form.password => {
            Err((StatusCode::BAD_REQUEST, PASSWORD_MISMATCH.to_string()))
        }
        _ => match state.auth.reset_password(&form.token, &form.password).await {
            Ok(()) => Ok(()),
            Err(err) => Err(recoverable(err)?),
        },
    };

    match result {
        Ok(()) => Ok(Redirect::to("/login?reset=1").into_response()),
        Err((status, message)) => {
            let page = ResetTemplate {
                current_user: None,
                token: form.token,
                error: Some(message),
            };
            Ok((status, render(&page)?).into_response())
        }
    }
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (clear_session(jar), Redirect::to("/login"))
}
