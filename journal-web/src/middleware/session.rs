/// Cookie-based sessions
///
/// A successful login stores a signed session token (HS256, see
/// `journal_shared::auth::session`) in an HttpOnly cookie. Protected routes
/// run [`require_session`], which resolves the cookie to a [`CurrentUser`]
/// or redirects the browser to `/login`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use journal_shared::{auth::session, models::User};
use tracing::debug;

use crate::{app::AppState, error::WebResult};

/// Session cookie name
pub const SESSION_COOKIE: &str = "journal_session";

/// The signed-in user, inserted into request extensions by [`require_session`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resolves the session cookie to a user
///
/// Missing, expired or tampered tokens and deleted users all yield `None`.
pub async fn session_user(state: &AppState, jar: &CookieJar) -> WebResult<Option<User>> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let claims = match session::validate_session_token(cookie.value(), state.session_secret()) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "Rejected session cookie");
            return Ok(None);
        }
    };

    Ok(state.auth.find_user(claims.sub).await?)
}

/// Builds the session cookie for a freshly issued token
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Removes the session cookie
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Session middleware for protected routes
///
/// Inserts [`CurrentUser`] into request extensions, or redirects to
/// `/login` (dropping any stale cookie).
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> WebResult<Response> {
    match session_user(&state, &jar).await? {
        Some(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(req).await)
        }
        None => {
            let jar = if jar.get(SESSION_COOKIE).is_some() {
                clear_session(jar)
            } else {
                jar
            };
            Ok((jar, Redirect::to("/login")).into_response())
        }
    }
}
