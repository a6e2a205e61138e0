/// Integration tests for the journal web server
///
/// These drive the full router (session middleware, security headers,
/// templates) over a flat-file store in a temporary directory.

mod common;

use axum::http::{header, StatusCode};
use common::{
    body_string, capture_logs, location, session_cookie, StubSummarizer, TestContext, PASSWORD,
};
use journal_shared::summarize::DisabledSummarizer;
use std::sync::Arc;
use tracing::Level;

async fn create_entry(ctx: &TestContext, cookie: &str, title: &str, content: &str) {
    let response = ctx
        .post_form("/new", &[("title", title), ("content", content)], Some(cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "files");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_protected_routes_redirect_to_login() {
    let ctx = TestContext::new().await;

    for uri in ["/", "/past", "/new"] {
        let response = ctx.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/login");
    }

    let response = ctx.post_form("/summarize", &[], None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_forged_cookie_is_rejected() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/", Some("journal_session=not-a-token")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_register_signs_in() {
    let ctx = TestContext::new().await;

    let cookie = ctx.register("ada@example.com", "Ada").await;

    let response = ctx.get("/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Ada"));
    assert!(body.contains("No entries yet."));
}

#[tokio::test]
async fn test_session_cookie_attributes() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form(
            "/register",
            &[("email", "ada@example.com"), ("password", PASSWORD)],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(set_cookie.starts_with("journal_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    // Not in production mode
    assert!(!set_cookie.contains("Secure"));
}

#[tokio::test]
async fn test_duplicate_registration() {
    let ctx = TestContext::new().await;
    ctx.register("ada@example.com", "Ada").await;

    let response = ctx
        .post_form(
            "/register",
            &[("email", "ADA@example.com"), ("password", PASSWORD)],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(session_cookie(&response).is_none());

    let body = body_string(response).await;
    assert!(body.contains("An account with this email already exists"));
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form(
            "/register",
            &[
                ("email", "ada@example.com"),
                ("password", PASSWORD),
                ("confirm_password", "Something#Else9"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("Passwords do not match"));

    assert!(ctx
        .state
        .store
        .find_user_by_email("ada@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_login() {
    let ctx = TestContext::new().await;
    ctx.register("ada@example.com", "Ada").await;

    let response = ctx
        .post_form(
            "/login",
            &[("email", " Ada@Example.com "), ("password", PASSWORD)],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(session_cookie(&response).is_some());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let ctx = TestContext::new().await;
    ctx.register("ada@example.com", "Ada").await;

    for (email, password) in [
        ("ada@example.com", "Wrong#Password1"),
        ("nobody@example.com", PASSWORD),
    ] {
        let response = ctx
            .post_form("/login", &[("email", email), ("password", password)], None)
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(session_cookie(&response).is_none());
        assert!(body_string(response).await.contains("Invalid email or password"));
    }
}

#[tokio::test]
async fn test_login_page_redirects_when_signed_in() {
    let ctx = TestContext::new().await;
    let cookie = ctx.register("ada@example.com", "Ada").await;

    for uri in ["/login", "/register"] {
        let response = ctx.get(uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    let response = ctx.get("/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let ctx = TestContext::new().await;
    let cookie = ctx.register("ada@example.com", "Ada").await;

    let response = ctx.get("/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(set_cookie.starts_with("journal_session="));
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn test_create_entry() {
    let ctx = TestContext::new().await;
    let cookie = ctx.register("ada@example.com", "Ada").await;

    let response = ctx
        .post_form(
            "/new",
            &[("title", "Morning walk"), ("content", "Cold but bright")],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?saved=1");

    let body = body_string(ctx.get("/?saved=1", Some(&cookie)).await).await;
    assert!(body.contains("Entry saved."));
    assert!(body.contains("Morning walk"));
    assert!(body.contains("Cold but bright"));
}

#[tokio::test]
async fn test_create_entry_requires_title() {
    let ctx = TestContext::new().await;
    let cookie = ctx.register("ada@example.com", "Ada").await;

    let response = ctx
        .post_form("/new", &[("title", "   "), ("content", "Kept")], Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_string(response).await;
    assert!(body.contains("Title is required"));
    // The form keeps what was typed
    assert!(body.contains("Kept"));
}

#[tokio::test]
async fn test_entry_content_is_escaped() {
    let ctx = TestContext::new().await;
    let cookie = ctx.register("ada@example.com", "Ada").await;
    create_entry(&ctx, &cookie, "<b>bold</b>", "<script>alert(1)</script>").await;

    let body = body_string(ctx.get("/", Some(&cookie)).await).await;
    assert!(!body.contains("<script>alert(1)"));
    assert!(body.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn test_edit_entry() {
    let ctx = TestContext::new().await;
    let cookie = ctx.register("ada@example.com", "Ada").await;
    create_entry(&ctx, &cookie, "Draft", "First version").await;

    let user = ctx.user("ada@example.com").await;
    let entry = ctx.state.entries.recent(user.id, 1).await.unwrap().remove(0);

    let response = ctx.get(&format!("/edit/{}", entry.id), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("First version"));

    let response = ctx
        .post_form(
            &format!("/edit/{}", entry.id),
            &[("title", "Final"), ("content", "Second version")],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let updated = ctx.state.entries.get(user.id, entry.id).await.unwrap();
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.content, "Second version");
    assert_eq!(updated.created_at, entry.created_at);
}

#[tokio::test]
async fn test_other_users_entries_are_not_found() {
    let ctx = TestContext::new().await;
    let ada = ctx.register("ada@example.com", "Ada").await;
    let bob = ctx.register("bob@example.com", "Bob").await;
    create_entry(&ctx, &ada, "Private", "Only for Ada").await;

    let user = ctx.user("ada@example.com").await;
    let entry = ctx.state.entries.recent(user.id, 1).await.unwrap().remove(0);

    let response = ctx.get(&format!("/edit/{}", entry.id), Some(&bob)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .post_form(
            &format!("/edit/{}", entry.id),
            &[("title", "Hijacked"), ("content", "")],
            Some(&bob),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .post_form(&format!("/delete/{}", entry.id), &[], Some(&bob))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body = body_string(ctx.get("/", Some(&bob)).await).await;
    assert!(!body.contains("Only for Ada"));

    let still_there = ctx.state.entries.get(user.id, entry.id).await.unwrap();
    assert_eq!(still_there.title, "Private");
}

#[tokio::test]
async fn test_malformed_entry_id_is_not_found() {
    let ctx = TestContext::new().await;
    let cookie = ctx.register("ada@example.com", "Ada").await;

    let response = ctx.get("/edit/not-a-uuid", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("Entry not found"));
}

#[tokio::test]
async fn test_delete_entry() {
    let ctx = TestContext::new().await;
    let cookie = ctx.register("ada@example.com", "Ada").await;
    create_entry(&ctx, &cookie, "Short lived", "").await;

    let user = ctx.user("ada@example.com").await;
    let entry = ctx.state.entries.recent(user.id, 1).await.unwrap().remove(0);

    let response = ctx
        .post_form(&format!("/delete/{}", entry.id), &[], Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    assert!(ctx.state.entries.recent(user.id, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_bulk() {
    let ctx = TestContext::new().await;
    let cookie = ctx.register("ada@example.com", "Ada").await;
    for title in ["One", "Two", "Three"] {
        create_entry(&ctx, &cookie, title, "").await;
    }

    let user = ctx.user("ada@example.com").await;
    let entries = ctx.state.entries.recent(user.id, 10).await.unwrap();
    let first = entries[0].id.to_string();
    let second = entries[1].id.to_string();

    let response = ctx
        .post_form(
            "/delete_bulk",
            &[
                ("selected", first.as_str()),
                ("selected", second.as_str()),
                ("selected", "garbage"),
                ("next", "/past?preset=week"),
            ],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/past?preset=week");

    let remaining = ctx.state.entries.recent(user.id, 10).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, entries[2].id);
}

#[tokio::test]
async fn test_delete_bulk_rejects_external_next() {
    let ctx = TestContext::new().await;
    let cookie = ctx.register("ada@example.com", "Ada").await;

    let response = ctx
        .post_form(
            "/delete_bulk",
            &[("next", "https://evil.example/")],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_past_entries() {
    let ctx = TestContext::new().await;
    let cookie = ctx.register("ada@example.com", "Ada").await;
    create_entry(&ctx, &cookie, "Today", "").await;

    let response = ctx.get("/past?preset=week", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Today"));

    let response = ctx
        .get("/past?preset=custom&start=2001-01-01&end=2001-12-31", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(!body.contains("<h3>Today</h3>"));
    assert!(body.contains("No entries yet."));

    // Dates at the edge of the calendar are still valid bounds
    let response = ctx
        .get("/past?preset=custom&end=%2B262142-12-31", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Today"));

    // Unknown presets and unparseable dates fall back to everything
    let response = ctx
        .get("/past?preset=decade&start=yesterday", Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Today"));
}

#[tokio::test]
async fn test_summarize_selected_entries() {
    let stub = Arc::new(StubSummarizer::default());
    let ctx = TestContext::with_summarizer(stub.clone()).await;

    let ada = ctx.register("ada@example.com", "Ada").await;
    let bob = ctx.register("bob@example.com", "Bob").await;
    create_entry(&ctx, &ada, "Park", "Long walk").await;
    create_entry(&ctx, &ada, "Rain", "Stayed in").await;
    create_entry(&ctx, &bob, "Secret", "Not for Ada").await;

    let ada_user = ctx.user("ada@example.com").await;
    let bob_user = ctx.user("bob@example.com").await;
    let mine = ctx.state.entries.recent(ada_user.id, 10).await.unwrap();
    let theirs = ctx.state.entries.recent(bob_user.id, 10).await.unwrap();

    let ids: Vec<String> = mine
        .iter()
        .chain(theirs.iter())
        .map(|e| e.id.to_string())
        .collect();
    let fields: Vec<(&str, &str)> = ids.iter().map(|id| ("selected", id.as_str())).collect();

    let response = ctx.post_form("/summarize", &fields, Some(&ada)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("A calm stretch across 2 entries."));
    assert!(body.contains("Positive"));
    assert!(body.contains("Walks help"));
    assert!(!body.contains("Secret"));

    let mut seen = stub.seen.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec!["Park".to_string(), "Rain".to_string()]);
}

#[tokio::test]
async fn test_summarize_without_selection() {
    let ctx = TestContext::new().await;
    let cookie = ctx.register("ada@example.com", "Ada").await;

    let response = ctx.post_form("/summarize", &[], Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response)
        .await
        .contains("Select at least one entry to summarize."));
}

#[tokio::test]
async fn test_summarize_not_configured() {
    let ctx = TestContext::with_summarizer(Arc::new(DisabledSummarizer)).await;
    let cookie = ctx.register("ada@example.com", "Ada").await;
    create_entry(&ctx, &cookie, "Park", "Long walk").await;

    let user = ctx.user("ada@example.com").await;
    let entry = ctx.state.entries.recent(user.id, 1).await.unwrap().remove(0);
    let id = entry.id.to_string();

    let response = ctx
        .post_form("/summarize", &[("selected", id.as_str())], Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_string(response).await;
    assert!(body.contains("Summaries are not available"));
    // The selection is still listed
    assert!(body.contains("Park"));
}

#[tokio::test]
async fn test_password_reset_flow() {
    let ctx = TestContext::new().await;
    ctx.register("ada@example.com", "Ada").await;

    let response = ctx
        .post_form("/forgot", &[("email", "ada@example.com")], None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let issued = ctx
        .state
        .auth
        .request_reset("ada@example.com")
        .await
        .unwrap()
        .unwrap();

    let response = ctx
        .get(&format!("/reset?token={}", issued.token), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains(&issued.token));

    let new_password = "Fresh#Start2024";
    let response = ctx
        .post_form(
            "/reset",
            &[
                ("token", issued.token.as_str()),
                ("password", new_password),
                ("confirm_password", new_password),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?reset=1");

    let body = body_string(ctx.get("/login?reset=1", None).await).await;
    assert!(body.contains("Your password has been updated"));

    let response = ctx
        .post_form(
            "/login",
            &[("email", "ada@example.com"), ("password", PASSWORD)],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = ctx
        .post_form(
            "/login",
            &[("email", "ada@example.com"), ("password", new_password)],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Tokens are single use
    let response = ctx
        .get(&format!("/reset?token={}", issued.token), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forgot_unknown_email_looks_the_same() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form("/forgot", &[("email", "nobody@example.com")], None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_reset_link_only_logged_at_debug() {
    let ctx = TestContext::new().await;
    ctx.register("ada@example.com", "Ada").await;

    let (guard, info_logs) = capture_logs(Level::INFO);
    let response = ctx
        .post_form("/forgot", &[("email", "ada@example.com")], None)
        .await;
    drop(guard);
    assert_eq!(response.status(), StatusCode::OK);

    let output = info_logs.contents();
    assert!(output.contains("Password reset link issued"));
    assert!(!output.contains("reset?token="));

    let (guard, debug_logs) = capture_logs(Level::DEBUG);
    ctx.post_form("/forgot", &[("email", "ada@example.com")], None)
        .await;
    drop(guard);

    assert!(debug_logs.contents().contains("/reset?token="));
}

#[tokio::test]
async fn test_reset_with_garbage_token() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/reset?token=garbage", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .post_form(
            "/reset",
            &[
                ("token", "garbage"),
                ("password", "Fresh#Start2024"),
                ("confirm_password", "Fresh#Start2024"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("Reset link is invalid"));
}

#[tokio::test]
async fn test_security_headers() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/login", None).await;
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.contains_key("content-security-policy"));
    assert!(!headers.contains_key("strict-transport-security"));
}

#[tokio::test]
async fn test_unknown_route() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/nonexistent", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
