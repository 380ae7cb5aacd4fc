//! Integration tests for registration, login and logout.

#![allow(clippy::unwrap_used)]

use inkpost_core::Role;
use inkpost_integration_tests::{TestApp, location};
use inkpost_server::db::BlogStore;
use reqwest::StatusCode;

const INVALID_CREDENTIALS: &str = "/?error=Invalid%20username%20or%20password.";

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_establishes_session() {
    let app = TestApp::spawn().await;
    let browser = TestApp::browser();

    let response = app.register(&browser, "alice", "pw1", "admin").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");

    // The session now reaches protected pages
    let dashboard = app.get(&browser, "/dashboard").await;
    assert_eq!(dashboard.status(), StatusCode::OK);
    assert!(dashboard.text().await.unwrap().contains("alice"));

    let user = app.store.get_user_by_username("alice").await.unwrap().unwrap();
    assert_eq!(user.role, Role::admin());
}

#[tokio::test]
async fn test_register_keeps_requested_role() {
    let app = TestApp::spawn().await;

    app.register(&TestApp::browser(), "carol", "pw", "editor").await;

    let user = app.store.get_user_by_username("carol").await.unwrap().unwrap();
    assert_eq!(user.role.as_str(), "editor");
    assert!(!user.is_admin());
}

#[tokio::test]
async fn test_register_without_role_defaults_to_user() {
    let app = TestApp::spawn().await;

    let response = TestApp::browser()
        .post(app.url("/register"))
        .form(&[("username", "dave"), ("password", "pw")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/dashboard");

    let user = app.store.get_user_by_username("dave").await.unwrap().unwrap();
    assert_eq!(user.role, Role::default());
}

#[tokio::test]
async fn test_register_empty_role_is_stored_as_given() {
    let app = TestApp::spawn().await;

    let response = app.register(&TestApp::browser(), "frank", "pw", "").await;
    assert_eq!(location(&response), "/dashboard");

    let user = app.store.get_user_by_username("frank").await.unwrap().unwrap();
    assert_eq!(user.role.as_str(), "");
    assert!(!user.is_admin());
}

#[tokio::test]
async fn test_register_duplicate_username_fails() {
    let app = TestApp::spawn().await;
    app.register(&TestApp::browser(), "alice", "pw1", "admin").await;

    let response = app
        .register(&TestApp::browser(), "alice", "other", "user")
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/?error=Registration%20failed.%20Please%20try%20again."
    );
}

#[tokio::test]
async fn test_register_missing_password_fails() {
    let app = TestApp::spawn().await;

    let response = app.register(&TestApp::browser(), "erin", "", "user").await;

    assert_eq!(
        location(&response),
        "/?error=Registration%20failed.%20Please%20try%20again."
    );
    assert!(app.store.get_user_by_username("erin").await.unwrap().is_none());
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;
    app.register(&TestApp::browser(), "alice", "pw1", "admin").await;

    let browser = TestApp::browser();
    let response = app.login(&browser, "alice", "pw1").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");

    let dashboard = app.get(&browser, "/dashboard").await;
    assert_eq!(dashboard.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.register(&TestApp::browser(), "alice", "pw1", "admin").await;

    let wrong_password = app.login(&TestApp::browser(), "alice", "nope").await;
    let unknown_user = app.login(&TestApp::browser(), "mallory", "pw1").await;

    assert_eq!(location(&wrong_password), INVALID_CREDENTIALS);
    assert_eq!(location(&unknown_user), INVALID_CREDENTIALS);
}

#[tokio::test]
async fn test_failed_login_grants_no_session() {
    let app = TestApp::spawn().await;
    app.register(&TestApp::browser(), "alice", "pw1", "admin").await;

    let browser = TestApp::browser();
    app.login(&browser, "alice", "nope").await;

    let dashboard = app.get(&browser, "/dashboard").await;
    assert_eq!(location(&dashboard), "/?error=User%20not%20authenticated.");
}

#[tokio::test]
async fn test_login_missing_field() {
    let app = TestApp::spawn().await;

    let response = TestApp::browser()
        .post(app.url("/login"))
        .form(&[("username", "alice")])
        .send()
        .await
        .unwrap();

    assert_eq!(
        location(&response),
        "/?error=Login%20failed.%20Please%20try%20again."
    );
}

#[tokio::test]
async fn test_login_empty_password_is_invalid_credentials() {
    let app = TestApp::spawn().await;
    app.register(&TestApp::browser(), "alice", "pw1", "admin").await;

    let browser = TestApp::browser();
    let response = app.login(&browser, "alice", "").await;
    assert_eq!(location(&response), INVALID_CREDENTIALS);

    let dashboard = app.get(&browser, "/dashboard").await;
    assert_eq!(location(&dashboard), "/?error=User%20not%20authenticated.");
}

#[tokio::test]
async fn test_login_empty_username_is_invalid_credentials() {
    let app = TestApp::spawn().await;
    app.register(&TestApp::browser(), "alice", "pw1", "admin").await;

    let response = app.login(&TestApp::browser(), "", "pw1").await;

    assert_eq!(location(&response), INVALID_CREDENTIALS);
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::spawn().await;
    let browser = TestApp::browser();
    app.register(&browser, "alice", "pw1", "admin").await;

    let response = app.get(&browser, "/logout").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let dashboard = app.get(&browser, "/dashboard").await;
    assert!(location(&dashboard).starts_with("/?error="));
}

#[tokio::test]
async fn test_logout_twice_is_harmless() {
    let app = TestApp::spawn().await;
    let browser = TestApp::browser();
    app.register(&browser, "alice", "pw1", "admin").await;

    let first = app.get(&browser, "/logout").await;
    let second = app.get(&browser, "/logout").await;

    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&first), "/");
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&second), "/");
}

#[tokio::test]
async fn test_logout_without_session() {
    let app = TestApp::spawn().await;

    let response = app.get(&TestApp::browser(), "/logout").await;

    assert_eq!(location(&response), "/");
}

// =============================================================================
// Landing page
// =============================================================================

#[tokio::test]
async fn test_landing_page_shows_error() {
    let app = TestApp::spawn().await;

    let response = app
        .get(&TestApp::browser(), "/?error=Invalid%20username%20or%20password.")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Invalid username or password."));
    assert!(body.contains("action=\"/login\""));
    assert!(body.contains("action=\"/register\""));
}

#[tokio::test]
async fn test_landing_page_escapes_error() {
    let app = TestApp::spawn().await;

    let response = app
        .get(&TestApp::browser(), "/?error=%3Cscript%3Ealert(1)%3C%2Fscript%3E")
        .await;

    let body = response.text().await.unwrap();
    assert!(!body.contains("<script>alert(1)</script>"));
}
