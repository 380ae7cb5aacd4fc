//! Integration tests for protected routes without a valid session.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use inkpost_integration_tests::{TestApp, location};
use inkpost_server::db::BlogStore;
use reqwest::StatusCode;

const UNAUTHENTICATED: &str = "/?error=User%20not%20authenticated.";

#[tokio::test]
async fn test_protected_pages_redirect_home() {
    let app = TestApp::spawn().await;
    let browser = TestApp::browser();

    for path in ["/dashboard", "/blog/1", "/blog/abc", "/create-post"] {
        let response = app.get(&browser, path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {path}");
        assert_eq!(location(&response), UNAUTHENTICATED, "GET {path}");
    }
}

#[tokio::test]
async fn test_anonymous_create_post_has_no_effect() {
    let app = TestApp::spawn().await;
    let browser = TestApp::browser();

    let response = app
        .create_post(&browser, "Sneaky", "Post", Some(("sneaky.png", b"png")))
        .await;

    assert_eq!(location(&response), UNAUTHENTICATED);
    assert!(app.store.list_posts().await.unwrap().is_empty());
    assert!(!app.upload_dir().join("sneaky.png").exists());
}

#[tokio::test]
async fn test_anonymous_delete_post_has_no_effect() {
    let app = TestApp::spawn().await;
    let alice = TestApp::browser();
    app.register(&alice, "alice", "pw1", "admin").await;
    app.create_post(&alice, "Hello", "World", None).await;
    let post_id = app.store.list_posts().await.unwrap()[0].id;

    let response = app
        .post(&TestApp::browser(), &format!("/delete-post/{post_id}"))
        .await;

    assert_eq!(location(&response), UNAUTHENTICATED);
    assert!(app.store.get_post(post_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_forged_session_cookie_is_unauthenticated() {
    let app = TestApp::spawn().await;

    let response = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
        .get(app.url("/dashboard"))
        .header("cookie", "inkpost_session=not-a-real-session")
        .send()
        .await
        .unwrap();

    assert_eq!(location(&response), UNAUTHENTICATED);
}
