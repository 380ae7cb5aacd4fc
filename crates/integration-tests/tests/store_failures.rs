//! Integration tests for handler messages when the blog store fails.

#![allow(clippy::unwrap_used)]

use inkpost_core::UserId;
use inkpost_integration_tests::{PostFailure, TestApp, location};
use inkpost_server::db::BlogStore;
use inkpost_server::models::{DEFAULT_IMAGE, NewPost};
use reqwest::{Client, StatusCode};

/// Register an admin in a fresh browser.
async fn admin(app: &TestApp) -> Client {
    let browser = TestApp::browser();
    let response = app.register(&browser, "alice", "pw1", "admin").await;
    assert_eq!(location(&response), "/dashboard");
    browser
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_dashboard_store_failure() {
    let app = TestApp::spawn_failing(PostFailure::Reads).await;
    let browser = admin(&app).await;

    let response = app.get(&browser, "/dashboard").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/?error=Error%20fetching%20dashboard%20data."
    );
}

#[tokio::test]
async fn test_show_post_store_failure() {
    let app = TestApp::spawn_failing(PostFailure::Reads).await;
    let browser = admin(&app).await;

    let response = app.get(&browser, "/blog/1").await;

    assert_eq!(location(&response), "/?error=Error%20fetching%20blog%20post.");
}

#[tokio::test]
async fn test_delete_lookup_store_failure() {
    let app = TestApp::spawn_failing(PostFailure::Reads).await;
    let browser = admin(&app).await;

    let response = app.post(&browser, "/delete-post/1").await;

    assert_eq!(location(&response), "/?error=Error%20deleting%20blog%20post.");
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn test_create_post_store_failure() {
    let app = TestApp::spawn_failing(PostFailure::Writes).await;
    let browser = admin(&app).await;

    let response = app.create_post(&browser, "Hello", "World", None).await;

    assert_eq!(location(&response), "/?error=Error%20creating%20blog%20post.");
    assert!(app.store.list_posts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_post_store_failure() {
    let app = TestApp::spawn_failing(PostFailure::Writes).await;
    let browser = admin(&app).await;
    app.store
        .create_post(&NewPost {
            title: "Hello".into(),
            description: "World".into(),
            image: DEFAULT_IMAGE.into(),
            user_id: UserId::new(1),
        })
        .await
        .unwrap();

    let response = app.post(&browser, "/delete-post/1").await;

    assert_eq!(location(&response), "/?error=Error%20deleting%20blog%20post.");
    assert_eq!(app.store.list_posts().await.unwrap().len(), 1);
}
