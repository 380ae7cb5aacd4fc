//! Integration tests for Inkpost.
//!
//! Each test spawns the real router on an ephemeral port, backed by the
//! in-memory blog store and in-memory sessions, and drives it over HTTP with
//! `reqwest`. No database is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p inkpost-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Registration, login, logout
//! - `gate` - Protected routes without a session
//! - `posts` - Dashboard, detail, create and delete
//! - `server` - Health checks, static files, security headers
//! - `store_failures` - Handler messages when the store fails

mod failing;

pub use failing::{FailingPostStore, PostFailure};

use std::path::Path;
use std::sync::Arc;

use inkpost_server::config::ServerConfig;
use inkpost_server::db::{MemoryStore, StoreHandle};
use inkpost_server::middleware::create_session_layer;
use inkpost_server::state::AppState;
use reqwest::{Client, Response, header::LOCATION, multipart};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A running server plus direct access to its store.
pub struct TestApp {
    /// Base URL, e.g. `http://127.0.0.1:49152`.
    pub address: String,
    /// The store behind the server, for asserting on side effects.
    pub store: Arc<MemoryStore>,
    /// Public directory; uploads land in its `img` subdirectory.
    pub public_dir: TempDir,
}

impl TestApp {
    /// Start a fresh server with empty stores.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or listener cannot be created.
    pub async fn spawn() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::spawn_with(store.clone(), store).await
    }

    /// Start a server whose post operations named by `failure` fail.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or listener cannot be created.
    pub async fn spawn_failing(failure: PostFailure) -> Self {
        let store = Arc::new(MemoryStore::new());
        let handle: StoreHandle = Arc::new(FailingPostStore::new(store.clone(), failure));
        Self::spawn_with(store, handle).await
    }

    async fn spawn_with(store: Arc<MemoryStore>, handle: StoreHandle) -> Self {
        let public_dir = tempfile::tempdir().expect("Failed to create public dir");
        let public_path = public_dir.path().to_string_lossy().into_owned();

        let config = ServerConfig::from_lookup(|key| match key {
            "BLOG_IN_MEMORY" => Some("true".to_string()),
            "BLOG_PUBLIC_DIR" => Some(public_path.clone()),
            _ => None,
        })
        .expect("Failed to build test configuration");

        let session_layer =
            create_session_layer(tower_sessions::MemoryStore::default(), &config);
        let app = inkpost_server::app(AppState::new(config, handle), session_layer);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind port");
        let port = listener
            .local_addr()
            .expect("Listener has no local address")
            .port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            address: format!("http://127.0.0.1:{port}"),
            store,
            public_dir,
        }
    }

    /// A new "browser": its own cookie jar, redirects not followed.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn browser() -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build client")
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.address)
    }

    /// Directory uploaded images are written to.
    #[must_use]
    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.public_dir.path().join("img")
    }

    /// Write a file into the public directory.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn put_public_file(&self, relative: &str, contents: &[u8]) {
        let path = self.public_dir.path().join(relative);
        if let Some(parent) = Path::new(&path).parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directory");
        }
        std::fs::write(path, contents).expect("Failed to write file");
    }

    /// GET `path`.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to send.
    pub async fn get(&self, client: &Client, path: &str) -> Response {
        client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    /// POST an empty body to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to send.
    pub async fn post(&self, client: &Client, path: &str) -> Response {
        client
            .post(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    /// Submit the registration form.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to send.
    pub async fn register(
        &self,
        client: &Client,
        username: &str,
        password: &str,
        role: &str,
    ) -> Response {
        client
            .post(self.url("/register"))
            .form(&[("username", username), ("password", password), ("role", role)])
            .send()
            .await
            .expect("Request failed")
    }

    /// Submit the login form.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to send.
    pub async fn login(&self, client: &Client, username: &str, password: &str) -> Response {
        client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("Request failed")
    }

    /// Submit the new post form, optionally with an image.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to send.
    pub async fn create_post(
        &self,
        client: &Client,
        title: &str,
        description: &str,
        image: Option<(&str, &[u8])>,
    ) -> Response {
        let mut form = multipart::Form::new()
            .text("title", title.to_string())
            .text("description", description.to_string());
        if let Some((filename, bytes)) = image {
            form = form.part(
                "image",
                multipart::Part::bytes(bytes.to_vec()).file_name(filename.to_string()),
            );
        }

        client
            .post(self.url("/create-post"))
            .multipart(form)
            .send()
            .await
            .expect("Request failed")
    }
}

/// The `Location` header of a redirect, or an empty string.
#[must_use]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
