//! Inkpost blog server.
//!
//! Serves the blog on port 3000 by default.
//!
//! # Architecture
//!
//! - Axum web framework, Askama templates for server-side rendering
//! - Sessions via tower-sessions, stored in `PostgreSQL`
//! - Users and posts in `PostgreSQL` (schema `blog`)
//! - Uploaded images written to the public image directory
//!
//! Set `BLOG_IN_MEMORY=true` to run without a database; all data is lost on
//! shutdown.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use inkpost_server::config::ServerConfig;
use inkpost_server::db::{self, MemoryStore, PgStore, StoreHandle};
use inkpost_server::middleware::create_session_layer;
use inkpost_server::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "inkpost_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let app = if config.in_memory {
        tracing::warn!("Running with in-memory stores, data will not survive a restart");

        let store: StoreHandle = Arc::new(MemoryStore::new());
        let session_layer =
            create_session_layer(tower_sessions::MemoryStore::default(), &config);
        inkpost_server::app(AppState::new(config.clone(), store), session_layer)
    } else {
        let database_url = config
            .database_url
            .as_ref()
            .expect("BLOG_DATABASE_URL is required unless BLOG_IN_MEMORY is set");
        let pool = db::create_pool(database_url)
            .await
            .expect("Failed to create database pool");
        tracing::info!("Database pool created");

        // NOTE: Migrations are NOT run automatically on startup.
        // Run them explicitly via: cargo run -p inkpost-cli -- migrate

        let store: StoreHandle = Arc::new(PgStore::new(pool.clone()));
        let session_layer = create_session_layer(PostgresStore::new(pool), &config);
        inkpost_server::app(AppState::new(config.clone(), store), session_layer)
    };

    // Start server
    let addr = config.socket_addr();
    tracing::info!("inkpost listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
