//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BLOG_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`).
//!   Not required when `BLOG_IN_MEMORY` is enabled.
//!
//! ## Optional
//! - `BLOG_HOST` - Bind address (default: 127.0.0.1)
//! - `BLOG_PORT` - Listen port (default: 3000)
//! - `BLOG_BASE_URL` - Public URL, used for the session cookie `Secure` flag
//!   (default: <http://localhost:3000>)
//! - `BLOG_PUBLIC_DIR` - Static file root (default: public)
//! - `BLOG_UPLOAD_DIR` - Image upload directory (default: `<BLOG_PUBLIC_DIR>/img`)
//! - `BLOG_MAX_UPLOAD_BYTES` - Body limit for post creation (default: 10 MiB)
//! - `BLOG_IN_MEMORY` - Use in-process stores instead of `PostgreSQL` (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Blog server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password).
    /// `None` only when running in memory.
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Directory served as static files
    pub public_dir: PathBuf,
    /// Directory uploaded images are written to
    pub upload_dir: PathBuf,
    /// Maximum request body size for post creation
    pub max_upload_bytes: usize,
    /// Use in-process stores for data and sessions
    pub in_memory: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let in_memory = env.parse_or("BLOG_IN_MEMORY", false)?;
        let database_url = match env.database_url() {
            Some(url) => Some(url),
            None if in_memory => None,
            None => return Err(ConfigError::MissingEnvVar("BLOG_DATABASE_URL".to_string())),
        };

        let host = env.parse_or("BLOG_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env.parse_or("BLOG_PORT", 3000_u16)?;
        let base_url = env.or_default("BLOG_BASE_URL", "http://localhost:3000");
        let public_dir = PathBuf::from(env.or_default("BLOG_PUBLIC_DIR", "public"));
        let upload_dir = env
            .optional("BLOG_UPLOAD_DIR")
            .map_or_else(|| public_dir.join("img"), PathBuf::from);
        let max_upload_bytes = env.parse_or("BLOG_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            public_dir,
            upload_dir,
            max_upload_bytes,
            in_memory,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Thin wrapper around a variable lookup function.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => Ok(default),
        }
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self) -> Option<SecretString> {
        self.optional("BLOG_DATABASE_URL")
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BLOG_DATABASE_URL", "postgres://localhost/blog")]).unwrap();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert_eq!(config.upload_dir, PathBuf::from("public/img"));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(!config.in_memory);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "BLOG_DATABASE_URL"));
    }

    #[test]
    fn test_generic_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fallback/blog")]).unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://fallback/blog"
        );
    }

    #[test]
    fn test_in_memory_without_database() {
        let config = load(&[("BLOG_IN_MEMORY", "true")]).unwrap();
        assert!(config.in_memory);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("BLOG_IN_MEMORY", "true"), ("BLOG_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "BLOG_PORT"));
    }

    #[test]
    fn test_upload_dir_override_and_https() {
        let config = load(&[
            ("BLOG_IN_MEMORY", "true"),
            ("BLOG_PUBLIC_DIR", "/srv/www"),
            ("BLOG_UPLOAD_DIR", "/var/uploads"),
            ("BLOG_BASE_URL", "https://blog.example.com"),
        ])
        .unwrap();
        assert_eq!(config.public_dir, PathBuf::from("/srv/www"));
        assert_eq!(config.upload_dir, PathBuf::from("/var/uploads"));
        assert!(config.is_secure());
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("BLOG_DATABASE_URL", "postgres://user:hunter2@db/blog")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
    }
}
