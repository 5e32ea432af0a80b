//! Configuration module for the wishlist backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default reverse-image search endpoint.
pub const DEFAULT_LOOKUP_ENDPOINT: &str = "https://serpapi.com/search.json";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// PIN guarding the parents area (gate disabled when unset)
    pub parent_pin: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// API key for the reverse-image search engine
    pub serpapi_key: Option<String>,
    /// Search engine endpoint
    pub lookup_endpoint: String,
    /// Timeout for a single outbound lookup
    pub lookup_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let parent_pin = env::var("WISHLIST_PARENT_PIN")
            .ok()
            .filter(|pin| !pin.is_empty());

        let db_path = env::var("WISHLIST_DB_PATH")
            .unwrap_or_else(|_| "./data/wishlist.sqlite".to_string())
            .into();

        let bind_addr = env::var("WISHLIST_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid WISHLIST_BIND_ADDR format");

        let log_level = env::var("WISHLIST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let serpapi_key = env::var("WISHLIST_SERPAPI_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        let lookup_endpoint = env::var("WISHLIST_LOOKUP_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_LOOKUP_ENDPOINT.to_string());

        let lookup_timeout = env::var("WISHLIST_LOOKUP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Self {
            parent_pin,
            db_path,
            bind_addr,
            log_level,
            serpapi_key,
            lookup_endpoint,
            lookup_timeout,
        }
    }
}
