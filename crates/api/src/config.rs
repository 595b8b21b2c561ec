use std::time::Duration;

use bests_speedrun::api::DEFAULT_ROOT_URL;
use bests_speedrun::gateway::{GatewayConfig, DEFAULT_CACHE_TTL, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// Root of the leaderboard API, with trailing slash.
    pub api_root_url: String,
    /// Pages followed per request before giving up.
    pub api_max_pages: usize,
    /// `max=` page size requested from run listings.
    pub api_page_size: u32,
    /// Seconds a completed leaderboard response is reused.
    pub api_cache_ttl_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                              |
    /// |------------------------|--------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                            |
    /// | `PORT`                 | `3000`                               |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`              |
    /// | `API_ROOT_URL`         | `https://www.speedrun.com/api/v1/`   |
    /// | `API_MAX_PAGES`        | `128`                                |
    /// | `API_PAGE_SIZE`        | `200`                                |
    /// | `API_CACHE_TTL_SECS`   | `300`                                |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let api_root_url =
            std::env::var("API_ROOT_URL").unwrap_or_else(|_| DEFAULT_ROOT_URL.into());

        let api_max_pages: usize = std::env::var("API_MAX_PAGES")
            .map(|v| v.parse().expect("API_MAX_PAGES must be a valid usize"))
            .unwrap_or(DEFAULT_MAX_PAGES);

        let api_page_size: u32 = std::env::var("API_PAGE_SIZE")
            .map(|v| v.parse().expect("API_PAGE_SIZE must be a valid u32"))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let api_cache_ttl_secs: u64 = std::env::var("API_CACHE_TTL_SECS")
            .map(|v| v.parse().expect("API_CACHE_TTL_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_CACHE_TTL.as_secs());

        Self {
            host,
            port,
            cors_origins,
            api_root_url,
            api_max_pages,
            api_page_size,
            api_cache_ttl_secs,
        }
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            max_pages: self.api_max_pages,
            page_size: self.api_page_size,
            cache_ttl: Duration::from_secs(self.api_cache_ttl_secs),
        }
    }
}
