//! REST transport for the speedrun.com HTTP API.
//!
//! The [`Transport`] trait is the seam between the [`Gateway`] and the
//! network: [`SpeedrunApi`] talks to the real API using [`reqwest`], while
//! tests substitute the in-memory transport behind the `test-support` feature.
//!
//! [`Gateway`]: crate::gateway::Gateway

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;

use crate::gateway::GatewayError;

/// Public root of the v1 API. Paths passed to [`Transport::get`] are
/// appended to it verbatim.
pub const DEFAULT_ROOT_URL: &str = "https://www.speedrun.com/api/v1/";

/// Fetches one JSON document per call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET {root}{path}` and decode the body as JSON.
    ///
    /// Implementations return the decoded body even for error statuses;
    /// the API reports failures as `{ "status", "message" }` documents and
    /// the gateway inspects those itself.
    async fn get(&self, path: &str) -> Result<serde_json::Value, GatewayError>;
}

/// HTTP client for the speedrun.com API.
pub struct SpeedrunApi {
    client: reqwest::Client,
    root_url: String,
}

impl SpeedrunApi {
    /// Create a client for the API rooted at `root_url`, e.g.
    /// [`DEFAULT_ROOT_URL`]. A missing trailing slash is added.
    pub fn new(root_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), root_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, root_url: String) -> Self {
        let root_url = if root_url.ends_with('/') {
            root_url
        } else {
            format!("{root_url}/")
        };
        Self { client, root_url }
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    // ---- private helpers ----

    /// Decode the body of any response as JSON.
    ///
    /// A non-2xx response whose body is not JSON becomes
    /// [`GatewayError::ApiStatus`] carrying the raw body text.
    async fn parse_response(
        path: &str,
        response: reqwest::Response,
    ) -> Result<serde_json::Value, GatewayError> {
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => Err(GatewayError::ApiStatus {
                status: status.as_u16().to_string(),
                message: body,
            }),
            Err(e) => Err(GatewayError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl Transport for SpeedrunApi {
    async fn get(&self, path: &str) -> Result<serde_json::Value, GatewayError> {
        let response = self
            .client
            .get(format!("{}{}", self.root_url, path))
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;

        Self::parse_response(path, response).await
    }
}
