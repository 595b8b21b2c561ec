//! In-memory [`Transport`] serving canned responses.
//!
//! Used by tests in place of [`SpeedrunApi`](crate::api::SpeedrunApi).
//! Responses are queued per exact path: each call consumes the front of
//! the queue until one response remains, which is then repeated.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::api::Transport;
use crate::gateway::GatewayError;

#[derive(Default)]
pub struct MemoryTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, GatewayError>>>>,
    requests: Mutex<Vec<String>>,
    latency: Option<Duration>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency`, so concurrent callers overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a JSON document for `path`.
    pub fn respond(self, path: impl Into<String>, body: Value) -> Self {
        self.push(path.into(), Ok(body))
    }

    /// Queue a transport failure for `path`.
    pub fn fail(self, path: impl Into<String>, error: GatewayError) -> Self {
        self.push(path.into(), Err(error))
    }

    /// Every path requested so far, in order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    /// How many times `path` was requested.
    pub async fn request_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|p| p.as_str() == path)
            .count()
    }

    fn push(mut self, path: String, response: Result<Value, GatewayError>) -> Self {
        self.responses
            .get_mut()
            .entry(path)
            .or_default()
            .push_back(response);
        self
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn get(&self, path: &str) -> Result<Value, GatewayError> {
        self.requests.lock().await.push(path.to_string());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let mut responses = self.responses.lock().await;
        let queue = responses.get_mut(path);
        let response = match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        response.unwrap_or_else(|| {
            Err(GatewayError::ApiStatus {
                status: "404".to_string(),
                message: format!("no canned response for {path}"),
            })
        })
    }
}
