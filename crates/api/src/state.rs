use std::sync::Arc;

use bests_speedrun::service::ProgressionService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the service (and the gateway cache it owns) is shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub service: Arc<ProgressionService>,
}
