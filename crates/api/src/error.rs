use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bests_core::error::CoreError;
use bests_speedrun::gateway::GatewayError;
use bests_speedrun::service::ServiceError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `bests_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure while fetching or assembling progressions.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Service(service) => match service {
                ServiceError::Core(core) => classify_core_error(core),
                ServiceError::Gateway(gateway) => classify_gateway_error(gateway),
                ServiceError::UnitNotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", service.to_string())
                }
            },
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Invalid requests are the caller's fault; anything else means the
/// leaderboard served data we could not normalize.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::InvalidRequest(msg) => {
            (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
        }
        CoreError::DurationParse(_) | CoreError::Validation(_) => {
            tracing::error!(error = %err, "Leaderboard data failed normalization");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATA_INTEGRITY",
                err.to_string(),
            )
        }
    }
}

/// Upstream 404s pass through; every other upstream failure is a 502.
fn classify_gateway_error(err: &GatewayError) -> (StatusCode, &'static str, String) {
    match err {
        GatewayError::ApiStatus { status, .. } if status == "404" => {
            (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
        }
        GatewayError::ApiStatus { .. } => (StatusCode::BAD_GATEWAY, "API_STATUS", err.to_string()),
        GatewayError::PaginationOverflow { .. } => {
            (StatusCode::BAD_GATEWAY, "PAGINATION_OVERFLOW", err.to_string())
        }
        GatewayError::Request(_) | GatewayError::Decode { .. } => {
            tracing::error!(error = %err, "Leaderboard request failed");
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
        }
    }
}
