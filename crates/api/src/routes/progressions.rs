use axum::routing::get;
use axum::Router;

use crate::handlers::progressions;
use crate::state::AppState;

/// Routes mounted at `/progressions`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{descriptor}", get(progressions::report))
}
