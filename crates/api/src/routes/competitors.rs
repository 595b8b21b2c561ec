//! Route definitions for the `/competitors` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::competitors;
use crate::state::AppState;

/// Routes mounted at `/competitors`.
///
/// ```text
/// GET /{slug}          -> get_by_slug
/// GET /{slug}/scope    -> scope
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{slug}", get(competitors::get_by_slug))
        .route("/{slug}/scope", get(competitors::scope))
}
