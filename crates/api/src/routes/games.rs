//! Route definitions for the `/games` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::games;
use crate::state::AppState;

/// Routes mounted at `/games`.
///
/// ```text
/// GET /{slug}                          -> get_by_slug
/// GET /{slug}/units                    -> list_units
/// GET /{slug}/units/{unit}/timeline    -> unit_timeline
/// GET /{slug}/timelines                -> timelines
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{slug}", get(games::get_by_slug))
        .route("/{slug}/units", get(games::list_units))
        .route("/{slug}/units/{unit}/timeline", get(games::unit_timeline))
        .route("/{slug}/timelines", get(games::timelines))
}
