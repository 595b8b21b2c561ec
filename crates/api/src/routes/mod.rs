pub mod competitors;
pub mod games;
pub mod health;
pub mod progressions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /games/{slug}                                    game metadata
/// /games/{slug}/units                              competitive units
/// /games/{slug}/units/{unit}/timeline              one unit's record timeline
/// /games/{slug}/timelines                          every unit, one run listing
///
/// /competitors/{slug}                              competitor profile
/// /competitors/{slug}/scope                        games and units with personal bests
///
/// /progressions/{descriptor}                       multi-game report
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/games", games::router())
        .nest("/competitors", competitors::router())
        .nest("/progressions", progressions::router())
}
