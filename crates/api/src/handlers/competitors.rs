//! Handlers for the `/competitors` resource.

use axum::extract::{Path, State};
use axum::Json;
use bests_core::entities::Competitor;
use bests_speedrun::normalize::PersonalBestScope;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/competitors/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<Competitor>>> {
    let competitor = state.service.competitor(&slug).await?;
    Ok(Json(DataResponse { data: competitor }))
}

/// GET /api/v1/competitors/{slug}/scope
///
/// Games and unit slugs the competitor holds personal bests in.
pub async fn scope(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<PersonalBestScope>>> {
    let scope = state.service.personal_best_scope(&slug).await?;
    Ok(Json(DataResponse { data: scope }))
}
