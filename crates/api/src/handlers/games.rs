//! Handlers for the `/games` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use bests_core::entities::{CompetitiveUnit, Competitor, Game};
use bests_core::error::CoreError;
use bests_speedrun::service::UnitProgression;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompetitorQuery {
    /// Competitor slug for the personal-record stream.
    pub competitor: Option<String>,
}

/// One unit's timeline as served to renderers.
#[derive(Debug, Serialize)]
pub struct UnitTimeline {
    pub unit: CompetitiveUnit,
    pub competitor: Option<Competitor>,
    #[serde(flatten)]
    pub progression: UnitProgression,
}

/// GET /api/v1/games/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<Game>>> {
    let game = state.service.game(&slug).await?;
    Ok(Json(DataResponse { data: game }))
}

/// GET /api/v1/games/{slug}/units
pub async fn list_units(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<Vec<CompetitiveUnit>>>> {
    let units = state.service.competitive_units(&slug).await?;
    Ok(Json(DataResponse { data: units }))
}

/// GET /api/v1/games/{slug}/timelines?competitor=
///
/// Every unit of the game, computed from one game-wide run listing.
pub async fn timelines(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<CompetitorQuery>,
) -> AppResult<Json<DataResponse<Vec<UnitTimeline>>>> {
    let competitor = resolve_competitor(&state, query.competitor).await?;
    let timelines = state
        .service
        .game_progressions(&slug, competitor.as_ref())
        .await?
        .into_iter()
        .map(|(unit, progression)| UnitTimeline {
            unit,
            competitor: competitor.clone(),
            progression,
        })
        .collect();
    Ok(Json(DataResponse { data: timelines }))
}

/// GET /api/v1/games/{slug}/units/{unit}/timeline?competitor=
pub async fn unit_timeline(
    State(state): State<AppState>,
    Path((slug, unit)): Path<(String, String)>,
    Query(query): Query<CompetitorQuery>,
) -> AppResult<Json<DataResponse<UnitTimeline>>> {
    let competitor = resolve_competitor(&state, query.competitor).await?;
    let (unit, progression) = state
        .service
        .unit_progression(&slug, &unit, competitor.as_ref())
        .await?;
    Ok(Json(DataResponse {
        data: UnitTimeline {
            unit,
            competitor,
            progression,
        },
    }))
}

/// A blank `competitor` parameter is a malformed personal-record request.
async fn resolve_competitor(
    state: &AppState,
    slug: Option<String>,
) -> AppResult<Option<Competitor>> {
    match slug {
        None => Ok(None),
        Some(slug) if slug.trim().is_empty() => Err(CoreError::InvalidRequest(
            "personal records requested without a competitor".to_string(),
        )
        .into()),
        Some(slug) => Ok(Some(state.service.competitor(slug.trim()).await?)),
    }
}
