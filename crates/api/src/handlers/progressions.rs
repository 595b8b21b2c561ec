//! Handlers for the `/progressions` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use bests_core::request::ProgressionRequest;
use bests_speedrun::service::ProgressionReport;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Restrict the report to units matching this selector.
    pub unit: Option<String>,
}

/// GET /api/v1/progressions/{descriptor}?unit=
///
/// `descriptor` is `game[+game...][@competitor]`, e.g. `wc2+wc2btdp@ZPR`.
pub async fn report(
    State(state): State<AppState>,
    Path(descriptor): Path<String>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<DataResponse<ProgressionReport>>> {
    let mut request = ProgressionRequest::parse(&descriptor)?;
    if let Some(unit) = query.unit {
        request = request.with_unit_filter(unit);
    }

    let report = state.service.report(&request).await?;
    Ok(Json(DataResponse { data: report }))
}
