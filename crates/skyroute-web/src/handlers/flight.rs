use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use skyroute_core::{AircraftId, FlightSummary, FlightTrack, ValidationError};

use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub icao24: Option<String>,
    pub callsign: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrackParams {
    pub icao24: Option<String>,
}

/// `GET /api/flight/summary?icao24&callsign` answers `null` when no flight is found.
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<Option<FlightSummary>>> {
    let icao24 = params.icao24.ok_or(ValidationError::MissingAircraftId)?;
    let summary = state
        .services
        .summaries
        .summarize(&icao24, params.callsign.as_deref())
        .await?;
    Ok(Json(summary))
}

/// `GET /api/flight/track?icao24`
pub async fn track(
    State(state): State<AppState>,
    Query(params): Query<TrackParams>,
) -> Result<Json<FlightTrack>> {
    let raw = params.icao24.ok_or(ValidationError::MissingAircraftId)?;
    let aircraft = AircraftId::parse(&raw)?;
    let track = state.services.client.track(&aircraft).await?;
    Ok(Json(track))
}
