use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use skyroute_core::AirspaceSnapshot;

use crate::error::Result;
use crate::state::AppState;

/// `GET /api/airspace?lamin&lomin&lamax&lomax`
///
/// Raw strings are taken so that a bad coordinate is reported by name.
pub async fn airspace(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<AirspaceSnapshot>> {
    let param = |name: &str| params.get(name).map(String::as_str);
    let snapshot = state
        .services
        .airspace
        .query(param("lamin"), param("lomin"), param("lamax"), param("lomax"))
        .await?;
    Ok(Json(snapshot))
}
