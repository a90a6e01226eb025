use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use skyroute_core::{AirportDetail, Callsign, RouteRecord};

use crate::error::Result;
use crate::state::AppState;

/// Route lookup response; every field is `null` when no route is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub callsign: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub route: Option<Vec<String>>,
    pub from_airport: Option<AirportDetail>,
    pub to_airport: Option<AirportDetail>,
}

impl RouteResponse {
    pub fn empty(callsign: Option<String>) -> Self {
        Self {
            callsign,
            from: None,
            to: None,
            route: None,
            from_airport: None,
            to_airport: None,
        }
    }
}

impl From<RouteRecord> for RouteResponse {
    fn from(record: RouteRecord) -> Self {
        Self {
            callsign: Some(record.callsign),
            from: Some(record.origin_code),
            to: Some(record.destination_code),
            route: Some(record.airports),
            from_airport: Some(record.origin_detail),
            to_airport: Some(record.destination_detail),
        }
    }
}

/// `GET /api/routes/:callsign`
pub async fn route(
    State(state): State<AppState>,
    Path(callsign): Path<String>,
) -> Result<Json<RouteResponse>> {
    let resolved = state.services.routes.resolve(&callsign).await?;
    let response = match resolved {
        Some(record) => RouteResponse::from(record),
        None => RouteResponse::empty(Callsign::parse(&callsign).map(String::from)),
    };
    Ok(Json(response))
}
