use serde::{Deserialize, Serialize};

use super::AirportDetail;

/// Published itinerary for a callsign. `airports` is in itinerary order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    pub callsign: String,
    #[serde(rename = "route")]
    pub airports: Vec<String>,
    pub origin_code: String,
    pub destination_code: String,
    pub origin_detail: AirportDetail,
    pub destination_detail: AirportDetail,
}

/// Cached outcome of a route-table lookup.
///
/// `NoRoute` records a confirmed negative answer and is cached like a hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteLookup {
    Found(RouteRecord),
    NoRoute,
}

impl RouteLookup {
    pub fn into_route(self) -> Option<RouteRecord> {
        match self {
            Self::Found(route) => Some(route),
            Self::NoRoute => None,
        }
    }
}

impl From<Option<RouteRecord>> for RouteLookup {
    fn from(value: Option<RouteRecord>) -> Self {
        value.map_or(Self::NoRoute, Self::Found)
    }
}
