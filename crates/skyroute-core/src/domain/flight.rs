use serde::{Deserialize, Serialize};

/// Raw flight as reported by the history and airport movement endpoints.
///
/// Every field may be absent upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    pub aircraft_id: Option<String>,
    pub callsign: Option<String>,
    pub departure_airport_code: Option<String>,
    pub arrival_airport_code: Option<String>,
    pub first_seen_time: Option<i64>,
    pub last_seen_time: Option<i64>,
}

impl FlightRecord {
    pub const fn has_departure(&self) -> bool {
        self.departure_airport_code.is_some()
    }

    pub const fn has_arrival(&self) -> bool {
        self.arrival_airport_code.is_some()
    }

    /// Time to centre a movement search on: last contact if known, else first.
    pub fn reference_time(&self) -> Option<i64> {
        self.last_seen_time.or(self.first_seen_time)
    }
}

/// Airport information attached to one end of a flight.
///
/// `time` is the movement event time, not a property of the airport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportDetail {
    pub code: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "time")]
    pub observed_time: Option<i64>,
}

impl AirportDetail {
    /// Detail with only the code known.
    pub fn bare(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: None,
            city: None,
            country: None,
            observed_time: None,
        }
    }

    pub fn observed_at(mut self, time: Option<i64>) -> Self {
        self.observed_time = time;
        self
    }
}

/// How a [`FlightSummary`] was assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    /// Taken from the history endpoint as-is.
    Primary,
    /// No history record existed; built from route and movement lookups.
    Reconstructed,
    /// History record existed but a missing endpoint was filled from movement lookups.
    Enriched,
}

impl SourceTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Reconstructed => "reconstructed",
            Self::Enriched => "enriched",
        }
    }
}

/// Reconciled "what flight is this aircraft on" record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSummary {
    #[serde(rename = "icao24")]
    pub aircraft_id: String,
    pub callsign: Option<String>,
    pub departure_airport_code: Option<String>,
    pub arrival_airport_code: Option<String>,
    pub departure_time: Option<i64>,
    pub arrival_time: Option<i64>,
    pub route: Option<Vec<String>>,
    #[serde(rename = "source")]
    pub source_tag: SourceTag,
    #[serde(rename = "departure")]
    pub departure_detail: Option<AirportDetail>,
    #[serde(rename = "arrival")]
    pub arrival_detail: Option<AirportDetail>,
}

/// Recorded trajectory of one aircraft as `[lat, lon]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightTrack {
    pub icao24: String,
    pub callsign: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub path: Vec<[f64; 2]>,
}
