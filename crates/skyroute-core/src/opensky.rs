//! OpenSky REST adapter: URL construction, auth selection and payload normalisation.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::BasicCredentials;
use crate::credentials::CredentialProvider;
use crate::domain::{
    Aircraft, AircraftId, AirspaceSnapshot, BoundingBox, Callsign, FlightRecord, FlightTrack,
};
use crate::error::UpstreamError;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse};
use crate::movements::MovementKind;

/// Minimum positional length of a usable state vector row.
const STATE_VECTOR_LEN: usize = 17;

pub struct OpenSkyClient {
    http_client: Arc<dyn HttpClient>,
    api_url: String,
    credentials: Arc<CredentialProvider>,
    basic: Option<BasicCredentials>,
    timeout_ms: u64,
}

impl OpenSkyClient {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        api_url: impl Into<String>,
        credentials: Arc<CredentialProvider>,
    ) -> Self {
        Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            credentials,
            basic: None,
            timeout_ms: 10_000,
        }
    }

    pub fn with_basic(mut self, basic: Option<BasicCredentials>) -> Self {
        self.basic = basic;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Picks bearer, then basic, then no auth.
    ///
    /// A failed token renewal falls back to basic auth when configured and is returned as
    /// an error otherwise.
    pub async fn resolve_auth(&self) -> Result<HttpAuth, UpstreamError> {
        match self.credentials.token().await {
            Ok(Some(token)) => Ok(HttpAuth::Bearer(token.value)),
            Ok(None) => Ok(self.basic_auth()),
            Err(error) if self.basic.is_some() => {
                warn!(%error, "token renewal failed; falling back to basic auth");
                Ok(self.basic_auth())
            }
            Err(error) => Err(error),
        }
    }

    fn basic_auth(&self) -> HttpAuth {
        match &self.basic {
            Some(basic) => HttpAuth::Basic {
                username: basic.username.clone(),
                password: basic.password.clone(),
            },
            None => HttpAuth::None,
        }
    }

    /// Live state vectors inside `bbox`.
    pub async fn states(&self, bbox: &BoundingBox) -> Result<AirspaceSnapshot, UpstreamError> {
        let url = format!(
            "{}/states/all?lamin={}&lomin={}&lamax={}&lomax={}",
            self.api_url, bbox.lamin, bbox.lomin, bbox.lamax, bbox.lomax
        );
        let auth = self.resolve_auth().await?;
        let response = self.send("states", &url, &auth).await?;
        if !response.is_success() {
            if response.status == 401 && matches!(auth, HttpAuth::Bearer(_)) {
                self.credentials.invalidate().await;
            }
            warn!(status = response.status, "states/all error");
            return Err(UpstreamError::from_status(response.status, response.body));
        }

        let payload: Value = parse_json("states", &response.body)?;
        Ok(normalize_states(&payload))
    }

    /// Flights flown by `aircraft` between `begin` and `end` (unix seconds). A 404 means
    /// no flights in the window.
    pub async fn flights_by_aircraft(
        &self,
        aircraft: &AircraftId,
        begin: i64,
        end: i64,
    ) -> Result<Vec<FlightRecord>, UpstreamError> {
        let url = format!(
            "{}/flights/aircraft?icao24={}&begin={begin}&end={end}",
            self.api_url,
            urlencoding::encode(aircraft.as_str())
        );
        self.flights("flight history", &url).await
    }

    /// Arrivals or departures at `airport` between `begin` and `end`. A 404 means no
    /// movements in the window.
    pub async fn airport_movements(
        &self,
        kind: MovementKind,
        airport: &str,
        begin: i64,
        end: i64,
    ) -> Result<Vec<FlightRecord>, UpstreamError> {
        let url = format!(
            "{}/flights/{}?airport={}&begin={begin}&end={end}",
            self.api_url,
            kind.as_str(),
            urlencoding::encode(airport)
        );
        self.flights(kind.as_str(), &url).await
    }

    /// Most recent recorded track for `aircraft`.
    pub async fn track(&self, aircraft: &AircraftId) -> Result<FlightTrack, UpstreamError> {
        let url = format!(
            "{}/tracks/all?icao24={}&time=0",
            self.api_url,
            urlencoding::encode(aircraft.as_str())
        );
        let auth = self.resolve_auth().await?;
        let response = self.send("track", &url, &auth).await?;
        if !response.is_success() {
            return Err(UpstreamError::from_status(response.status, response.body));
        }

        let payload: TrackPayload = parse_json("track", &response.body)?;
        Ok(payload.into_track(aircraft))
    }

    /// Published route for `callsign`. Always sent without credentials.
    ///
    /// `Ok(None)` is an empty or malformed route list.
    pub async fn route(&self, callsign: &Callsign) -> Result<Option<Vec<String>>, UpstreamError> {
        let url = format!(
            "{}/routes?callsign={}",
            self.api_url,
            urlencoding::encode(callsign.as_str())
        );
        let response = self.send("routes", &url, &HttpAuth::None).await?;
        if !response.is_success() {
            return Err(UpstreamError::from_status(
                response.status,
                format!("route lookup for {callsign} returned {}", response.status),
            ));
        }

        Ok(serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|payload| route_airports(&payload)))
    }

    async fn flights(&self, what: &str, url: &str) -> Result<Vec<FlightRecord>, UpstreamError> {
        let auth = self.resolve_auth().await?;
        let response = self.send(what, url, &auth).await?;
        if response.status == 404 {
            debug!(upstream = what, "no flights in window");
            return Ok(Vec::new());
        }
        if !response.is_success() {
            return Err(UpstreamError::from_status(response.status, response.body));
        }

        let payload: Vec<FlightPayload> = parse_json(what, &response.body)?;
        Ok(payload.into_iter().map(FlightRecord::from).collect())
    }

    async fn send(
        &self,
        what: &str,
        url: &str,
        auth: &HttpAuth,
    ) -> Result<HttpResponse, UpstreamError> {
        debug!(upstream = what, url, auth = auth.scheme(), "calling OpenSky");
        let request = HttpRequest::get(url)
            .with_auth(auth)
            .with_timeout_ms(self.timeout_ms);
        self.http_client
            .execute(request)
            .await
            .map_err(|error| UpstreamError::transport(what, &error))
    }
}

fn parse_json<T: DeserializeOwned>(what: &str, body: &str) -> Result<T, UpstreamError> {
    serde_json::from_str(body)
        .map_err(|error| UpstreamError::unavailable(format!("malformed {what} payload: {error}")))
}

/// Maps the positional `states` rows onto [`Aircraft`], dropping short rows and rows
/// without a finite position.
pub fn normalize_states(payload: &Value) -> AirspaceSnapshot {
    let aircraft = payload
        .get("states")
        .and_then(Value::as_array)
        .map(|rows| rows.iter().filter_map(normalize_state_row).collect())
        .unwrap_or_default();

    AirspaceSnapshot {
        time: payload.get("time").and_then(as_i64),
        aircraft,
    }
}

fn normalize_state_row(row: &Value) -> Option<Aircraft> {
    let fields = row.as_array().filter(|fields| fields.len() >= STATE_VECTOR_LEN)?;
    let lon = fields[5].as_f64().filter(|value| value.is_finite())?;
    let lat = fields[6].as_f64().filter(|value| value.is_finite())?;

    Some(Aircraft {
        icao24: as_string(&fields[0]).unwrap_or_default(),
        callsign: as_string(&fields[1])
            .map(|callsign| callsign.trim().to_string())
            .unwrap_or_default(),
        origin_country: as_string(&fields[2]),
        time_position: as_i64(&fields[3]),
        last_contact: as_i64(&fields[4]),
        lon,
        lat,
        baro_altitude: fields[7].as_f64(),
        on_ground: fields[8].as_bool(),
        velocity: fields[9].as_f64(),
        true_track: fields[10].as_f64(),
        vertical_rate: fields[11].as_f64(),
        geo_altitude: fields[13].as_f64(),
        squawk: as_string(&fields[14]),
        spi: fields[15].as_bool(),
        position_source: as_i64(&fields[16]),
    })
}

fn route_airports(payload: &Value) -> Option<Vec<String>> {
    let airports = payload
        .get("route")?
        .as_array()?
        .iter()
        .map(|code| {
            code.as_str()
                .map(|code| code.trim().to_ascii_uppercase())
                .filter(|code| !code.is_empty())
        })
        .collect::<Option<Vec<_>>>()?;
    (!airports.is_empty()).then_some(airports)
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|number| number as i64))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlightPayload {
    icao24: Option<String>,
    callsign: Option<String>,
    first_seen: Option<i64>,
    last_seen: Option<i64>,
    est_departure_airport: Option<String>,
    est_arrival_airport: Option<String>,
}

impl From<FlightPayload> for FlightRecord {
    fn from(payload: FlightPayload) -> Self {
        Self {
            aircraft_id: non_blank(payload.icao24).map(|id| id.to_ascii_lowercase()),
            callsign: non_blank(payload.callsign),
            departure_airport_code: non_blank(payload.est_departure_airport),
            arrival_airport_code: non_blank(payload.est_arrival_airport),
            first_seen_time: payload.first_seen,
            last_seen_time: payload.last_seen,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackPayload {
    icao24: Option<String>,
    callsign: Option<String>,
    start_time: Option<Value>,
    end_time: Option<Value>,
    #[serde(default)]
    path: Vec<Vec<Value>>,
}

impl TrackPayload {
    fn into_track(self, requested: &AircraftId) -> FlightTrack {
        // Waypoints are [time, lat, lon, baro_altitude, true_track, on_ground].
        let path = self
            .path
            .iter()
            .filter_map(|waypoint| {
                let lat = waypoint.get(1)?.as_f64().filter(|value| value.is_finite())?;
                let lon = waypoint.get(2)?.as_f64().filter(|value| value.is_finite())?;
                Some([lat, lon])
            })
            .collect();

        FlightTrack {
            icao24: non_blank(self.icao24).unwrap_or_else(|| requested.to_string()),
            callsign: non_blank(self.callsign),
            start_time: self.start_time.as_ref().and_then(as_i64),
            end_time: self.end_time.as_ref().and_then(as_i64),
            path,
        }
    }
}
