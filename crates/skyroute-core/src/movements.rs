//! Best-effort lookup of one aircraft's departure or arrival at a named airport.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::domain::{AircraftId, FlightRecord};
use crate::opensky::OpenSkyClient;

/// Upper bound on the width of any movement search window.
pub const MAX_SEARCH_WINDOW: Duration = Duration::from_secs(48 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementKind {
    Departure,
    Arrival,
}

impl MovementKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Departure => "departure",
            Self::Arrival => "arrival",
        }
    }
}

/// Closed interval of unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub begin: i64,
    pub end: i64,
}

impl SearchWindow {
    /// `[reference - W, reference + W]` when a reference time is known, else `[now - W, now]`.
    /// `W` is clamped so the window never exceeds [`MAX_SEARCH_WINDOW`].
    pub fn around(lookback: Duration, reference_time: Option<i64>, now: i64) -> Self {
        let cap = MAX_SEARCH_WINDOW.as_secs() as i64;
        let lookback = i64::try_from(lookback.as_secs()).unwrap_or(i64::MAX);
        match reference_time {
            Some(reference) => {
                let half = lookback.min(cap / 2);
                Self {
                    begin: reference - half,
                    end: reference + half,
                }
            }
            None => Self {
                begin: now - lookback.min(cap),
                end: now,
            },
        }
    }

    pub const fn width(&self) -> i64 {
        self.end - self.begin
    }
}

/// Seam used by the summary resolver so fallback lookups can be stubbed.
pub trait MovementLookup: Send + Sync {
    /// First movement of `kind` at `airport` by `aircraft`, or `None`. Never fails.
    fn find<'a>(
        &'a self,
        kind: MovementKind,
        airport: &'a str,
        aircraft: &'a AircraftId,
        reference_time: Option<i64>,
    ) -> Pin<Box<dyn Future<Output = Option<FlightRecord>> + Send + 'a>>;
}

pub struct AirportMovementFinder {
    client: Arc<OpenSkyClient>,
    clock: Arc<dyn Clock>,
    lookback: Duration,
}

impl AirportMovementFinder {
    pub fn new(client: Arc<OpenSkyClient>, clock: Arc<dyn Clock>, lookback: Duration) -> Self {
        Self {
            client,
            clock,
            lookback,
        }
    }

    async fn search(
        &self,
        kind: MovementKind,
        airport: &str,
        aircraft: &AircraftId,
        reference_time: Option<i64>,
    ) -> Option<FlightRecord> {
        let now = self.clock.now().unix_timestamp();
        let window = SearchWindow::around(self.lookback, reference_time, now);

        let movements = match self
            .client
            .airport_movements(kind, airport, window.begin, window.end)
            .await
        {
            Ok(movements) => movements,
            Err(error) => {
                warn!(kind = kind.as_str(), airport, %error, "movement lookup failed");
                return None;
            }
        };

        let found = movements.into_iter().find(|record| {
            record
                .aircraft_id
                .as_deref()
                .is_some_and(|id| aircraft.matches(id))
        });
        debug!(
            kind = kind.as_str(),
            airport,
            %aircraft,
            hit = found.is_some(),
            "movement lookup finished"
        );
        found
    }
}

impl MovementLookup for AirportMovementFinder {
    fn find<'a>(
        &'a self,
        kind: MovementKind,
        airport: &'a str,
        aircraft: &'a AircraftId,
        reference_time: Option<i64>,
    ) -> Pin<Box<dyn Future<Output = Option<FlightRecord>> + Send + 'a>> {
        Box::pin(self.search(kind, airport, aircraft, reference_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::credentials::CredentialProvider;
    use crate::http_client::ScriptedHttpClient;

    const API: &str = "https://opensky.test/api";
    const HOUR: i64 = 3_600;

    fn finder(http: Arc<ScriptedHttpClient>) -> AirportMovementFinder {
        let clock = Arc::new(ManualClock::fixed());
        let credentials = Arc::new(CredentialProvider::new(
            http.clone(),
            clock.clone(),
            None,
            Vec::new(),
        ));
        let client = Arc::new(OpenSkyClient::new(http, API, credentials));
        AirportMovementFinder::new(client, clock, Duration::from_secs(3 * HOUR as u64))
    }

    fn aircraft() -> AircraftId {
        AircraftId::parse("abc123").expect("id")
    }

    #[test]
    fn window_centres_on_reference_time() {
        let window = SearchWindow::around(Duration::from_secs(3 * HOUR as u64), Some(10 * HOUR), 0);
        assert_eq!(window, SearchWindow { begin: 7 * HOUR, end: 13 * HOUR });
    }

    #[test]
    fn window_without_reference_ends_now() {
        let now = 100 * HOUR;
        let window = SearchWindow::around(Duration::from_secs(3 * HOUR as u64), None, now);
        assert_eq!(window, SearchWindow { begin: now - 3 * HOUR, end: now });
    }

    #[test]
    fn window_never_exceeds_cap() {
        let huge = Duration::from_secs(30 * 24 * HOUR as u64);
        assert_eq!(SearchWindow::around(huge, Some(500 * HOUR), 0).width(), 48 * HOUR);
        assert_eq!(SearchWindow::around(huge, None, 500 * HOUR).width(), 48 * HOUR);
    }

    #[tokio::test]
    async fn finds_first_case_insensitive_match() {
        let http = Arc::new(ScriptedHttpClient::new().with_json(
            format!("{API}/flights/arrival"),
            r#"[{"icao24":"ffffff","estArrivalAirport":"KJFK","lastSeen":1},
                {"icao24":"ABC123","estArrivalAirport":"KJFK","lastSeen":2},
                {"icao24":"abc123","estArrivalAirport":"KJFK","lastSeen":3}]"#,
        ));

        let found = finder(http.clone())
            .find(MovementKind::Arrival, "KJFK", &aircraft(), Some(10 * HOUR))
            .await
            .expect("match");
        assert_eq!(found.last_seen_time, Some(2));

        let url = &http.recorded_requests()[0].url;
        assert!(url.contains("airport=KJFK"));
        assert!(url.contains(&format!("begin={}", 7 * HOUR)));
    }

    #[tokio::test]
    async fn failures_and_misses_yield_none() {
        let not_found = Arc::new(ScriptedHttpClient::new());
        assert!(finder(not_found)
            .find(MovementKind::Departure, "EGLL", &aircraft(), None)
            .await
            .is_none());

        let broken = Arc::new(
            ScriptedHttpClient::new().with_response(format!("{API}/flights/departure"), 500, "x"),
        );
        assert!(finder(broken)
            .find(MovementKind::Departure, "EGLL", &aircraft(), None)
            .await
            .is_none());

        let unreachable =
            Arc::new(ScriptedHttpClient::new().with_failure(format!("{API}/flights"), "refused"));
        assert!(finder(unreachable)
            .find(MovementKind::Departure, "EGLL", &aircraft(), None)
            .await
            .is_none());
    }
}
