//! Flight summary orchestration.
//!
//! A summary starts from the aircraft's flight history. When history is empty the summary is
//! reconstructed from the published route plus airport movement lookups; when history lacks
//! an endpoint it is enriched the same way. Movement and route lookups are best-effort and
//! bounded by a timeout. Results, including "no flight found", are cached per aircraft.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::airports::AirportDirectory;
use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::domain::{
    AircraftId, AirportDetail, Callsign, FlightRecord, FlightSummary, RouteRecord, SourceTag,
};
use crate::error::CoreError;
use crate::movements::{MovementKind, MovementLookup};
use crate::opensky::OpenSkyClient;
use crate::routes::RouteResolver;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(120);
const DEFAULT_HISTORY_LOOKBACK: Duration = Duration::from_secs(6 * 60 * 60);
const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

pub struct FlightSummaryResolver {
    client: Arc<OpenSkyClient>,
    routes: Arc<RouteResolver>,
    movements: Arc<dyn MovementLookup>,
    directory: Arc<AirportDirectory>,
    clock: Arc<dyn Clock>,
    cache: TtlCache<String, Option<FlightSummary>>,
    history_lookback: Duration,
    fallback_timeout: Duration,
}

impl FlightSummaryResolver {
    pub fn new(
        client: Arc<OpenSkyClient>,
        routes: Arc<RouteResolver>,
        movements: Arc<dyn MovementLookup>,
        directory: Arc<AirportDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cache: TtlCache::with_clock(DEFAULT_CACHE_TTL, clock.clone()),
            client,
            routes,
            movements,
            directory,
            clock,
            history_lookback: DEFAULT_HISTORY_LOOKBACK,
            fallback_timeout: DEFAULT_FALLBACK_TIMEOUT,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = TtlCache::with_clock(ttl, self.clock.clone());
        self
    }

    pub fn with_history_lookback(mut self, lookback: Duration) -> Self {
        self.history_lookback = lookback;
        self
    }

    pub fn with_fallback_timeout(mut self, timeout: Duration) -> Self {
        self.fallback_timeout = timeout;
        self
    }

    pub fn cache(&self) -> &TtlCache<String, Option<FlightSummary>> {
        &self.cache
    }

    /// Answers "what flight is this aircraft on".
    ///
    /// Returns a validation error for a malformed id and an upstream error when the history
    /// endpoint fails; neither is cached. Route and movement failures only narrow the result.
    pub async fn summarize(
        &self,
        aircraft_id: &str,
        callsign_hint: Option<&str>,
    ) -> Result<Option<FlightSummary>, CoreError> {
        let aircraft = AircraftId::parse(aircraft_id)?;
        if let Some(cached) = self.cache.get(aircraft.as_str()).await {
            debug!(%aircraft, "flight summary cache hit");
            return Ok(cached);
        }

        let hint = callsign_hint.and_then(Callsign::parse);
        let end = self.clock.now().unix_timestamp();
        let lookback = i64::try_from(self.history_lookback.as_secs()).unwrap_or(i64::MAX);
        let begin = end.saturating_sub(lookback);

        let (history, hinted_route) = tokio::join!(
            self.client.flights_by_aircraft(&aircraft, begin, end),
            self.lookup_route(hint.as_ref()),
        );
        // Upstream lists flights oldest first; the last entry is the current one.
        let primary = history?.pop();

        let callsign = primary
            .as_ref()
            .and_then(|record| record.callsign.as_deref())
            .and_then(Callsign::parse)
            .or(hint.clone());
        let route = if callsign == hint {
            hinted_route
        } else {
            self.lookup_route(callsign.as_ref()).await
        };

        let summary = match primary {
            Some(primary) => Some(self.enrich(&aircraft, primary, route.as_ref()).await),
            None => self.reconstruct(&aircraft, route.as_ref()).await,
        }
        .map(|(record, tag)| self.build_summary(&aircraft, record, tag, callsign, route.as_ref()));

        info!(
            %aircraft,
            source = summary.as_ref().map_or("none", |summary| summary.source_tag.as_str()),
            "resolved flight summary"
        );
        self.cache
            .set(aircraft.as_str().to_string(), summary.clone(), None)
            .await;
        Ok(summary)
    }

    async fn lookup_route(&self, callsign: Option<&Callsign>) -> Option<RouteRecord> {
        let callsign = callsign?;
        match self
            .bounded("route", self.routes.resolve(callsign.as_str()))
            .await?
        {
            Ok(route) => route,
            Err(error) => {
                warn!(%callsign, %error, "route lookup failed; continuing without route");
                None
            }
        }
    }

    async fn reconstruct(
        &self,
        aircraft: &AircraftId,
        route: Option<&RouteRecord>,
    ) -> Option<(FlightRecord, SourceTag)> {
        let route = route?;
        let origin = Some(route.origin_code.as_str());
        let destination = Some(route.destination_code.as_str());
        let (departure, arrival) = tokio::join!(
            self.find_movement(MovementKind::Departure, origin, aircraft, None),
            self.find_movement(MovementKind::Arrival, destination, aircraft, None),
        );
        if departure.is_none() && arrival.is_none() {
            debug!(%aircraft, "no movements matched; nothing to reconstruct");
            return None;
        }

        let mut record = FlightRecord {
            aircraft_id: Some(aircraft.to_string()),
            ..FlightRecord::default()
        };
        merge_movements(
            &mut record,
            [
                (MovementKind::Departure, route.origin_code.as_str(), departure.as_ref()),
                (MovementKind::Arrival, route.destination_code.as_str(), arrival.as_ref()),
            ],
        );
        Some((record, SourceTag::Reconstructed))
    }

    async fn enrich(
        &self,
        aircraft: &AircraftId,
        primary: FlightRecord,
        route: Option<&RouteRecord>,
    ) -> (FlightRecord, SourceTag) {
        let needs_departure = !primary.has_departure();
        let needs_arrival = !primary.has_arrival();
        let Some(route) = route.filter(|_| needs_departure || needs_arrival) else {
            return (primary, SourceTag::Primary);
        };

        let reference_time = primary.reference_time();
        let origin = needs_departure.then_some(route.origin_code.as_str());
        let destination = needs_arrival.then_some(route.destination_code.as_str());
        let (departure, arrival) = tokio::join!(
            self.find_movement(MovementKind::Departure, origin, aircraft, reference_time),
            self.find_movement(MovementKind::Arrival, destination, aircraft, reference_time),
        );

        let mut record = primary;
        merge_movements(
            &mut record,
            [
                (MovementKind::Departure, route.origin_code.as_str(), departure.as_ref()),
                (MovementKind::Arrival, route.destination_code.as_str(), arrival.as_ref()),
            ],
        );

        let filled = (needs_departure && record.has_departure())
            || (needs_arrival && record.has_arrival());
        let tag = if filled {
            SourceTag::Enriched
        } else {
            SourceTag::Primary
        };
        (record, tag)
    }

    async fn find_movement(
        &self,
        kind: MovementKind,
        airport: Option<&str>,
        aircraft: &AircraftId,
        reference_time: Option<i64>,
    ) -> Option<FlightRecord> {
        let airport = airport?;
        self.bounded(
            kind.as_str(),
            self.movements.find(kind, airport, aircraft, reference_time),
        )
        .await
        .flatten()
    }

    async fn bounded<T>(&self, what: &str, future: impl Future<Output = T>) -> Option<T> {
        match tokio::time::timeout(self.fallback_timeout, future).await {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(lookup = what, timeout = ?self.fallback_timeout, "lookup timed out");
                None
            }
        }
    }

    fn build_summary(
        &self,
        aircraft: &AircraftId,
        record: FlightRecord,
        source_tag: SourceTag,
        callsign: Option<Callsign>,
        route: Option<&RouteRecord>,
    ) -> FlightSummary {
        let departure_time = record.first_seen_time;
        let arrival_time = record.last_seen_time;
        let departure_detail = record
            .departure_airport_code
            .as_deref()
            .map(|code| self.airport_detail(code, route).observed_at(departure_time));
        let arrival_detail = record
            .arrival_airport_code
            .as_deref()
            .map(|code| self.airport_detail(code, route).observed_at(arrival_time));

        FlightSummary {
            aircraft_id: aircraft.to_string(),
            callsign: record
                .callsign
                .or_else(|| callsign.map(String::from))
                .or_else(|| route.map(|route| route.callsign.clone())),
            departure_airport_code: record.departure_airport_code,
            arrival_airport_code: record.arrival_airport_code,
            departure_time,
            arrival_time,
            route: route.map(|route| route.airports.clone()),
            source_tag,
            departure_detail,
            arrival_detail,
        }
    }

    /// Prefers the detail the route already carries for `code`.
    fn airport_detail(&self, code: &str, route: Option<&RouteRecord>) -> AirportDetail {
        route
            .and_then(|route| {
                [&route.origin_detail, &route.destination_detail]
                    .into_iter()
                    .find(|detail| detail.code.eq_ignore_ascii_case(code))
                    .cloned()
            })
            .unwrap_or_else(|| self.directory.detail(code))
    }
}

/// Folds movement results into `record` without overwriting present fields.
///
/// Each lookup first supplies its own side (the searched airport and its event time), then
/// any remaining gaps are backfilled from whatever else the lookups returned.
fn merge_movements<'a>(
    record: &mut FlightRecord,
    lookups: [(MovementKind, &'a str, Option<&'a FlightRecord>); 2],
) {
    for (kind, airport, found) in lookups {
        let Some(found) = found else { continue };
        match kind {
            MovementKind::Departure => {
                fill(
                    &mut record.departure_airport_code,
                    found
                        .departure_airport_code
                        .clone()
                        .or_else(|| Some(airport.to_string())),
                );
                fill(&mut record.first_seen_time, found.first_seen_time);
            }
            MovementKind::Arrival => {
                fill(
                    &mut record.arrival_airport_code,
                    found
                        .arrival_airport_code
                        .clone()
                        .or_else(|| Some(airport.to_string())),
                );
                fill(&mut record.last_seen_time, found.last_seen_time);
            }
        }
    }

    for (_, _, found) in lookups {
        let Some(found) = found else { continue };
        fill(&mut record.callsign, found.callsign.clone());
        fill(&mut record.departure_airport_code, found.departure_airport_code.clone());
        fill(&mut record.arrival_airport_code, found.arrival_airport_code.clone());
        fill(&mut record.first_seen_time, found.first_seen_time);
        fill(&mut record.last_seen_time, found.last_seen_time);
    }
}

fn fill<T>(slot: &mut Option<T>, candidate: Option<T>) {
    if slot.is_none() {
        *slot = candidate;
    }
}
