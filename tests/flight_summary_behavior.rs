//! Behavior-driven tests for flight summary reconciliation
//!
//! These tests verify HOW a summary is assembled from flight history, the route table and
//! airport movement fallbacks, and how results are cached.

use skyroute_core::{
    AircraftId, AirportDirectory, Clock, CredentialProvider, FlightRecord, FlightSummaryResolver,
    ManualClock, MovementKind, MovementLookup, OpenSkyClient, PersistentRouteCache,
    RouteLookup, RouteResolver, ScriptedHttpClient, SkyrouteConfig, SkyrouteServices, SourceTag,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const API: &str = "https://opensky.test/api";

#[derive(Default)]
struct StubMovements {
    departure: Option<FlightRecord>,
    arrival: Option<FlightRecord>,
    calls: AtomicUsize,
}

impl StubMovements {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MovementLookup for StubMovements {
    fn find<'a>(
        &'a self,
        kind: MovementKind,
        _airport: &'a str,
        _aircraft: &'a AircraftId,
        _reference_time: Option<i64>,
    ) -> Pin<Box<dyn Future<Output = Option<FlightRecord>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let found = match kind {
            MovementKind::Departure => self.departure.clone(),
            MovementKind::Arrival => self.arrival.clone(),
        };
        Box::pin(async move { found })
    }
}

fn summary_resolver(
    http: Arc<ScriptedHttpClient>,
    movements: Arc<StubMovements>,
) -> FlightSummaryResolver {
    let clock: Arc<dyn Clock> = Arc::new(ManualClock::fixed());
    let credentials = Arc::new(CredentialProvider::new(
        http.clone(),
        clock.clone(),
        None,
        Vec::new(),
    ));
    let client = Arc::new(OpenSkyClient::new(http, API, credentials));
    let directory = Arc::new(AirportDirectory::bundled());
    let routes = Arc::new(RouteResolver::new(
        client.clone(),
        Arc::new(PersistentRouteCache::memory_only(
            Duration::from_secs(3_600),
            clock.clone(),
        )),
        directory.clone(),
    ));
    FlightSummaryResolver::new(client, routes, movements, directory, clock)
}

fn movement(
    departure: Option<&str>,
    arrival: Option<&str>,
    first_seen: Option<i64>,
    last_seen: Option<i64>,
) -> FlightRecord {
    FlightRecord {
        aircraft_id: Some(String::from("abc123")),
        callsign: Some(String::from("ACA856")),
        departure_airport_code: departure.map(String::from),
        arrival_airport_code: arrival.map(String::from),
        first_seen_time: first_seen,
        last_seen_time: last_seen,
    }
}

// =============================================================================
// Flight Summary: Enrichment
// =============================================================================

#[tokio::test]
async fn when_primary_lacks_arrival_system_fills_it_from_movement_lookup() {
    // Given: History with a departure but no arrival, and a route ending at EGLL
    let http = Arc::new(
        ScriptedHttpClient::new()
            .with_json(
                format!("{API}/flights/aircraft"),
                r#"[{"icao24":"abc123","callsign":"ACA856","firstSeen":1000,"lastSeen":5000,
                     "estDepartureAirport":"CYYZ","estArrivalAirport":null}]"#,
            )
            .with_json(format!("{API}/routes"), r#"{"route":["CYYZ","EGLL"]}"#),
    );
    let movements = Arc::new(StubMovements {
        arrival: Some(movement(Some("CYUL"), Some("EGLL"), Some(900), Some(9000))),
        ..StubMovements::default()
    });
    let resolver = summary_resolver(http, movements.clone());

    // When: The summary is requested
    let summary = resolver
        .summarize("abc123", None)
        .await
        .expect("summary resolves")
        .expect("flight found");

    // Then: The arrival comes from the fallback and the primary departure is untouched
    assert_eq!(summary.source_tag, SourceTag::Enriched);
    assert_eq!(summary.arrival_airport_code.as_deref(), Some("EGLL"));
    assert_eq!(summary.departure_airport_code.as_deref(), Some("CYYZ"));
    assert_eq!(summary.departure_time, Some(1000));
    assert_eq!(summary.arrival_time, Some(5000));
    assert_eq!(
        summary.route,
        Some(vec![String::from("CYYZ"), String::from("EGLL")])
    );

    // And: Only the missing side was looked up
    assert_eq!(movements.calls(), 1);

    // And: Airport details come from the route's pre-fetched directory entries
    let arrival = summary.arrival_detail.expect("arrival detail");
    assert_eq!(arrival.code, "EGLL");
    assert_eq!(arrival.city.as_deref(), Some("London"));
}

#[tokio::test]
async fn when_hint_callsign_differs_system_uses_primary_callsign_for_route() {
    // Given: History reporting callsign ACA856 while the caller hints a stale one
    let http = Arc::new(
        ScriptedHttpClient::new()
            .with_json(
                format!("{API}/flights/aircraft"),
                r#"[{"icao24":"abc123","callsign":"ACA856","estDepartureAirport":"CYYZ"}]"#,
            )
            .with_json(
                format!("{API}/routes?callsign=ACA856"),
                r#"{"route":["CYYZ","EGLL"]}"#,
            )
            .with_json(
                format!("{API}/routes?callsign=OLD1"),
                r#"{"route":["KBOS","KJFK"]}"#,
            ),
    );
    let movements = Arc::new(StubMovements {
        arrival: Some(movement(None, Some("EGLL"), None, Some(9000))),
        ..StubMovements::default()
    });
    let resolver = summary_resolver(http, movements);

    // When: The summary is requested with the stale hint
    let summary = resolver
        .summarize("abc123", Some("old1"))
        .await
        .expect("summary resolves")
        .expect("flight found");

    // Then: The route follows the primary record's callsign
    assert_eq!(summary.callsign.as_deref(), Some("ACA856"));
    assert_eq!(
        summary.route,
        Some(vec![String::from("CYYZ"), String::from("EGLL")])
    );
}

// =============================================================================
// Flight Summary: Reconstruction
// =============================================================================

#[tokio::test]
async fn when_history_is_empty_system_reconstructs_from_route_and_movements() {
    // Given: No history, a published route and matching movements at both ends
    let http = Arc::new(
        ScriptedHttpClient::new()
            .with_json(format!("{API}/flights/aircraft"), "[]")
            .with_json(format!("{API}/routes"), r#"{"route":["CYYZ","EGLL"]}"#),
    );
    let movements = Arc::new(StubMovements {
        departure: Some(movement(None, None, Some(1000), None)),
        arrival: Some(movement(None, None, None, Some(9000))),
        ..StubMovements::default()
    });
    let resolver = summary_resolver(http, movements.clone());

    // When: The summary is requested with a callsign hint
    let summary = resolver
        .summarize("abc123", Some("aca856"))
        .await
        .expect("summary resolves")
        .expect("flight reconstructed");

    // Then: The summary is tagged as reconstructed and both ends are filled
    assert_eq!(summary.source_tag, SourceTag::Reconstructed);
    assert_eq!(summary.departure_airport_code.as_deref(), Some("CYYZ"));
    assert_eq!(summary.arrival_airport_code.as_deref(), Some("EGLL"));
    assert_eq!(summary.departure_time, Some(1000));
    assert_eq!(summary.arrival_time, Some(9000));
    assert_eq!(summary.callsign.as_deref(), Some("ACA856"));
    assert_eq!(movements.calls(), 2);
}

// =============================================================================
// Flight Summary: Negative Caching
// =============================================================================

#[tokio::test]
async fn when_nothing_is_found_system_caches_null_result() {
    // Given: No history, no route and empty movement stubs
    let http = Arc::new(
        ScriptedHttpClient::new().with_json(format!("{API}/flights/aircraft"), "[]"),
    );
    let movements = Arc::new(StubMovements::default());
    let resolver = summary_resolver(http.clone(), movements.clone());

    // When: The same aircraft is summarised twice within the TTL
    let first = resolver
        .summarize("ABC123", Some("ZZZ999"))
        .await
        .expect("first call");
    let requests_after_first = http.total_requests();
    let second = resolver
        .summarize("abc123", Some("ZZZ999"))
        .await
        .expect("second call");

    // Then: Both calls return null and the second touches nothing
    assert_eq!(first, None);
    assert_eq!(second, None);
    assert_eq!(http.total_requests(), requests_after_first);
    assert_eq!(movements.calls(), 0);
}

// =============================================================================
// Flight Summary: Route Snapshot Durability
// =============================================================================

#[tokio::test]
async fn when_summary_runs_without_warm_up_system_keeps_routes_already_on_disk() {
    // Given: A snapshot holding a route resolved by an earlier process
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("route-cache.json");
    let clock = Arc::new(ManualClock::fixed());
    let config = SkyrouteConfig::default()
        .with_api_url(API)
        .with_route_cache_path(Some(path.clone()));
    let earlier = Arc::new(ScriptedHttpClient::new().with_json(
        format!("{API}/routes"),
        r#"{"route":["EGLL","KJFK"]}"#,
    ));
    SkyrouteServices::with_transport(&config, earlier, clock.clone())
        .expect("services")
        .routes
        .resolve("BAW117")
        .await
        .expect("lookup")
        .expect("route");

    // When: Fresh services summarise another aircraft without warming up first
    let http = Arc::new(
        ScriptedHttpClient::new()
            .with_json(format!("{API}/flights/aircraft"), "[]")
            .with_json(format!("{API}/routes"), r#"{"callsign":"ZZZ999","route":[]}"#),
    );
    let services =
        SkyrouteServices::with_transport(&config, http.clone(), clock).expect("services");
    let summary = services
        .summaries
        .summarize("abc123", Some("ZZZ999"))
        .await
        .expect("summary");

    // Then: The new miss is persisted alongside the earlier route
    assert_eq!(summary, None);
    let raw = std::fs::read_to_string(&path).expect("snapshot written");
    let snapshot: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(snapshot["BAW117"]["value"]["route"][1], "KJFK");
    assert!(snapshot["ZZZ999"]["value"].is_null());

    // And: The earlier route is served without another upstream call
    assert!(matches!(
        services.routes.cache().get("BAW117").await,
        Some(RouteLookup::Found(_))
    ));
    assert_eq!(http.request_count(&format!("{API}/routes")), 1);
}
