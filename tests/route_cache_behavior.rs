//! Behavior-driven tests for route resolution and the persistent route cache
//!
//! These tests verify HOW confirmed misses are memoised and how cached routes survive a
//! process restart through the snapshot file.

use skyroute_core::{
    AirportDetail, AirportDirectory, CredentialProvider, ManualClock, OpenSkyClient,
    PersistentRouteCache, RouteLookup, RouteRecord, RouteResolver, ScriptedHttpClient,
};
use std::sync::Arc;
use std::time::Duration;

const API: &str = "https://opensky.test/api";
const ROUTE_TTL: Duration = Duration::from_secs(600);

fn route_resolver(http: Arc<ScriptedHttpClient>, cache: Arc<PersistentRouteCache>) -> RouteResolver {
    let clock = Arc::new(ManualClock::fixed());
    let credentials = Arc::new(CredentialProvider::new(http.clone(), clock, None, Vec::new()));
    RouteResolver::new(
        Arc::new(OpenSkyClient::new(http, API, credentials)),
        cache,
        Arc::new(AirportDirectory::bundled()),
    )
}

fn sample_route() -> RouteRecord {
    RouteRecord {
        callsign: String::from("ACA856"),
        airports: vec![String::from("CYYZ"), String::from("EGLL")],
        origin_code: String::from("CYYZ"),
        destination_code: String::from("EGLL"),
        origin_detail: AirportDetail::bare("CYYZ"),
        destination_detail: AirportDetail::bare("EGLL"),
    }
}

// =============================================================================
// Route Resolution: Negative Caching
// =============================================================================

#[tokio::test]
async fn when_callsign_has_no_route_system_memoises_the_miss() {
    // Given: A route table that knows nothing about the callsign
    let http = Arc::new(ScriptedHttpClient::new().with_json(
        format!("{API}/routes"),
        r#"{"callsign":"ZZZ999","route":[]}"#,
    ));
    let cache = Arc::new(PersistentRouteCache::memory_only(
        ROUTE_TTL,
        Arc::new(ManualClock::fixed()),
    ));
    let resolver = route_resolver(http.clone(), cache.clone());

    // When: The callsign is resolved twice within the TTL
    let first = resolver.resolve("zzz999").await.expect("first lookup");
    let second = resolver.resolve("ZZZ999 ").await.expect("second lookup");

    // Then: Both return null, and only one upstream call was made
    assert_eq!(first, None);
    assert_eq!(second, None);
    assert_eq!(http.request_count(&format!("{API}/routes")), 1);
    assert_eq!(cache.get("ZZZ999").await, Some(RouteLookup::NoRoute));
}

#[tokio::test]
async fn when_route_payload_is_malformed_system_treats_it_as_no_route() {
    // Given: A route table answering with garbage
    let http = Arc::new(ScriptedHttpClient::new().with_json(format!("{API}/routes"), "<html>"));
    let cache = Arc::new(PersistentRouteCache::memory_only(
        ROUTE_TTL,
        Arc::new(ManualClock::fixed()),
    ));
    let resolver = route_resolver(http, cache.clone());

    // When: The callsign is resolved
    let route = resolver.resolve("ACA856").await.expect("lookup");

    // Then: The malformed answer is a cached confirmed miss
    assert_eq!(route, None);
    assert_eq!(cache.get("ACA856").await, Some(RouteLookup::NoRoute));
}

// =============================================================================
// Persistent Route Cache: Restart Behaviour
// =============================================================================

#[tokio::test]
async fn when_process_restarts_before_ttl_system_restores_cached_route() {
    // Given: A route cached and mirrored to disk
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("route-cache.json");
    let clock = Arc::new(ManualClock::fixed());
    let before = PersistentRouteCache::new(ROUTE_TTL, clock.clone(), Some(path.clone()));
    before.set("ACA856", RouteLookup::Found(sample_route())).await;
    before.set("ZZZ999", RouteLookup::NoRoute).await;

    // When: A fresh cache loads the snapshot halfway through the TTL
    clock.advance(time::Duration::seconds(300));
    let after = PersistentRouteCache::new(ROUTE_TTL, clock.clone(), Some(path));
    let admitted = after.load_from_disk().await;

    // Then: Both the route and the sentinel come back unchanged
    assert_eq!(admitted, 2);
    assert_eq!(
        after.get("ACA856").await,
        Some(RouteLookup::Found(sample_route()))
    );
    assert_eq!(after.get("ZZZ999").await, Some(RouteLookup::NoRoute));

    // And: The restored entry keeps its original absolute expiry
    clock.advance(time::Duration::seconds(301));
    assert_eq!(after.get("ACA856").await, None);
}

#[tokio::test]
async fn when_process_restarts_after_ttl_system_starts_cold() {
    // Given: A route cached and mirrored to disk
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("route-cache.json");
    let clock = Arc::new(ManualClock::fixed());
    PersistentRouteCache::new(ROUTE_TTL, clock.clone(), Some(path.clone()))
        .set("ACA856", RouteLookup::Found(sample_route()))
        .await;

    // When: A fresh cache loads the snapshot after the TTL elapsed
    clock.advance(time::Duration::seconds(601));
    let after = PersistentRouteCache::new(ROUTE_TTL, clock, Some(path));

    // Then: The stale entry is discarded
    assert_eq!(after.load_from_disk().await, 0);
    assert_eq!(after.get("ACA856").await, None);
}

#[tokio::test]
async fn when_resolver_restarts_system_answers_from_snapshot_without_network() {
    // Given: A resolver that cached a route to disk
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("route-cache.json");
    let clock = Arc::new(ManualClock::fixed());
    let online = Arc::new(ScriptedHttpClient::new().with_json(
        format!("{API}/routes"),
        r#"{"route":["CYYZ","EGLL"]}"#,
    ));
    route_resolver(
        online,
        Arc::new(PersistentRouteCache::new(ROUTE_TTL, clock.clone(), Some(path.clone()))),
    )
    .resolve("ACA856")
    .await
    .expect("lookup")
    .expect("route");

    // When: A new resolver with an unreachable upstream warms up from the snapshot
    let offline = Arc::new(ScriptedHttpClient::new().with_failure(API, "network down"));
    let cache = Arc::new(PersistentRouteCache::new(ROUTE_TTL, clock, Some(path)));
    cache.load_from_disk().await;
    let resolver = route_resolver(offline.clone(), cache);

    // Then: The route is served from the cache
    let route = resolver
        .resolve("ACA856")
        .await
        .expect("cached")
        .expect("route");
    assert_eq!(route.destination_code, "EGLL");
    assert_eq!(offline.total_requests(), 0);
}
