use std::sync::Arc;

use tracing::{debug, info};

use crate::airports::AirportDirectory;
use crate::domain::{Callsign, RouteLookup, RouteRecord};
use crate::error::UpstreamError;
use crate::opensky::OpenSkyClient;
use crate::route_store::PersistentRouteCache;

/// Resolves callsigns to published routes with negative-result memoisation.
pub struct RouteResolver {
    client: Arc<OpenSkyClient>,
    cache: Arc<PersistentRouteCache>,
    directory: Arc<AirportDirectory>,
}

impl RouteResolver {
    pub fn new(
        client: Arc<OpenSkyClient>,
        cache: Arc<PersistentRouteCache>,
        directory: Arc<AirportDirectory>,
    ) -> Self {
        Self {
            client,
            cache,
            directory,
        }
    }

    pub fn cache(&self) -> &Arc<PersistentRouteCache> {
        &self.cache
    }

    /// Route for `callsign`, or `None` when the callsign is blank or has no published route.
    ///
    /// Upstream errors are returned and not cached; an empty or malformed route list is
    /// cached as a confirmed miss.
    pub async fn resolve(&self, callsign: &str) -> Result<Option<RouteRecord>, UpstreamError> {
        let Some(callsign) = Callsign::parse(callsign) else {
            return Ok(None);
        };

        if let Some(cached) = self.cache.get(callsign.as_str()).await {
            debug!(%callsign, "route cache hit");
            return Ok(cached.into_route());
        }

        let lookup = match self.client.route(&callsign).await? {
            Some(airports) => match self.build_record(&callsign, airports) {
                Some(record) => RouteLookup::Found(record),
                None => RouteLookup::NoRoute,
            },
            None => RouteLookup::NoRoute,
        };

        info!(
            %callsign,
            found = matches!(lookup, RouteLookup::Found(_)),
            "resolved route"
        );
        self.cache.set(callsign.as_str(), lookup.clone()).await;
        Ok(lookup.into_route())
    }

    fn build_record(&self, callsign: &Callsign, airports: Vec<String>) -> Option<RouteRecord> {
        let origin_code = airports.first()?.clone();
        let destination_code = airports.last()?.clone();
        Some(RouteRecord {
            callsign: callsign.to_string(),
            origin_detail: self.directory.detail(&origin_code),
            destination_detail: self.directory.detail(&destination_code),
            origin_code,
            destination_code,
            airports,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clock::ManualClock;
    use crate::credentials::CredentialProvider;
    use crate::http_client::ScriptedHttpClient;

    const API: &str = "https://opensky.test/api";

    fn resolver(http: Arc<ScriptedHttpClient>) -> RouteResolver {
        let clock = Arc::new(ManualClock::fixed());
        let credentials = Arc::new(CredentialProvider::new(
            http.clone(),
            clock.clone(),
            None,
            Vec::new(),
        ));
        RouteResolver::new(
            Arc::new(OpenSkyClient::new(http, API, credentials)),
            Arc::new(PersistentRouteCache::memory_only(
                Duration::from_secs(3_600),
                clock,
            )),
            Arc::new(AirportDirectory::bundled()),
        )
    }

    #[tokio::test]
    async fn blank_callsign_skips_network() {
        let http = Arc::new(ScriptedHttpClient::new());
        assert_eq!(resolver(http.clone()).resolve("   ").await, Ok(None));
        assert_eq!(http.total_requests(), 0);
    }

    #[tokio::test]
    async fn route_is_enriched_and_cached_under_normalised_callsign() {
        let http = Arc::new(ScriptedHttpClient::new().with_json(
            format!("{API}/routes"),
            r#"{"callsign":"ACA856","route":["CYYZ","EGLL"]}"#,
        ));
        let resolver = resolver(http.clone());

        let route = resolver
            .resolve(" aca856 ")
            .await
            .expect("lookup")
            .expect("route");
        assert_eq!(route.callsign, "ACA856");
        assert_eq!(route.origin_code, "CYYZ");
        assert_eq!(route.destination_code, "EGLL");
        assert_eq!(route.origin_detail.city.as_deref(), Some("Toronto"));
        assert_eq!(route.destination_detail.city.as_deref(), Some("London"));

        resolver.resolve("ACA856").await.expect("cached");
        assert_eq!(http.total_requests(), 1);
    }

    #[tokio::test]
    async fn upstream_failure_is_propagated_and_not_cached() {
        let http = Arc::new(
            ScriptedHttpClient::new().with_response(format!("{API}/routes"), 503, "busy"),
        );
        let resolver = resolver(http.clone());

        let error = resolver.resolve("ACA856").await.expect_err("5xx");
        assert_eq!(error.status(), 502);

        resolver.resolve("ACA856").await.expect_err("retried");
        assert_eq!(http.total_requests(), 2);
        assert!(resolver.cache().is_empty().await);
    }

    #[tokio::test]
    async fn single_airport_route_has_same_origin_and_destination() {
        let http = Arc::new(
            ScriptedHttpClient::new().with_json(format!("{API}/routes"), r#"{"route":["EDDF"]}"#),
        );
        let route = resolver(http)
            .resolve("DLH1")
            .await
            .expect("lookup")
            .expect("route");
        assert_eq!(route.origin_code, route.destination_code);
    }
}
