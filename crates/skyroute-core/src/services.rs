//! Wiring of the shared service graph from a [`SkyrouteConfig`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::airports::{AirportDirectory, DirectoryError};
use crate::airspace::AirspaceService;
use crate::clock::{Clock, SystemClock};
use crate::config::SkyrouteConfig;
use crate::credentials::CredentialProvider;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::movements::{AirportMovementFinder, MovementLookup};
use crate::opensky::OpenSkyClient;
use crate::route_store::PersistentRouteCache;
use crate::routes::RouteResolver;
use crate::summary::FlightSummaryResolver;

/// Entries dropped by one [`SkyrouteServices::sweep_expired`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub airspace: usize,
    pub summaries: usize,
    pub routes: usize,
}

impl SweepReport {
    pub const fn total(&self) -> usize {
        self.airspace + self.summaries + self.routes
    }
}

/// Process-wide services. Each owns its cache; clones of the `Arc`s share state.
#[derive(Clone)]
pub struct SkyrouteServices {
    pub client: Arc<OpenSkyClient>,
    pub airspace: Arc<AirspaceService>,
    pub routes: Arc<RouteResolver>,
    pub summaries: Arc<FlightSummaryResolver>,
    pub directory: Arc<AirportDirectory>,
}

impl SkyrouteServices {
    /// Production graph: reqwest transport and the system clock.
    pub fn from_config(config: &SkyrouteConfig) -> Result<Self, DirectoryError> {
        Self::with_transport(config, Arc::new(ReqwestHttpClient::new()), Arc::new(SystemClock))
    }

    pub fn with_transport(
        config: &SkyrouteConfig,
        http_client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DirectoryError> {
        let directory = Arc::new(AirportDirectory::load_or_bundled(
            config.airports_path.as_deref(),
        )?);
        debug!(airports = directory.len(), "airport directory ready");

        let credentials = Arc::new(
            CredentialProvider::new(
                http_client.clone(),
                clock.clone(),
                config.oauth.clone(),
                config.token_urls.clone(),
            )
            .with_timeout_ms(config.request_timeout_ms),
        );
        let client = Arc::new(
            OpenSkyClient::new(http_client, config.api_url.clone(), credentials)
                .with_basic(config.basic.clone())
                .with_timeout_ms(config.request_timeout_ms),
        );

        let route_cache = Arc::new(PersistentRouteCache::new(
            config.route_cache_ttl,
            clock.clone(),
            config.route_cache_path.clone(),
        ));
        let routes = Arc::new(RouteResolver::new(
            client.clone(),
            route_cache,
            directory.clone(),
        ));
        let movements: Arc<dyn MovementLookup> = Arc::new(AirportMovementFinder::new(
            client.clone(),
            clock.clone(),
            config.movement_lookback,
        ));
        let summaries = Arc::new(
            FlightSummaryResolver::new(
                client.clone(),
                routes.clone(),
                movements,
                directory.clone(),
                clock.clone(),
            )
            .with_cache_ttl(config.summary_cache_ttl)
            .with_history_lookback(config.history_lookback)
            .with_fallback_timeout(Duration::from_millis(config.request_timeout_ms)),
        );
        let airspace = Arc::new(AirspaceService::new(
            client.clone(),
            config.airspace_cache_ttl,
            clock,
        ));

        Ok(Self {
            client,
            airspace,
            routes,
            summaries,
            directory,
        })
    }

    /// Rehydrates the route cache from its snapshot.
    pub async fn warm_up(&self) -> usize {
        self.routes.cache().load_from_disk().await
    }

    pub async fn sweep_expired(&self) -> SweepReport {
        let report = SweepReport {
            airspace: self.airspace.cache().clear_expired().await,
            summaries: self.summaries.cache().clear_expired().await,
            routes: self.routes.cache().clear_expired().await,
        };
        if report.total() > 0 {
            info!(
                airspace = report.airspace,
                summaries = report.summaries,
                routes = report.routes,
                "swept expired cache entries"
            );
        }
        report
    }
}
