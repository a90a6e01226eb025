use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::domain::{AirspaceSnapshot, BoundingBox};
use crate::error::{CoreError, UpstreamError};
use crate::opensky::OpenSkyClient;

/// Bounding-box live traffic with a short-lived cache in front of the upstream.
pub struct AirspaceService {
    client: Arc<OpenSkyClient>,
    cache: TtlCache<String, AirspaceSnapshot>,
}

impl AirspaceService {
    pub fn new(client: Arc<OpenSkyClient>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            cache: TtlCache::with_clock(ttl, clock),
        }
    }

    pub fn cache(&self) -> &TtlCache<String, AirspaceSnapshot> {
        &self.cache
    }

    /// Validates raw query values before anything touches the network.
    pub async fn query(
        &self,
        lamin: Option<&str>,
        lomin: Option<&str>,
        lamax: Option<&str>,
        lomax: Option<&str>,
    ) -> Result<AirspaceSnapshot, CoreError> {
        let bbox = BoundingBox::parse(lamin, lomin, lamax, lomax)?;
        Ok(self.snapshot(&bbox).await?)
    }

    pub async fn snapshot(&self, bbox: &BoundingBox) -> Result<AirspaceSnapshot, UpstreamError> {
        let key = bbox.cache_key();
        if let Some(cached) = self.cache.get(&key).await {
            debug!(%key, "airspace cache hit");
            return Ok(cached);
        }

        let snapshot = self.client.states(bbox).await?;
        debug!(%key, aircraft = snapshot.aircraft.len(), "airspace cache fill");
        self.cache.set(key, snapshot.clone(), None).await;
        Ok(snapshot)
    }
}
