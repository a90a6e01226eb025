use std::time::Duration;

use skyroute_core::SkyrouteServices;
use tokio::task::JoinHandle;

/// Interval between background sweeps of expired cache entries.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub services: SkyrouteServices,
}

impl AppState {
    pub fn new(services: SkyrouteServices) -> Self {
        Self { services }
    }

    /// Spawns the periodic cache sweep. The task runs until aborted.
    pub fn spawn_cache_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let services = self.services.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                services.sweep_expired().await;
            }
        })
    }
}
