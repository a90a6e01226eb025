//! Route cache mirrored to a JSON snapshot so restarts do not cold-start route lookups.
//!
//! The in-memory [`TtlCache`] answers every read. The snapshot is read once, either through
//! [`PersistentRouteCache::load_from_disk`] or before the first `get`/`set`, and is rewritten
//! in full after each `set`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::clock::{from_unix_millis, unix_millis, Clock};
use crate::domain::{RouteLookup, RouteRecord};
use crate::error::PersistenceError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotEntry {
    value: Option<RouteRecord>,
    expires_at: i64,
}

type Snapshot = BTreeMap<String, SnapshotEntry>;

pub struct PersistentRouteCache {
    cache: TtlCache<String, RouteLookup>,
    path: Option<PathBuf>,
    loaded: OnceCell<usize>,
    write_lock: Mutex<()>,
}

impl PersistentRouteCache {
    /// `path = None` keeps the cache memory-only.
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>, path: Option<PathBuf>) -> Self {
        Self {
            cache: TtlCache::with_clock(ttl, clock),
            path,
            loaded: OnceCell::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn memory_only(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self::new(ttl, clock, None)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn get(&self, key: &str) -> Option<RouteLookup> {
        self.load_from_disk().await;
        self.cache.get(key).await
    }

    /// Stores `lookup` and rewrites the snapshot. A failed write is logged and the entry stays
    /// cached in memory.
    pub async fn set(&self, key: impl Into<String>, lookup: RouteLookup) {
        // The snapshot is rewritten from memory, so disk entries must be admitted first.
        self.load_from_disk().await;
        self.cache.set(key.into(), lookup, None).await;
        if let Err(error) = self.persist().await {
            warn!(%error, "route cache snapshot write failed; continuing memory-only");
        }
    }

    /// Rehydrates unexpired entries from the snapshot and returns how many were admitted.
    ///
    /// The file is read at most once per cache; later calls return the first count. A missing
    /// file is an empty cache. An unreadable or corrupt file is logged and ignored as a whole.
    pub async fn load_from_disk(&self) -> usize {
        *self.loaded.get_or_init(|| self.read_and_admit()).await
    }

    async fn read_and_admit(&self) -> usize {
        let Some(path) = &self.path else {
            return 0;
        };

        match read_snapshot(path).await {
            Ok(None) => {
                debug!(path = %path.display(), "no route cache snapshot found");
                0
            }
            Ok(Some(snapshot)) => {
                let total = snapshot.len();
                let admitted = self.admit(snapshot).await;
                info!(
                    path = %path.display(),
                    admitted,
                    discarded = total - admitted,
                    "loaded route cache snapshot"
                );
                admitted
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring unreadable route cache snapshot");
                0
            }
        }
    }

    pub async fn clear_expired(&self) -> usize {
        self.cache.clear_expired().await
    }

    pub async fn clear(&self) {
        self.cache.clear().await;
    }

    pub async fn len(&self) -> usize {
        self.cache.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.is_empty().await
    }

    async fn admit(&self, snapshot: Snapshot) -> usize {
        let now = self.cache.clock().now();
        let mut admitted = 0;
        for (key, entry) in snapshot {
            let Some(expires_at) = from_unix_millis(entry.expires_at) else {
                continue;
            };
            if expires_at < now {
                continue;
            }
            self.cache
                .set_until(key, RouteLookup::from(entry.value), expires_at)
                .await;
            admitted += 1;
        }
        admitted
    }

    async fn persist(&self) -> Result<(), PersistenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let _guard = self.write_lock.lock().await;
        let snapshot = self
            .cache
            .snapshot()
            .await
            .into_iter()
            .map(|(key, lookup, expires_at)| {
                let entry = SnapshotEntry {
                    value: lookup.into_route(),
                    expires_at: unix_millis(expires_at),
                };
                (key, entry)
            })
            .collect::<Snapshot>();

        let encoded = serde_json::to_vec(&snapshot)?;
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = staging_path(path);
        tokio::fs::write(&staging, encoded).await?;
        tokio::fs::rename(&staging, path).await?;
        debug!(path = %path.display(), entries = snapshot.len(), "wrote route cache snapshot");
        Ok(())
    }
}

async fn read_snapshot(path: &Path) -> Result<Option<Snapshot>, PersistenceError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(error.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::domain::AirportDetail;

    fn route() -> RouteRecord {
        RouteRecord {
            callsign: String::from("BAW117"),
            airports: vec![String::from("EGLL"), String::from("KJFK")],
            origin_code: String::from("EGLL"),
            destination_code: String::from("KJFK"),
            origin_detail: AirportDetail::bare("EGLL"),
            destination_detail: AirportDetail::bare("KJFK"),
        }
    }

    #[tokio::test]
    async fn snapshot_encodes_sentinel_as_null() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("routes.json");
        let clock = Arc::new(ManualClock::fixed());
        let cache = PersistentRouteCache::new(Duration::from_secs(60), clock, Some(path.clone()));

        cache.set("ZZZ999", RouteLookup::NoRoute).await;
        cache.set("BAW117", RouteLookup::Found(route())).await;

        let raw = std::fs::read_to_string(&path).expect("snapshot written");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert!(value["ZZZ999"]["value"].is_null());
        assert_eq!(value["BAW117"]["value"]["route"][1], "KJFK");
        assert!(value["BAW117"]["expiresAt"].is_i64());
        assert!(!staging_path(&path).exists());
    }

    #[tokio::test]
    async fn first_write_keeps_entries_already_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("routes.json");
        let clock = Arc::new(ManualClock::fixed());

        let earlier =
            PersistentRouteCache::new(Duration::from_secs(60), clock.clone(), Some(path.clone()));
        earlier.set("BAW117", RouteLookup::Found(route())).await;

        let later =
            PersistentRouteCache::new(Duration::from_secs(60), clock, Some(path.clone()));
        later.set("ZZZ999", RouteLookup::NoRoute).await;

        let raw = std::fs::read_to_string(&path).expect("snapshot written");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value["BAW117"]["value"]["route"][1], "KJFK");
        assert!(value["ZZZ999"]["value"].is_null());
        assert_eq!(later.get("BAW117").await, Some(RouteLookup::Found(route())));
        assert_eq!(later.load_from_disk().await, 1);
    }

    #[tokio::test]
    async fn corrupt_snapshot_loads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("routes.json");
        std::fs::write(&path, "{\"BAW117\": {\"value\": null, \"expiresAt\":").expect("write");

        let cache = PersistentRouteCache::new(
            Duration::from_secs(60),
            Arc::new(ManualClock::fixed()),
            Some(path),
        );
        assert_eq!(cache.load_from_disk().await, 0);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn missing_snapshot_loads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = PersistentRouteCache::new(
            Duration::from_secs(60),
            Arc::new(ManualClock::fixed()),
            Some(dir.path().join("absent.json")),
        );
        assert_eq!(cache.load_from_disk().await, 0);
    }

    #[tokio::test]
    async fn unwritable_snapshot_keeps_memory_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("taken");
        std::fs::create_dir(&path).expect("mkdir");

        let cache = PersistentRouteCache::new(
            Duration::from_secs(60),
            Arc::new(ManualClock::fixed()),
            Some(path),
        );
        cache.set("BAW117", RouteLookup::Found(route())).await;
        assert_eq!(cache.get("BAW117").await, Some(RouteLookup::Found(route())));
    }

    #[tokio::test]
    async fn memory_only_cache_never_touches_disk() {
        let cache =
            PersistentRouteCache::memory_only(Duration::from_secs(60), Arc::new(ManualClock::fixed()));
        cache.set("BAW117", RouteLookup::NoRoute).await;
        assert_eq!(cache.get("BAW117").await, Some(RouteLookup::NoRoute));
        assert_eq!(cache.load_from_disk().await, 0);
        assert!(cache.path().is_none());
    }
}
