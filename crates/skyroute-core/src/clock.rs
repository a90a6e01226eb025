//! Wall-clock abstraction so caches and token expiry can be driven from tests.

use std::sync::Mutex;

use time::{Duration, OffsetDateTime, PrimitiveDateTime};

/// Source of the current UTC instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Production clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Manually advanced clock for deterministic offline tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<OffsetDateTime>,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Starts at a fixed, arbitrary instant (2024-06-01T12:00:00Z).
    pub fn fixed() -> Self {
        Self::new(
            OffsetDateTime::from_unix_timestamp(1_717_243_200)
                .unwrap_or(OffsetDateTime::UNIX_EPOCH),
        )
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }

    pub fn set(&self, to: OffsetDateTime) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Latest representable instant. Expiries that would overflow saturate here.
pub const FAR_FUTURE: OffsetDateTime = PrimitiveDateTime::MAX.assume_utc();

/// `instant + by`, saturating at [`FAR_FUTURE`] instead of panicking.
pub fn saturating_add(instant: OffsetDateTime, by: Duration) -> OffsetDateTime {
    instant.checked_add(by).unwrap_or(FAR_FUTURE)
}

/// Milliseconds since the unix epoch, the unit persisted in snapshots.
pub fn unix_millis(instant: OffsetDateTime) -> i64 {
    (instant.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn from_unix_millis(millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}
