//! Rate limiting for automatic sync runs.
//!
//! Automatic (timer-driven) syncs are suppressed when the previous
//! automatic run happened less than a configured number of hours ago.
//! Manual runs never consult this. The last-run timestamp lives in a
//! durable [`KeyValueStore`] slot as an RFC 3339 string; the limiter is
//! deliberately lock-free because the host execution model is
//! single-writer, last-write-wins.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use syncd_storage::{KeyValueStore, StorageResult};
use tracing::{debug, warn};

/// Storage slot holding the last automatic-sync timestamp.
pub const LAST_SYNC_KEY: &str = "last_auto_sync_at";

/// Clock seam so tests can pin "now".
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Decides whether an automatic sync may proceed.
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    threshold_hours: f64,
}

impl RateLimiter {
    /// Create a limiter with the given threshold in hours (fractional
    /// values allowed, e.g. 0.25 for 15 minutes).
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, threshold_hours: f64) -> Self {
        Self {
            store,
            clock,
            threshold_hours,
        }
    }

    /// Whether the automatic trigger should skip this run.
    ///
    /// Returns `false` when no prior timestamp exists (never skip the
    /// first run) or the stored value cannot be parsed. Otherwise skips
    /// iff strictly less than the threshold has elapsed; a run exactly at
    /// the threshold proceeds.
    pub fn should_skip(&self) -> StorageResult<bool> {
        let Some(stored) = self.store.get(LAST_SYNC_KEY)? else {
            debug!("no prior sync timestamp, not rate limited");
            return Ok(false);
        };

        let last = match DateTime::parse_from_rfc3339(&stored) {
            Ok(ts) => ts.with_timezone(&Utc),
            Err(e) => {
                warn!(stored = %stored, error = %e, "unparseable last-sync timestamp, treating as absent");
                return Ok(false);
            }
        };

        let elapsed_hours =
            (self.clock.now() - last).num_milliseconds() as f64 / (3_600.0 * 1_000.0);
        let skip = elapsed_hours < self.threshold_hours;
        debug!(
            elapsed_hours = elapsed_hours,
            threshold_hours = self.threshold_hours,
            skip = skip,
            "rate limit check"
        );
        Ok(skip)
    }

    /// Overwrite the stored timestamp with the current time.
    pub fn record_sync_now(&self) -> StorageResult<()> {
        self.store.set(LAST_SYNC_KEY, &self.clock.now().to_rfc3339())
    }
}
