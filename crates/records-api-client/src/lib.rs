//! Client for the record-base HTTP API.
//!
//! Two operations against a destination table: list all records (`GET
//! /{base}/{table}`) and patch the two donation-total fields on one record
//! (`PATCH /{base}/{table}/{record}`). Updates are strictly sequential
//! with a configurable pacing delay to respect the destination's rate
//! limits. The [`RecordsApi`] trait is the seam the orchestrator depends
//! on, so tests can swap in an in-memory double.

mod client;
mod error;

pub use client::{RecordBaseClient, RecordFieldConfig, RecordsApi};
pub use error::{ApiError, ApiResult};

use std::time::Duration;

/// Pacing policy for the sequential update loop.
///
/// Kept as an explicit parameter rather than a hardcoded sleep so it can
/// be tuned or replaced with adaptive backoff without touching the push
/// logic.
#[derive(Debug, Clone, Copy)]
pub struct PushPolicy {
    /// Delay before every request after the first.
    pub delay_between_requests: Duration,
}

impl Default for PushPolicy {
    fn default() -> Self {
        Self {
            delay_between_requests: Duration::from_millis(200),
        }
    }
}

/// Outcome of one push batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOutcome {
    /// Updates acknowledged with a success status.
    pub success_count: usize,
    /// Updates that failed (transport error or non-success status).
    pub error_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_paces_at_200ms() {
        let policy = PushPolicy::default();
        assert_eq!(policy.delay_between_requests, Duration::from_millis(200));
    }
}
