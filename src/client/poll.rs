//! Periodic refresh with backoff.
//!
//! Tracks poll state and computes the delay before the next fetch. After a
//! failure the last good dataset is kept and served as stale data.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::client::{Scope, WorkItemSource};
use crate::models::Dataset;
use crate::{Error, Result};

/// Default refresh interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default ceiling for the backoff delay in seconds.
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 60;

/// Poll state.
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    /// Nothing fetched yet
    Idle,
    /// Last fetch succeeded
    Live { last_success: DateTime<Utc> },
    /// One or more consecutive fetches failed
    Stale { failures: u32, last_error: String },
}

impl PollState {
    pub fn is_live(&self) -> bool {
        matches!(self, PollState::Live { .. })
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, PollState::Stale { .. })
    }

    /// Consecutive failures (0 unless stale).
    pub fn failures(&self) -> u32 {
        match self {
            PollState::Stale { failures, .. } => *failures,
            _ => 0,
        }
    }

    /// Short label for status bars.
    pub fn label(&self) -> String {
        match self {
            PollState::Idle => "idle".to_string(),
            PollState::Live { .. } => "live".to_string(),
            PollState::Stale { failures, .. } => format!("stale ({} failed)", failures),
        }
    }
}

/// Delay before the next fetch after `failures` consecutive failures.
///
/// 0 failures: interval
/// 1 failure: interval
/// 2 failures: 2 × interval
/// 3 failures: 4 × interval
/// ...capped at `max`, and never shorter than `interval`
pub fn backoff_delay(failures: u32, interval: Duration, max: Duration) -> Duration {
    let ceiling = max.max(interval);
    if failures <= 1 {
        return interval;
    }
    let exponent = failures.saturating_sub(1);
    // 2^31 × any sane interval is already past every ceiling
    let factor = if exponent >= 31 { u32::MAX } else { 1u32 << exponent };
    interval.saturating_mul(factor).min(ceiling)
}

/// Poll loop bookkeeping, independent of how the caller sleeps.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    max_backoff: Duration,
    state: PollState,
    last_good: Option<Dataset>,
}

impl Poller {
    pub fn new(interval: Duration, max_backoff: Duration) -> Self {
        Self {
            interval,
            max_backoff,
            state: PollState::Idle,
            last_good: None,
        }
    }

    pub fn from_secs(interval_secs: u64, max_backoff_secs: u64) -> Self {
        Self::new(
            Duration::from_secs(interval_secs.max(1)),
            Duration::from_secs(max_backoff_secs),
        )
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Last successfully fetched dataset, if any.
    pub fn dataset(&self) -> Option<&Dataset> {
        self.last_good.as_ref()
    }

    pub fn record_success(&mut self, dataset: Dataset) {
        if self.state.is_stale() {
            tracing::info!("poll recovered after {} failures", self.state.failures());
        }
        self.state = PollState::Live {
            last_success: dataset.fetched_at,
        };
        self.last_good = Some(dataset);
    }

    pub fn record_failure(&mut self, error: &Error) {
        let failures = self.state.failures() + 1;
        tracing::warn!(
            failures,
            error = %error,
            have_data = self.last_good.is_some(),
            "poll failed, serving stale data"
        );
        self.state = PollState::Stale {
            failures,
            last_error: error.to_string(),
        };
    }

    /// Delay before the next fetch given the current state.
    pub fn next_delay(&self) -> Duration {
        backoff_delay(self.state.failures(), self.interval, self.max_backoff)
    }

    /// Fetch once and update state. On failure the previous dataset stays
    /// available through [`Poller::dataset`].
    pub fn poll_once<S: WorkItemSource + ?Sized>(
        &mut self,
        source: &S,
        scope: &Scope,
    ) -> Result<&Dataset> {
        match source.fetch(scope) {
            Ok(dataset) => {
                tracing::info!(
                    source = %source.describe(),
                    items = dataset.work_items.len(),
                    "poll cycle complete"
                );
                self.record_success(dataset);
                self.last_good
                    .as_ref()
                    .ok_or_else(|| Error::Other("dataset missing after successful poll".to_string()))
            }
            Err(e) => {
                self.record_failure(&e);
                Err(e)
            }
        }
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::from_secs(DEFAULT_POLL_INTERVAL_SECS, DEFAULT_MAX_BACKOFF_SECS)
    }
}
