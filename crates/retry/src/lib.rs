#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Retry policy for the launchpad build pipeline
//!
//! Decides whether a classified failure earns another attempt and how long to
//! wait before it: exponential backoff with uniform jitter, hard-capped so a
//! misconfigured base delay can never stall a build for more than a minute.

use launchpad_classifier::ErrorClassification;
use std::time::Duration;

/// Ceiling applied to every computed backoff delay
pub const MAX_DELAY_MS: u64 = 60_000;

/// Upper bound (exclusive) of the uniform jitter added to each delay
pub const JITTER_MS: u64 = 1000;

/// Whether another attempt is permitted under the classification's budget.
///
/// `retries_so_far` counts retries already performed for the current phase;
/// the budget check is strict, so once it reaches `max_retries` no further
/// attempt is made regardless of how often this is asked.
#[must_use]
pub fn should_retry(classification: &ErrorClassification, retries_so_far: u32) -> bool {
    classification.retryable && retries_so_far < classification.max_retries
}

/// Backoff delay before retry number `attempt` (1-indexed).
///
/// `base_delay_ms * 2^attempt + jitter[0, 1000)`, capped at [`MAX_DELAY_MS`].
/// The first retry already doubles the base, so successive delays strictly
/// grow until the cap.
#[must_use]
pub fn compute_delay(base_delay_ms: u64, attempt: u32) -> Duration {
    let exponential = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    let jitter = rand::random_range(0..JITTER_MS);
    Duration::from_millis(exponential.saturating_add(jitter).min(MAX_DELAY_MS))
}

/// Fold accumulator for one phase's retry loop.
///
/// Each failed attempt produces a new state via [`RetryState::record`];
/// the orchestrator threads the value through successive attempts instead of
/// mutating shared history, so a phase's trail is reconstructible after the
/// fact.
#[derive(Debug, Clone, Default)]
pub struct RetryState {
    retries: u32,
    logs: Vec<String>,
    last_classification: Option<ErrorClassification>,
}

impl RetryState {
    /// Fresh state at the start of a phase
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attempt's log line without consuming a retry
    #[must_use]
    pub fn with_log(mut self, line: impl Into<String>) -> Self {
        self.logs.push(line.into());
        self
    }

    /// Record the classification of a failed attempt
    #[must_use]
    pub fn observe_failure(mut self, classification: ErrorClassification) -> Self {
        self.last_classification = Some(classification);
        self
    }

    /// Consume one retry from the budget
    #[must_use]
    pub fn schedule_retry(mut self) -> Self {
        self.retries += 1;
        self
    }

    /// Retries performed so far in this phase
    #[must_use]
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Accumulated log lines, oldest first
    #[must_use]
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Consume the state, yielding its log lines
    #[must_use]
    pub fn into_logs(self) -> Vec<String> {
        self.logs
    }

    /// Most recent classification seen, if any attempt failed
    #[must_use]
    pub fn last_classification(&self) -> Option<&ErrorClassification> {
        self.last_classification.as_ref()
    }
}
