//! Bounded-retry primitive with exponential backoff.
//!
//! The policy mirrors the upstream contract: up to 3 total attempts, with
//! the wait after the n-th failed attempt growing as `multiplier * 2^n`
//! seconds, clamped to a floor of 2s and a ceiling of 10s. After the final
//! attempt fails, callers receive a terminal `RetriesExhausted` error that is
//! distinguishable from any single-attempt failure.

use std::future::Future;
use std::time::Duration;

use crate::error::UpstreamError;

// ============================================================================
// RETRY POLICY
// ============================================================================

/// Retry policy for upstream requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Backoff multiplier in seconds.
    pub multiplier: u64,
    /// Minimum wait between attempts.
    pub min_delay: Duration,
    /// Maximum wait between attempts.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: 1,
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A policy without waits, for tests and local tooling.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            multiplier: 0,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Backoff after `completed_attempts` failed attempts (1-based).
    pub fn delay_for(&self, completed_attempts: u32) -> Duration {
        let exp = 2u64.saturating_pow(completed_attempts);
        let raw = Duration::from_secs(self.multiplier.saturating_mul(exp));
        raw.clamp(self.min_delay, self.max_delay)
    }
}

// ============================================================================
// RETRY LOOP
// ============================================================================

/// Run `op` until it succeeds or the attempt budget is spent.
///
/// `op` receives the 1-based attempt number. Every failure short of the last
/// attempt is absorbed and followed by a backoff sleep; the last failure is
/// wrapped into [`UpstreamError::RetriesExhausted`]. The caller always gets a
/// success or a single terminal error, never a silent hang.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, UpstreamError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let mut attempt = 1u32;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_attempts {
                    return Err(UpstreamError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }

                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "upstream attempt failed, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
