//! Retry policy shared by the service clients.

use crate::error::is_transient;
use anyhow::Result;
use std::future::Future;
use std::time::{Duration, Instant};

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed {
        delay: Duration,
    },
    /// `base * factor^retry`, capped at `max`.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
    },
}

impl Backoff {
    /// Delay before retry number `retry` (0-based).
    pub fn delay(self, retry: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential { base, factor, max } => {
                let seconds = base.as_secs_f64() * factor.powi(retry as i32);
                Duration::from_secs_f64(seconds.min(max.as_secs_f64()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Stop retrying once this much time has passed since the first attempt.
    pub max_elapsed: Option<Duration>,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            max_elapsed: None,
            backoff: Backoff::Fixed { delay },
        }
    }

    pub fn bounded(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
            max_elapsed: None,
            backoff: Backoff::Fixed { delay },
        }
    }

    /// Whether another attempt may follow `attempts_made` failed ones.
    pub fn allows_retry(&self, attempts_made: u32, elapsed: Duration) -> bool {
        if let Some(max) = self.max_attempts {
            if attempts_made >= max {
                return false;
            }
        }
        if let Some(budget) = self.max_elapsed {
            if elapsed >= budget {
                return false;
            }
        }
        true
    }
}

/// Runs `op` until it succeeds, fails permanently, or the policy is exhausted.
///
/// Only errors classified by [`is_transient`] are retried. On exhaustion the
/// last transient error is returned so the caller can decide how to degrade.
pub async fn retry_transient<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let started = Instant::now();
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let err = match op().await {
            Ok(v) => return Ok(v),
            Err(err) => err,
        };

        if !is_transient(&err) {
            return Err(err);
        }
        if !policy.allows_retry(attempt, started.elapsed()) {
            tracing::warn!(label, attempt, error = %err, "retry budget exhausted");
            return Err(err);
        }

        let backoff = policy.backoff.delay(attempt - 1);
        tracing::warn!(label, attempt, ?backoff, error = %err, "transient failure; retrying");
        tokio::time::sleep(backoff).await;
    }
}
