//! Bounded fixed-interval retry.
//!
//! An explicit loop around an async operation: the attempt cap and the delay
//! are plain data, and waiting is a `tokio::time::sleep`, so a long retry
//! sequence never blocks the runtime and never grows the stack.

use std::future::Future;
use std::time::Duration;

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// How many attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Fixed wait before each further attempt.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Whether another attempt is allowed after `attempt` (1-based) failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

// ---------------------------------------------------------------------------
// RetryOutcome
// ---------------------------------------------------------------------------

/// Result of a retried operation.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    /// The operation succeeded on attempt `attempts`.
    Succeeded { value: T, attempts: u32 },
    /// Every allowed attempt failed with a retryable error.
    Exhausted { attempts: u32, last_error: E },
    /// A non-retryable error ended the sequence early.
    Aborted { attempts: u32, error: E },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. }
            | RetryOutcome::Aborted { attempts, .. } => *attempts,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            RetryOutcome::Succeeded { value, .. } => Some(value),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// retry_when
// ---------------------------------------------------------------------------

/// Run `op` until it succeeds, fails with an error `retryable` rejects, or
/// the policy's attempt cap is reached.
///
/// `op` receives the 1-based attempt number.
pub async fn retry_when<T, E, F, Fut, P>(
    policy: RetryPolicy,
    mut op: F,
    retryable: P,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => {
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt,
                };
            }
            Err(error) if retryable(&error) => {
                if !policy.should_retry(attempt) {
                    return RetryOutcome::Exhausted {
                        attempts: attempt,
                        last_error: error,
                    };
                }
                tracing::info!(
                    attempt,
                    delay_ms = policy.delay.as_millis() as u64,
                    "transient failure, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(error) => {
                return RetryOutcome::Aborted {
                    attempts: attempt,
                    error,
                };
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
