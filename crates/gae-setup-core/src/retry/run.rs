//! Retry loop: run a single-attempt closure until success or the budget is spent.

use std::fmt;

use super::classify;
use super::error::FetchError;
use super::policy::{RetryDecision, RetryPolicy};

/// Terminal failure of the retry loop.
#[derive(Debug)]
pub struct RetryFailure {
    /// Transport attempts consumed (storage failures do not count).
    pub attempts: u32,
    /// Error from the last attempt.
    pub error: FetchError,
}

impl fmt::Display for RetryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (after {} attempt(s))", self.error, self.attempts)
    }
}

impl std::error::Error for RetryFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Runs `f` until it succeeds or the policy says to stop.
///
/// `label` names the resource in diagnostics (normally the URL). Returns the
/// number of attempts it took on success.
pub fn run_with_retry<F>(policy: &RetryPolicy, label: &str, mut f: F) -> Result<u32, RetryFailure>
where
    F: FnMut() -> Result<(), FetchError>,
{
    let max = policy.attempts();
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(()) => return Ok(attempt),
            Err(e) => {
                let kind = classify::classify(&e);
                if !kind.is_transport() {
                    return Err(RetryFailure {
                        attempts: attempt - 1,
                        error: e,
                    });
                }
                tracing::warn!(
                    kind = ?kind,
                    "Attempt {} of {} failed when downloading {}.",
                    attempt,
                    max,
                    label
                );
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => {
                        return Err(RetryFailure {
                            attempts: attempt,
                            error: e,
                        })
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!("Error: {}", e);
                        tracing::info!("Retrying download.");
                        if !d.is_zero() {
                            std::thread::sleep(d);
                        }
                        attempt += 1;
                    }
                }
            }
        }
    }
}
