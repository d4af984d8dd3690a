//! Retry classification and backoff.
//!
//! `RetryPolicy::classify` is a pure function from (attempt, failed response)
//! to a decision. Success statuses (2xx, and 404/410 for calls addressed to
//! the resource) never reach it; the executor handles those first.

use std::time::Duration;

use serde::Deserialize;

use crate::config::RetryConfig;
use crate::outcome::FailureReason;

/// Error reasons that turn a 403 into a rate-limit signal.
const RATE_LIMIT_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded"];

/// Upper bound for any single backoff sleep.
pub const MAX_DELAY: Duration = Duration::from_secs(10 * 60);

/// A single attempt that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// The server answered with a non-success status.
    Status { status: u16, body: String },
    /// No HTTP status: connection, TLS or timeout failure.
    Network(String),
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Status { status, .. } => write!(f, "HTTP {}", status),
            AttemptError::Network(e) => write!(f, "network error: {}", e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(Duration),
    Skip,
    Fail(FailureReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    backoff_factor: f64,
    rate_limit_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay(),
            backoff_factor: config.backoff_factor,
            rate_limit_multiplier: config.rate_limit_multiplier,
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// `base_delay * backoff_factor^(attempt - 1)`, with `attempt` 1-based,
    /// capped at `MAX_DELAY`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        scaled(self.base_delay, self.backoff_factor.powi(exponent))
    }

    pub fn classify(&self, attempt: u32, error: &AttemptError) -> RetryDecision {
        if attempt > self.max_attempts {
            return RetryDecision::Fail(FailureReason::MaxRetries);
        }

        match error {
            AttemptError::Network(_) => self.transient(attempt, 1.0, FailureReason::MaxRetries),
            AttemptError::Status { status, .. } if is_transient_status(*status) => {
                self.transient(attempt, 1.0, FailureReason::MaxRetries)
            }
            AttemptError::Status { status: 403, body } => {
                if is_rate_limit_body(body) {
                    self.transient(
                        attempt,
                        self.rate_limit_multiplier,
                        FailureReason::RateLimitExceeded,
                    )
                } else {
                    RetryDecision::Skip
                }
            }
            AttemptError::Status { .. } => RetryDecision::Fail(FailureReason::Permanent),
        }
    }

    fn transient(&self, attempt: u32, multiplier: f64, exhausted: FailureReason) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::Fail(exhausted);
        }
        RetryDecision::Retry(scaled(self.delay_for(attempt), multiplier))
    }
}

/// `delay * factor`, saturating at `MAX_DELAY` when the product overflows or
/// is not a valid duration.
fn scaled(delay: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor)
        .map_or(MAX_DELAY, |delay| delay.min(MAX_DELAY))
}

fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Deserialize)]
struct ErrorItem {
    reason: Option<String>,
}

/// True when the body is JSON whose `error.errors[].reason` names a rate
/// limit. Anything unparsable is not a rate limit.
pub fn is_rate_limit_body(body: &str) -> bool {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return false;
    };

    envelope
        .error
        .map(|detail| {
            detail.errors.iter().any(|item| {
                item.reason
                    .as_deref()
                    .is_some_and(|reason| RATE_LIMIT_REASONS.contains(&reason))
            })
        })
        .unwrap_or(false)
}
