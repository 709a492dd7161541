//! Bounded retry over a single on-chain action.
//!
//! An action reports each attempt as an [`AttemptOutcome`]; the policy turns
//! the sequence of attempts into one [`RetryOutcome`]. There is no backoff:
//! pacing between transactions is the caller's concern.

use std::future::Future;
use tracing::{debug, error, warn};

use crate::error::{BlazerError, Result};

/// Result of one attempt
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    Success(T),
    /// Another attempt may succeed (network hiccup, revert, timeout)
    Recoverable(BlazerError),
    /// Retrying cannot help (bad key, bad address, bad config)
    Terminal(BlazerError),
}

impl<T> From<Result<T>> for AttemptOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(e) if e.is_recoverable() => AttemptOutcome::Recoverable(e),
            Err(e) => AttemptOutcome::Terminal(e),
        }
    }
}

/// Result of the whole retry sequence
#[derive(Debug)]
pub enum RetryOutcome<T> {
    Success { value: T, attempts: u32 },
    /// Every attempt failed recoverably
    Exhausted { attempts: u32, last_error: BlazerError },
    /// An attempt failed in a way retrying cannot fix
    Terminal { attempts: u32, error: BlazerError },
}

impl<T> RetryOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Success { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. }
            | RetryOutcome::Terminal { attempts, .. } => *attempts,
        }
    }

    /// Collapse into a crate `Result`; exhaustion becomes `RetriesExhausted`
    pub fn into_result(self, action: &str) -> Result<T> {
        match self {
            RetryOutcome::Success { value, .. } => Ok(value),
            RetryOutcome::Exhausted { attempts, .. } => Err(BlazerError::RetriesExhausted {
                action: action.to_string(),
                attempts,
            }),
            RetryOutcome::Terminal { error, .. } => Err(error),
        }
    }
}

/// Fixed-count retry decorator
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds, fails terminally, or the attempts run out.
    ///
    /// `label` prefixes log lines; `action` names the operation ("deposit",
    /// "vote"). `op` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, label: &str, action: &str, mut op: F) -> RetryOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = AttemptOutcome<T>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match op(attempt).await {
                AttemptOutcome::Success(value) => {
                    return RetryOutcome::Success {
                        value,
                        attempts: attempt,
                    };
                }
                AttemptOutcome::Recoverable(e) => {
                    warn!("{} {} attempt {} failed!", label, capitalize(action), attempt);
                    debug!("{} {}", label, e);
                    last_error = Some(e);
                }
                AttemptOutcome::Terminal(e) => {
                    error!("{} {} aborted: {}", label, capitalize(action), e);
                    return RetryOutcome::Terminal {
                        attempts: attempt,
                        error: e,
                    };
                }
            }
        }

        error!("{} All {} attempts failed!", label, action);
        RetryOutcome::Exhausted {
            attempts: self.max_attempts,
            last_error: last_error
                .unwrap_or_else(|| BlazerError::Internal(format!("{} never attempted", action))),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
