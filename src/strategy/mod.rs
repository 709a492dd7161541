//! Transaction-submitting modules and the pieces they share.
//!
//! Every module runs one wallet at a time and one transaction at a time;
//! nothing here submits concurrently.

pub mod pacing;
pub mod retry;
pub mod rubyscore;
pub mod session;
pub mod wrap;

use alloy::primitives::U256;

use crate::domain::PointTotals;

pub use pacing::{pick_secs, random_reserve, random_sleep};
pub use retry::{AttemptOutcome, RetryOutcome, RetryPolicy};
pub use rubyscore::RubyscoreModule;
pub use session::PointSession;
pub use wrap::{plan_wrap_step, WrapModule, WrapStep};

/// Why a module stopped working on a wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Target was already met before the first transaction
    AlreadyAtTarget,
    TargetReached,
    /// Native balance too small to deposit and nothing wrapped
    InsufficientBalance,
    /// The named action failed on every attempt
    RetriesExhausted(&'static str),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::AlreadyAtTarget => write!(f, "already at target"),
            StopReason::TargetReached => write!(f, "target reached"),
            StopReason::InsufficientBalance => write!(f, "insufficient balance"),
            StopReason::RetriesExhausted(action) => write!(f, "{} retries exhausted", action),
        }
    }
}

/// Outcome of one module run on one wallet
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub module: &'static str,
    /// Confirmed transactions submitted by this run
    pub actions: u32,
    /// Value wrapped during the run (zero for modules that move no value)
    pub volume_wei: U256,
    /// Today's points when the run stopped
    pub totals: PointTotals,
    pub stop: StopReason,
}

impl RunSummary {
    fn new(module: &'static str, totals: PointTotals) -> Self {
        Self {
            module,
            actions: 0,
            volume_wei: U256::ZERO,
            totals,
            stop: StopReason::TargetReached,
        }
    }

    fn stopped(mut self, reason: StopReason) -> Self {
        self.stop = reason;
        self
    }
}
