use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// What one receipt poll told us
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    /// Node does not know the transaction (yet)
    NotFound,
    /// Known but not in a block yet
    Pending,
    /// Mined with status 1
    Success { gas_used: u64, effective_gas_price: u128 },
    /// Mined with status 0
    Reverted,
}

impl ReceiptStatus {
    /// Burned fee in wei, only known once mined successfully
    pub fn fee_wei(&self) -> Option<U256> {
        match self {
            ReceiptStatus::Success {
                gas_used,
                effective_gas_price,
            } => Some(U256::from(*gas_used).saturating_mul(U256::from(*effective_gas_price))),
            _ => None,
        }
    }
}

/// Confirmation state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmationState {
    /// Broadcast accepted, nothing polled yet
    Submitted,
    /// Receipt exists but the transaction is not mined
    Pending,
    /// Node has not seen the transaction, still inside the timeout
    NotFoundRetry,
    /// Mined and succeeded
    ConfirmedSuccess,
    /// Mined and reverted
    ConfirmedFailure,
    /// No final receipt within the timeout
    TimedOut,
}

impl ConfirmationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationState::Submitted => "SUBMITTED",
            ConfirmationState::Pending => "PENDING",
            ConfirmationState::NotFoundRetry => "NOT_FOUND_RETRY",
            ConfirmationState::ConfirmedSuccess => "CONFIRMED_SUCCESS",
            ConfirmationState::ConfirmedFailure => "CONFIRMED_FAILURE",
            ConfirmationState::TimedOut => "TIMED_OUT",
        }
    }

    /// Check if this state can transition to another state
    pub fn can_transition_to(&self, target: ConfirmationState) -> bool {
        use ConfirmationState::*;

        match (self, target) {
            // Live states never return to Submitted
            (Submitted | Pending | NotFoundRetry, Submitted) => false,
            (Submitted | Pending | NotFoundRetry, _) => true,

            // Terminal states never move
            _ => false,
        }
    }

    /// Is this a terminal state?
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConfirmationState::ConfirmedSuccess
                | ConfirmationState::ConfirmedFailure
                | ConfirmationState::TimedOut
        )
    }

    /// Next state after a poll, given how long we have been waiting.
    ///
    /// A mined receipt always wins over the clock; the timeout only ends
    /// polling that would otherwise continue.
    pub fn after_poll(&self, poll: ReceiptStatus, elapsed: Duration, timeout: Duration) -> Self {
        let next = match poll {
            ReceiptStatus::Success { .. } => ConfirmationState::ConfirmedSuccess,
            ReceiptStatus::Reverted => ConfirmationState::ConfirmedFailure,
            _ if elapsed >= timeout => ConfirmationState::TimedOut,
            ReceiptStatus::Pending => ConfirmationState::Pending,
            ReceiptStatus::NotFound => ConfirmationState::NotFoundRetry,
        };
        if *self == next || self.can_transition_to(next) {
            next
        } else {
            *self
        }
    }
}

impl fmt::Display for ConfirmationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
