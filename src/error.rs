use thiserror::Error;

/// Main error type for the points bot
#[derive(Error, Debug)]
pub enum BlazerError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Explorer API error: {0}")]
    Explorer(String),

    #[error("Rank API error: {0}")]
    RankApi(String),

    #[error("Price API error: {0}")]
    PriceApi(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ABI decoding error: {0}")]
    Abi(String),

    // Transaction lifecycle errors
    #[error("Transaction failed: {hash}")]
    TransactionFailed { hash: String },

    #[error("Transaction {hash} not confirmed after {elapsed_secs}s")]
    ConfirmationTimeout { hash: String, elapsed_secs: u64 },

    #[error("All {attempts} {action} attempts failed")]
    RetriesExhausted { action: String, attempts: u32 },

    // Crypto/signing errors
    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Signature error: {0}")]
    Signature(String),

    #[error("Address parsing error: {0}")]
    AddressParsing(String),

    // User input errors
    #[error("Invalid wallet selection: {0}")]
    Selection(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl BlazerError {
    /// Whether another attempt of the same action may succeed.
    ///
    /// Network, API and on-chain outcomes are transient; key material,
    /// addresses and configuration will fail the same way every time.
    pub fn is_recoverable(&self) -> bool {
        match self {
            BlazerError::Http(_)
            | BlazerError::Rpc(_)
            | BlazerError::Explorer(_)
            | BlazerError::RankApi(_)
            | BlazerError::PriceApi(_)
            | BlazerError::Json(_)
            | BlazerError::TransactionFailed { .. }
            | BlazerError::ConfirmationTimeout { .. }
            | BlazerError::Io(_) => true,
            BlazerError::Config(_)
            | BlazerError::Abi(_)
            | BlazerError::RetriesExhausted { .. }
            | BlazerError::Wallet(_)
            | BlazerError::Signature(_)
            | BlazerError::AddressParsing(_)
            | BlazerError::Selection(_)
            | BlazerError::Validation(_)
            | BlazerError::Internal(_)
            | BlazerError::Other(_) => false,
        }
    }
}

/// Result type alias for BlazerError
pub type Result<T> = std::result::Result<T, BlazerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_failures_are_recoverable() {
        assert!(BlazerError::Rpc("connection reset".into()).is_recoverable());
        assert!(BlazerError::TransactionFailed { hash: "0xabc".into() }.is_recoverable());
        assert!(BlazerError::ConfirmationTimeout {
            hash: "0xabc".into(),
            elapsed_secs: 300
        }
        .is_recoverable());
    }

    #[test]
    fn test_key_and_input_errors_are_terminal() {
        assert!(!BlazerError::Signature("bad key".into()).is_recoverable());
        assert!(!BlazerError::Selection("7".into()).is_recoverable());
        assert!(!BlazerError::RetriesExhausted {
            action: "deposit".into(),
            attempts: 3
        }
        .is_recoverable());
    }

    #[test]
    fn test_display_messages() {
        let err = BlazerError::RetriesExhausted {
            action: "vote".into(),
            attempts: 3,
        };
        assert_eq!(err.to_string(), "All 3 vote attempts failed");

        let err = BlazerError::ConfirmationTimeout {
            hash: "0x01".into(),
            elapsed_secs: 300,
        };
        assert_eq!(err.to_string(), "Transaction 0x01 not confirmed after 300s");
    }
}
