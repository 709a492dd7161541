use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

use super::trailblazer::RankStats;
use crate::domain::{ActivityTx, ReceiptStatus};
use crate::error::Result;

/// JSON-RPC surface the wallet needs from a node
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    async fn balance(&self, address: Address) -> Result<U256>;

    /// Next nonce for `address` (latest block)
    async fn nonce(&self, address: Address) -> Result<u64>;

    async fn gas_price(&self) -> Result<u128>;

    async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64>;

    /// Read-only `eth_call`
    async fn call(&self, request: TransactionRequest) -> Result<Bytes>;

    /// Broadcast an EIP-2718 encoded signed transaction
    async fn send_raw_transaction(&self, raw: Vec<u8>) -> Result<TxHash>;

    async fn receipt_status(&self, hash: TxHash) -> Result<ReceiptStatus>;
}

/// Outgoing transaction history for a wallet
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Point-relevant transactions the wallet originated, oldest first
    async fn fetch_transactions(&self, address: Address) -> Result<Vec<ActivityTx>>;
}

/// Trailblazer leaderboard lookups
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RankSource: Send + Sync {
    async fn fetch_rank(&self, address: Address) -> Result<RankStats>;
}
