//! JSON-RPC chain client backed by an alloy HTTP provider.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::future::IntoFuture;
use std::time::Duration;
use tracing::debug;

use super::traits::ChainClient;
use crate::domain::ReceiptStatus;
use crate::error::{BlazerError, Result};

fn rpc_err<E: std::fmt::Display>(method: &'static str) -> impl Fn(E) -> BlazerError {
    move |e| BlazerError::Rpc(format!("{} failed: {}", method, e))
}

/// Node client shared by every wallet
#[derive(Clone)]
pub struct RpcChainClient {
    provider: DynProvider,
    rpc_url: String,
    request_timeout: Duration,
}

impl RpcChainClient {
    /// Connect to an HTTP JSON-RPC endpoint (no request is made yet).
    ///
    /// Every request is abandoned with an `Rpc` error after `request_timeout`.
    pub fn connect(rpc_url: &str, request_timeout: Duration) -> Result<Self> {
        let url = rpc_url
            .parse()
            .map_err(|e| BlazerError::AddressParsing(format!("Invalid RPC URL: {}", e)))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
            request_timeout,
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn bounded<F, T, E>(&self, method: &'static str, request: F) -> Result<T>
    where
        F: IntoFuture<Output = std::result::Result<T, E>>,
        E: std::fmt::Display,
    {
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(result) => result.map_err(rpc_err(method)),
            Err(_) => Err(BlazerError::Rpc(format!(
                "{} timed out after {:?}",
                method, self.request_timeout
            ))),
        }
    }
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("rpc_url", &self.rpc_url)
            .finish()
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn chain_id(&self) -> Result<u64> {
        self.bounded("eth_chainId", self.provider.get_chain_id())
            .await
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.bounded("eth_getBalance", self.provider.get_balance(address))
            .await
    }

    async fn nonce(&self, address: Address) -> Result<u64> {
        self.bounded(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address),
        )
        .await
    }

    async fn gas_price(&self) -> Result<u128> {
        self.bounded("eth_gasPrice", self.provider.get_gas_price())
            .await
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64> {
        self.bounded("eth_estimateGas", self.provider.estimate_gas(request))
            .await
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes> {
        self.bounded("eth_call", self.provider.call(request))
            .await
    }

    async fn send_raw_transaction(&self, raw: Vec<u8>) -> Result<TxHash> {
        let pending = self
            .bounded(
                "eth_sendRawTransaction",
                self.provider.send_raw_transaction(&raw),
            )
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn receipt_status(&self, hash: TxHash) -> Result<ReceiptStatus> {
        let receipt = self
            .bounded(
                "eth_getTransactionReceipt",
                self.provider.get_transaction_receipt(hash),
            )
            .await?;

        let Some(receipt) = receipt else {
            // No receipt: distinguish a mempool transaction from an unknown one
            let known = self
                .bounded(
                    "eth_getTransactionByHash",
                    self.provider.get_transaction_by_hash(hash),
                )
                .await?;
            debug!("No receipt for {} (known to node: {})", hash, known.is_some());
            return Ok(if known.is_some() {
                ReceiptStatus::Pending
            } else {
                ReceiptStatus::NotFound
            });
        };

        if receipt.block_number.is_none() {
            return Ok(ReceiptStatus::Pending);
        }

        Ok(if receipt.status() {
            ReceiptStatus::Success {
                gas_used: receipt.gas_used,
                effective_gas_price: receipt.effective_gas_price,
            }
        } else {
            ReceiptStatus::Reverted
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_bad_url() {
        let err = RpcChainClient::connect("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, BlazerError::AddressParsing(_)));
    }

    #[test]
    fn test_connect_keeps_url() {
        let client =
            RpcChainClient::connect("https://rpc.ankr.com/taiko", Duration::from_secs(5)).unwrap();
        assert_eq!(client.rpc_url(), "https://rpc.ankr.com/taiko");
    }

    #[tokio::test]
    async fn test_unresponsive_endpoint_is_bounded() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client =
            RpcChainClient::connect(&format!("http://{}", addr), Duration::from_millis(100))
                .unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(3),
            client.receipt_status(TxHash::repeat_byte(1)),
        )
        .await
        .expect("rpc request outlived its timeout");

        let err = result.unwrap_err();
        assert!(matches!(err, BlazerError::Rpc(msg) if msg.contains("timed out")));
    }
}
