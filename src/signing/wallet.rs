use crate::adapters::contracts::{balance_of_calldata, decode_balance_of};
use crate::adapters::ChainClient;
use crate::config::AppConfig;
use crate::domain::{ConfirmationState, ReceiptStatus};
use crate::error::{BlazerError, Result};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};
use zeroize::Zeroize;

/// Per-transaction knobs shared by every wallet
#[derive(Debug, Clone)]
pub struct TxSettings {
    /// Uniform multiplier range applied to the node's gas price
    pub gas_multiplier: (f64, f64),
    pub confirmation_timeout: Duration,
    pub pending_poll: Duration,
    pub not_found_poll: Duration,
    /// Prefix for transaction links in logs
    pub explorer_tx_url: String,
}

impl From<&AppConfig> for TxSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            gas_multiplier: config.execution.gas_multiplier,
            confirmation_timeout: config.execution.confirmation_timeout(),
            pending_poll: config.execution.pending_poll_interval(),
            not_found_poll: config.execution.not_found_poll_interval(),
            explorer_tx_url: config.network.explorer_tx_url.clone(),
        }
    }
}

/// A mined, successful transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub hash: TxHash,
    /// Burned fee in wei (gas used × effective gas price)
    pub fee_wei: U256,
}

/// One configured key: identity, signer and the chain handle it submits through
///
/// # Security
/// The private key string is zeroized once the signer is built and is never
/// stored on the struct.
#[derive(Clone)]
pub struct Wallet {
    index: usize,
    address: Address,
    signer: EthereumWallet,
    chain: Arc<dyn ChainClient>,
    weth: Address,
    settings: TxSettings,
}

impl Wallet {
    /// Create a wallet from a private key hex string (with or without 0x)
    pub fn from_private_key(
        index: usize,
        private_key: &str,
        chain: Arc<dyn ChainClient>,
        weth: Address,
        settings: TxSettings,
    ) -> Result<Self> {
        let mut secure_key = private_key.trim().trim_start_matches("0x").to_string();

        let parsed = secure_key.parse::<PrivateKeySigner>();
        secure_key.zeroize();

        let signer = parsed.map_err(|e| {
            BlazerError::Wallet(format!("Invalid private key on line {}: {}", index, e))
        })?;
        let address = signer.address();

        Ok(Self {
            index,
            address,
            signer: EthereumWallet::from(signer),
            chain,
            weth,
            settings,
        })
    }

    /// 1-based position in the keys file
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `[№3 - 0xAb1...9fE2c]`, prefixed to every wallet-scoped log line
    pub fn label(&self) -> String {
        format!("[№{} - {}]", self.index, self.short_address())
    }

    /// Checksummed address with the middle elided
    pub fn short_address(&self) -> String {
        let checksum = self.address.to_checksum(None);
        format!("{}...{}", &checksum[..5], &checksum[checksum.len() - 5..])
    }

    pub fn chain(&self) -> &Arc<dyn ChainClient> {
        &self.chain
    }

    pub fn tx_link(&self, hash: &TxHash) -> String {
        format!("{}{}", self.settings.explorer_tx_url, hash)
    }

    /// Native balance in wei
    pub async fn eth_balance(&self) -> Result<U256> {
        self.chain.balance(self.address).await
    }

    /// Wrapped token balance in wei
    pub async fn weth_balance(&self) -> Result<U256> {
        let request = TransactionRequest::default()
            .with_to(self.weth)
            .with_input(balance_of_calldata(self.address));
        let raw = self.chain.call(request).await?;
        decode_balance_of(&raw)
    }

    /// Transaction template with a fresh nonce, jittered gas price and chain id.
    ///
    /// Node errors propagate; callers decide whether to retry.
    pub async fn get_transaction_data(&self, value: U256) -> Result<TransactionRequest> {
        let nonce = self.chain.nonce(self.address).await?;
        let base_gas_price = self.chain.gas_price().await?;
        let chain_id = self.chain.chain_id().await?;

        let gas_price = jittered_gas_price(base_gas_price, self.settings.gas_multiplier);
        debug!(
            "{} nonce={} gas_price={} (node {}) chain_id={}",
            self.label(),
            nonce,
            gas_price,
            base_gas_price,
            chain_id
        );

        Ok(TransactionRequest::default()
            .with_from(self.address)
            .with_value(value)
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_chain_id(chain_id))
    }

    /// Estimate gas, sign, broadcast and wait for the receipt
    pub async fn send_transaction(&self, request: TransactionRequest) -> Result<Confirmation> {
        let gas_limit = self.chain.estimate_gas(request.clone()).await?;
        let request = request.with_gas_limit(gas_limit);

        let envelope = request
            .build(&self.signer)
            .await
            .map_err(|e| BlazerError::Signature(format!("Failed to sign transaction: {}", e)))?;

        let hash = self
            .chain
            .send_raw_transaction(envelope.encoded_2718())
            .await?;
        debug!("{} Broadcast {} (gas limit {})", self.label(), hash, gas_limit);

        self.wait_for_confirmation(hash).await
    }

    /// Poll for the receipt until it is final or the timeout passes.
    ///
    /// A failed or stalled poll counts as "not found": the transaction is
    /// already broadcast, so giving up early would risk a duplicate
    /// submission. Each poll only gets the time left before the deadline.
    pub async fn wait_for_confirmation(&self, hash: TxHash) -> Result<Confirmation> {
        let start = Instant::now();
        let timeout = self.settings.confirmation_timeout;
        let mut state = ConfirmationState::Submitted;

        loop {
            let remaining = timeout.saturating_sub(start.elapsed());
            let poll = match tokio::time::timeout(remaining, self.chain.receipt_status(hash)).await
            {
                Ok(Ok(status)) => status,
                Ok(Err(e)) => {
                    warn!("{} Receipt poll for {} failed: {}", self.label(), hash, e);
                    ReceiptStatus::NotFound
                }
                Err(_) => {
                    warn!("{} Receipt poll for {} did not answer in time", self.label(), hash);
                    ReceiptStatus::NotFound
                }
            };

            let next = state.after_poll(poll, start.elapsed(), timeout);
            if next != state {
                debug!("{} {}: {} -> {}", self.label(), hash, state, next);
            }
            state = next;

            match state {
                ConfirmationState::ConfirmedSuccess => {
                    info!(
                        "{} Transaction successful! {}",
                        self.label(),
                        self.tx_link(&hash)
                    );
                    return Ok(Confirmation {
                        hash,
                        fee_wei: poll.fee_wei().unwrap_or_default(),
                    });
                }
                ConfirmationState::ConfirmedFailure => {
                    error!("{} Transaction failed! {}", self.label(), self.tx_link(&hash));
                    return Err(BlazerError::TransactionFailed {
                        hash: hash.to_string(),
                    });
                }
                ConfirmationState::TimedOut => {
                    error!(
                        "{} Transaction not confirmed in {}s: {}",
                        self.label(),
                        timeout.as_secs(),
                        self.tx_link(&hash)
                    );
                    return Err(BlazerError::ConfirmationTimeout {
                        hash: hash.to_string(),
                        elapsed_secs: start.elapsed().as_secs(),
                    });
                }
                ConfirmationState::Pending => sleep(self.settings.pending_poll).await,
                ConfirmationState::Submitted | ConfirmationState::NotFoundRetry => {
                    sleep(self.settings.not_found_poll).await
                }
            }
        }
    }
}

/// Node gas price scaled by a uniform draw from `multiplier`
pub fn jittered_gas_price(base: u128, multiplier: (f64, f64)) -> u128 {
    let (lo, hi) = multiplier;
    let factor = if hi > lo {
        rand::thread_rng().gen_range(lo..=hi)
    } else {
        lo
    };
    (base as f64 * factor) as u128
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("index", &self.index)
            .field("address", &self.address)
            .finish()
    }
}
