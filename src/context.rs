//! Service handles built once at startup and shared by every module run.

use alloy::primitives::Address;
use std::sync::Arc;
use tracing::info;

use crate::adapters::contracts::parse_address;
use crate::adapters::{
    ActivitySource, ChainClient, ExplorerClient, PriceClient, RankSource, RpcChainClient,
    TrailblazerClient,
};
use crate::config::AppConfig;
use crate::error::Result;
use crate::signing::{TxSettings, Wallet};

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub chain: Arc<dyn ChainClient>,
    pub activity: Arc<dyn ActivitySource>,
    pub ranks: Arc<dyn RankSource>,
    pub prices: PriceClient,
    pub weth: Address,
    pub rubyscore: Address,
}

impl AppContext {
    /// Connect every client described by `config`
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let timeout = std::time::Duration::from_secs(config.apis.timeout_secs);

        let chain = RpcChainClient::connect(&config.network.rpc_url, config.network.rpc_timeout())?;
        let explorer = ExplorerClient::new(
            &config.apis.explorer_url,
            config.apis.resolved_explorer_api_key(),
            timeout,
        )?;
        let ranks = TrailblazerClient::new(&config.apis.rank_url, timeout)?;
        let prices = PriceClient::new(&config.apis.price_url, timeout)?;

        let weth = parse_address(&config.contracts.weth, "contracts.weth")?;
        let rubyscore = parse_address(&config.contracts.rubyscore, "contracts.rubyscore")?;

        info!("RPC endpoint: {}", chain.rpc_url());

        Ok(Self {
            config: Arc::new(config),
            chain: Arc::new(chain),
            activity: Arc::new(explorer),
            ranks: Arc::new(ranks),
            prices,
            weth,
            rubyscore,
        })
    }

    /// One `Wallet` per key, numbered from 1 in file order
    pub fn build_wallets(&self, keys: &[String]) -> Result<Vec<Wallet>> {
        let settings = TxSettings::from(self.config.as_ref());
        keys.iter()
            .enumerate()
            .map(|(i, key)| {
                Wallet::from_private_key(
                    i + 1,
                    key,
                    Arc::clone(&self.chain),
                    self.weth,
                    settings.clone(),
                )
            })
            .collect()
    }
}
