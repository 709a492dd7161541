pub mod binance;
pub mod chain;
pub mod contracts;
pub mod explorer;
pub mod trailblazer;
pub mod traits;

pub use binance::PriceClient;
pub use chain::RpcChainClient;
pub use explorer::{ExplorerClient, ExplorerTx};
pub use trailblazer::{RankStats, TrailblazerClient};
pub use traits::{ActivitySource, ChainClient, RankSource};

#[cfg(test)]
pub use traits::{MockActivitySource, MockChainClient, MockRankSource};
