//! Read-only statistics for every wallet: balances, history, points, rank.
//!
//! Each wallet is checked by an independent task that returns an immutable
//! [`WalletReport`]; totals are folded only after every task has finished.

use chrono::Local;
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::report::{build_rows, render_table, write_csv, ReportRow, WalletReport};
use crate::adapters::{ActivitySource, PriceClient, RankSource};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::{filter_to_today, total_fees, PointCoefficients, PointTotals};
use crate::error::Result;
use crate::signing::Wallet;

pub struct Checker {
    activity: Arc<dyn ActivitySource>,
    ranks: Arc<dyn RankSource>,
    prices: Option<PriceClient>,
    config: Arc<AppConfig>,
}

impl Checker {
    pub fn new(
        activity: Arc<dyn ActivitySource>,
        ranks: Arc<dyn RankSource>,
        prices: Option<PriceClient>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            activity,
            ranks,
            prices,
            config,
        }
    }

    pub fn from_context(ctx: &AppContext) -> Self {
        Self::new(
            Arc::clone(&ctx.activity),
            Arc::clone(&ctx.ranks),
            Some(ctx.prices.clone()),
            Arc::clone(&ctx.config),
        )
    }

    /// Check every wallet, print the table and write today's CSV snapshot
    pub async fn run(&self, wallets: &[Wallet]) -> Result<Vec<ReportRow>> {
        let eth_price = self.eth_price().await;
        info!("Checking {} wallets...", wallets.len());

        let reports = self.collect(wallets).await;
        let rows = build_rows(reports, self.config.points.daily_target, eth_price);

        println!("{}", render_table(&rows));

        let path = self.snapshot_path();
        write_csv(&rows, &path)?;
        info!("Checker snapshot saved to {}", path.display());

        Ok(rows)
    }

    /// One report per wallet, ordered by wallet index
    pub async fn collect(&self, wallets: &[Wallet]) -> Vec<WalletReport> {
        let workers = self.config.checker.workers.max(1);
        let mut reports: Vec<WalletReport> = stream::iter(wallets)
            .map(|wallet| self.check_wallet(wallet))
            .buffer_unordered(workers)
            .collect()
            .await;
        reports.sort_by_key(|r| r.index);
        reports
    }

    /// Gather one wallet's statistics; every source degrades independently
    pub async fn check_wallet(&self, wallet: &Wallet) -> WalletReport {
        let label = wallet.label();

        let eth_wei = wallet.eth_balance().await.unwrap_or_else(|e| {
            warn!("{} ETH balance unavailable: {}", label, e);
            Default::default()
        });
        let weth_wei = wallet.weth_balance().await.unwrap_or_else(|e| {
            warn!("{} WETH balance unavailable: {}", label, e);
            Default::default()
        });

        let all = match self.activity.fetch_transactions(wallet.address()).await {
            Ok(txns) => txns,
            Err(e) => {
                error!("{} Request for transactions failed!", label);
                debug!("{} {}", label, e);
                Vec::new()
            }
        };
        let today = filter_to_today(&all);

        let rank = match self.ranks.fetch_rank(wallet.address()).await {
            Ok(stats) => Some(stats),
            Err(e) => {
                error!("{} Request for stats failed!", label);
                debug!("{} {}", label, e);
                None
            }
        };

        let coefficients = PointCoefficients::from(&self.config.points);
        WalletReport {
            index: wallet.index(),
            address: wallet.address(),
            eth_wei,
            weth_wei,
            today_txns: today.len(),
            all_txns: all.len(),
            rank,
            points: PointTotals::compute(&today, &coefficients),
            today_fees_wei: total_fees(&today),
            all_fees_wei: total_fees(&all),
        }
    }

    async fn eth_price(&self) -> Decimal {
        let Some(prices) = &self.prices else {
            return Decimal::ZERO;
        };
        match prices.eth_usd().await {
            Ok(price) => price,
            Err(e) => {
                warn!("ETH price unavailable, USD columns will read zero: {}", e);
                Decimal::ZERO
            }
        }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.config
            .paths
            .checker_dir
            .join(format!("{}.csv", Local::now().format("%Y-%m-%d")))
    }
}
