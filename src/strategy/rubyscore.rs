//! Repeated Rubyscore votes until the gas target is met.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::pacing::random_sleep;
use super::retry::{AttemptOutcome, RetryOutcome, RetryPolicy};
use super::session::PointSession;
use super::{RunSummary, StopReason};
use crate::adapters::contracts::vote_calldata;
use crate::adapters::ActivitySource;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::PointCoefficients;
use crate::error::Result;
use crate::signing::{Confirmation, Wallet};

pub struct RubyscoreModule {
    wallet: Wallet,
    activity: Arc<dyn ActivitySource>,
    config: Arc<AppConfig>,
    voting: Address,
    retry: RetryPolicy,
}

impl RubyscoreModule {
    pub fn new(
        wallet: Wallet,
        activity: Arc<dyn ActivitySource>,
        config: Arc<AppConfig>,
        voting: Address,
    ) -> Self {
        let retry = RetryPolicy::new(config.execution.retry_count);
        Self {
            wallet,
            activity,
            config,
            voting,
            retry,
        }
    }

    pub fn from_context(ctx: &AppContext, wallet: Wallet) -> Self {
        Self::new(
            wallet,
            Arc::clone(&ctx.activity),
            Arc::clone(&ctx.config),
            ctx.rubyscore,
        )
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let label = self.wallet.label();
        let target = self.config.points.daily_target;

        let mut session = PointSession::open(
            self.wallet.address(),
            Arc::clone(&self.activity),
            PointCoefficients::from(&self.config.points),
        )
        .await?;
        let mut summary = RunSummary::new("rubyscore", session.totals());

        if summary.totals.gas_reached(target) {
            warn!("{} Wallet already has {:.0} gas spent points!", label, target);
            return Ok(summary.stopped(StopReason::AlreadyAtTarget));
        }

        loop {
            let outcome = self
                .retry
                .run(&label, "vote", |_| async move {
                    AttemptOutcome::from(self.vote().await)
                })
                .await;

            let confirmation = match outcome {
                RetryOutcome::Success { value, .. } => value,
                RetryOutcome::Exhausted { .. } => {
                    return Ok(summary.stopped(StopReason::RetriesExhausted("vote")));
                }
                RetryOutcome::Terminal { error, .. } => return Err(error),
            };

            // the receipt already carries the fee; no explorer round trip
            session.record(confirmation.hash, confirmation.fee_wei, U256::ZERO);
            summary.actions += 1;
            summary.totals = session.totals();

            info!("{} Successfully voted on Rubyscore!", label);
            debug!(
                "{} Times voted: {} | Gas progress: {:.1}%",
                label,
                summary.actions,
                summary.totals.gas_progress_pct(target)
            );

            if summary.totals.gas_reached(target) {
                return Ok(summary.stopped(StopReason::TargetReached));
            }
            random_sleep(self.config.execution.sleep_between_txns).await;
        }
    }

    async fn vote(&self) -> Result<Confirmation> {
        info!("{} Voting on Rubyscore...", self.wallet.label());
        let request = self
            .wallet
            .get_transaction_data(U256::ZERO)
            .await?
            .with_to(self.voting)
            .with_input(vote_calldata());
        self.wallet.send_transaction(request).await
    }
}
