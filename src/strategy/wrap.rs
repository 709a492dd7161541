//! Deposit/withdraw loop on the wrapped native token.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::pacing::{random_reserve, random_sleep};
use super::retry::{AttemptOutcome, RetryOutcome, RetryPolicy};
use super::session::PointSession;
use super::{RunSummary, StopReason};
use crate::adapters::contracts::{deposit_calldata, withdraw_calldata};
use crate::adapters::ActivitySource;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::{native_to_wei, wei_to_native, PointCoefficients};
use crate::error::Result;
use crate::signing::{Confirmation, Wallet};

/// What the next round should do, given current balances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapStep {
    /// Wrap this much, then unwrap it again
    Deposit(U256),
    /// Too little native balance; unwrap what is already wrapped
    Withdraw(U256),
    /// Nothing to wrap and nothing to unwrap
    Stop,
}

/// Never deposits below `min_deposit`; withdraws instead when a wrapped
/// balance exists.
pub fn plan_wrap_step(
    eth_balance: U256,
    reserve: U256,
    weth_balance: U256,
    min_deposit: U256,
) -> WrapStep {
    let deposit = eth_balance.saturating_sub(reserve);
    if deposit >= min_deposit && !deposit.is_zero() {
        WrapStep::Deposit(deposit)
    } else if !weth_balance.is_zero() {
        WrapStep::Withdraw(weth_balance)
    } else {
        WrapStep::Stop
    }
}

pub struct WrapModule {
    wallet: Wallet,
    activity: Arc<dyn ActivitySource>,
    config: Arc<AppConfig>,
    weth: Address,
    retry: RetryPolicy,
}

impl WrapModule {
    pub fn new(
        wallet: Wallet,
        activity: Arc<dyn ActivitySource>,
        config: Arc<AppConfig>,
        weth: Address,
    ) -> Self {
        let retry = RetryPolicy::new(config.execution.retry_count);
        Self {
            wallet,
            activity,
            config,
            weth,
            retry,
        }
    }

    pub fn from_context(ctx: &AppContext, wallet: Wallet) -> Self {
        Self::new(
            wallet,
            Arc::clone(&ctx.activity),
            Arc::clone(&ctx.config),
            ctx.weth,
        )
    }

    /// Wrap and unwrap until either point target is met, the balance runs
    /// out, or an action exhausts its retries
    pub async fn run(&self) -> Result<RunSummary> {
        let label = self.wallet.label();
        let target = self.config.points.daily_target;
        let min_deposit = self.config.wrap.min_deposit;
        let txn_pause = self.config.execution.sleep_between_txns;

        let mut session = PointSession::open(
            self.wallet.address(),
            Arc::clone(&self.activity),
            PointCoefficients::from(&self.config.points),
        )
        .await?;
        let mut summary = RunSummary::new("wrap", session.totals());

        if summary.totals.gas_reached(target) {
            warn!("{} Wallet already has {:.0} gas spent points!", label, target);
            return Ok(summary.stopped(StopReason::AlreadyAtTarget));
        }
        if summary.totals.volume_reached(target) {
            warn!("{} Wallet already has {:.0} volume points!", label, target);
            return Ok(summary.stopped(StopReason::AlreadyAtTarget));
        }

        loop {
            let (eth_balance, weth_balance) = self
                .retry
                .run(&label, "balance check", |_| async move {
                    AttemptOutcome::from(self.balances().await)
                })
                .await
                .into_result("balance check")?;
            let reserve = random_reserve(self.config.wrap.reserve);
            let step = plan_wrap_step(eth_balance, reserve, weth_balance, native_to_wei(min_deposit));
            debug!(
                "{} ETH {:.5} | WETH {:.5} | reserve {:.5} -> {:?}",
                label,
                wei_to_native(eth_balance),
                wei_to_native(weth_balance),
                wei_to_native(reserve),
                step
            );

            let amount = match step {
                WrapStep::Stop => {
                    error!("{} Deposit amount < {}ETH!", label, min_deposit);
                    return Ok(summary.stopped(StopReason::InsufficientBalance));
                }
                WrapStep::Withdraw(_) => {
                    match self.try_withdraw(&mut session).await? {
                        Some(_) => {
                            summary.actions += 1;
                            summary.totals = session.refresh().await;
                            random_sleep(txn_pause).await;
                            continue;
                        }
                        None => {
                            error!("{} Deposit amount < {}ETH!", label, min_deposit);
                            return Ok(summary.stopped(StopReason::RetriesExhausted("withdraw")));
                        }
                    }
                }
                WrapStep::Deposit(amount) => amount,
            };

            if self.try_deposit(amount, &mut session).await?.is_none() {
                return Ok(summary.stopped(StopReason::RetriesExhausted("deposit")));
            }
            summary.actions += 1;

            random_sleep(txn_pause).await;

            if self.try_withdraw(&mut session).await?.is_none() {
                return Ok(summary.stopped(StopReason::RetriesExhausted("withdraw")));
            }
            summary.actions += 1;

            summary.volume_wei = summary.volume_wei.saturating_add(amount);
            summary.totals = session.refresh().await;
            info!(
                "{} Successfully wrapped and unwrapped {:.3}ETH!",
                label,
                wei_to_native(amount)
            );
            debug!(
                "{} Traded volume: {:.2}ETH | Gas progress: {:.1}% | Volume progress: {:.1}%",
                label,
                wei_to_native(summary.volume_wei),
                summary.totals.gas_progress_pct(target),
                summary.totals.volume_progress_pct(target)
            );

            if summary.totals.any_reached(target) {
                return Ok(summary.stopped(StopReason::TargetReached));
            }
            random_sleep(txn_pause).await;
        }
    }

    /// Native and wrapped balances, in wei
    async fn balances(&self) -> Result<(U256, U256)> {
        Ok((
            self.wallet.eth_balance().await?,
            self.wallet.weth_balance().await?,
        ))
    }

    async fn deposit(&self, amount: U256) -> Result<Confirmation> {
        info!(
            "{} Making deposit of {:.3} ETH...",
            self.wallet.label(),
            wei_to_native(amount)
        );
        let request = self
            .wallet
            .get_transaction_data(amount)
            .await?
            .with_to(self.weth)
            .with_input(deposit_calldata());
        self.wallet.send_transaction(request).await
    }

    async fn withdraw(&self) -> Result<Confirmation> {
        let amount = self.wallet.weth_balance().await?;
        info!(
            "{} Making withdrawal of {:.3} ETH...",
            self.wallet.label(),
            wei_to_native(amount)
        );
        let request = self
            .wallet
            .get_transaction_data(U256::ZERO)
            .await?
            .with_to(self.weth)
            .with_input(withdraw_calldata(amount));
        self.wallet.send_transaction(request).await
    }

    /// `Ok(None)` when retries ran out; `Err` only for terminal failures
    async fn try_deposit(&self, amount: U256, session: &mut PointSession) -> Result<Option<Confirmation>> {
        let outcome = self
            .retry
            .run(&self.wallet.label(), "deposit", |_| async move {
                AttemptOutcome::from(self.deposit(amount).await)
            })
            .await;
        settle(outcome, session, amount)
    }

    async fn try_withdraw(&self, session: &mut PointSession) -> Result<Option<Confirmation>> {
        let outcome = self
            .retry
            .run(&self.wallet.label(), "withdraw", |_| async move {
                AttemptOutcome::from(self.withdraw().await)
            })
            .await;
        settle(outcome, session, U256::ZERO)
    }
}

fn settle(
    outcome: RetryOutcome<Confirmation>,
    session: &mut PointSession,
    value_wei: U256,
) -> Result<Option<Confirmation>> {
    match outcome {
        RetryOutcome::Success { value, .. } => {
            session.record(value.hash, value.fee_wei, value_wei);
            Ok(Some(value))
        }
        RetryOutcome::Exhausted { .. } => Ok(None),
        RetryOutcome::Terminal { error, .. } => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockActivitySource, MockChainClient};
    use crate::domain::{ActivityTx, ReceiptStatus};
    use crate::error::BlazerError;
    use crate::signing::TxSettings;
    use alloy::primitives::{Bytes, TxHash};
    use chrono::Utc;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn eth(amount: f64) -> U256 {
        native_to_wei(amount)
    }

    fn word(value: U256) -> Bytes {
        Bytes::from(value.to_be_bytes::<32>().to_vec())
    }

    fn test_config() -> Arc<AppConfig> {
        let mut config = AppConfig::default();
        config.execution.sleep_between_txns = (0, 0);
        config.execution.confirmation_timeout_secs = 1;
        config.execution.pending_poll_ms = 1;
        config.execution.not_found_poll_ms = 1;
        Arc::new(config)
    }

    fn capped_history(count: u8) -> Vec<ActivityTx> {
        (0..count)
            .map(|i| {
                ActivityTx::new(
                    TxHash::with_last_byte(i),
                    Utc::now().timestamp(),
                    eth(0.01),
                    U256::ZERO,
                )
            })
            .collect()
    }

    fn module(chain: MockChainClient, history: Vec<ActivityTx>) -> WrapModule {
        let config = test_config();
        let mut activity = MockActivitySource::new();
        activity
            .expect_fetch_transactions()
            .returning(move |_| Ok(history.clone()));
        let weth = Address::repeat_byte(0xee);
        let wallet = Wallet::from_private_key(
            1,
            TEST_KEY,
            Arc::new(chain),
            weth,
            TxSettings::from(config.as_ref()),
        )
        .unwrap();
        WrapModule::new(wallet, Arc::new(activity), config, weth)
    }

    #[test]
    fn test_plan_deposits_balance_minus_reserve() {
        let step = plan_wrap_step(eth(0.02), eth(0.0002), U256::ZERO, eth(0.01));
        assert_eq!(step, WrapStep::Deposit(eth(0.02) - eth(0.0002)));
    }

    #[test]
    fn test_plan_withdraws_below_minimum() {
        let step = plan_wrap_step(eth(0.005), eth(0.0002), eth(0.03), eth(0.01));
        assert_eq!(step, WrapStep::Withdraw(eth(0.03)));
    }

    #[test]
    fn test_plan_stops_when_nothing_to_do() {
        assert_eq!(
            plan_wrap_step(eth(0.005), eth(0.0002), U256::ZERO, eth(0.01)),
            WrapStep::Stop
        );
        // reserve larger than balance
        assert_eq!(
            plan_wrap_step(eth(0.0001), eth(0.0003), U256::ZERO, eth(0.01)),
            WrapStep::Stop
        );
    }

    #[tokio::test]
    async fn test_low_balance_stops_without_submitting() {
        let mut chain = MockChainClient::new();
        chain.expect_balance().returning(|_| Ok(native_to_wei(0.005)));
        chain.expect_call().returning(|_| Ok(word(U256::ZERO)));
        chain.expect_send_raw_transaction().times(0);

        let summary = module(chain, vec![]).run().await.unwrap();
        assert_eq!(summary.stop, StopReason::InsufficientBalance);
        assert_eq!(summary.actions, 0);
    }

    #[tokio::test]
    async fn test_already_at_gas_target_skips_wallet() {
        let mut chain = MockChainClient::new();
        chain.expect_balance().times(0);
        chain.expect_send_raw_transaction().times(0);

        let summary = module(chain, capped_history(75)).run().await.unwrap();
        assert_eq!(summary.stop, StopReason::AlreadyAtTarget);
    }

    #[tokio::test]
    async fn test_round_trip_until_target() {
        let mut chain = MockChainClient::new();
        chain.expect_balance().returning(|_| Ok(native_to_wei(0.05)));
        chain.expect_call().returning(|_| Ok(word(native_to_wei(0.04))));
        chain.expect_nonce().returning(|_| Ok(3));
        chain.expect_gas_price().returning(|| Ok(1_000_000_000));
        chain.expect_chain_id().returning(|| Ok(167_000));
        chain.expect_estimate_gas().returning(|_| Ok(60_000));
        let mut sent = 0u8;
        chain.expect_send_raw_transaction().times(2).returning(move |_| {
            sent += 1;
            Ok(TxHash::repeat_byte(sent))
        });
        // 50k gas at 1000 gwei burns 0.05 ETH, enough for a capped 1000 points
        chain.expect_receipt_status().returning(|_| {
            Ok(ReceiptStatus::Success {
                gas_used: 50_000,
                effective_gas_price: 1_000_000_000_000,
            })
        });

        let summary = module(chain, capped_history(72)).run().await.unwrap();
        assert_eq!(summary.stop, StopReason::TargetReached);
        assert_eq!(summary.actions, 2);
        assert_eq!(summary.totals.gas, 74_000.0);
        assert!(summary.volume_wei > native_to_wei(0.0495));
    }

    #[tokio::test]
    async fn test_deposit_exhaustion_ends_wallet() {
        let mut chain = MockChainClient::new();
        chain.expect_balance().returning(|_| Ok(native_to_wei(0.05)));
        chain.expect_call().returning(|_| Ok(word(U256::ZERO)));
        chain
            .expect_nonce()
            .times(3)
            .returning(|_| Err(BlazerError::Rpc("503".into())));
        chain.expect_send_raw_transaction().times(0);

        let summary = module(chain, vec![]).run().await.unwrap();
        assert_eq!(summary.stop, StopReason::RetriesExhausted("deposit"));
    }

    #[tokio::test]
    async fn test_low_balance_unwraps_then_replans() {
        let mut chain = MockChainClient::new();
        chain.expect_balance().returning(|_| Ok(native_to_wei(0.005)));
        // wrapped balance is read by the planner and by the withdrawal,
        // then is gone on the next round
        let mut reads = 0u32;
        chain.expect_call().returning(move |_| {
            reads += 1;
            Ok(word(if reads <= 2 { eth(0.03) } else { U256::ZERO }))
        });
        chain.expect_nonce().returning(|_| Ok(9));
        chain.expect_gas_price().returning(|| Ok(1_000_000_000));
        chain.expect_chain_id().returning(|| Ok(167_000));
        chain.expect_estimate_gas().times(1).returning(|request| {
            assert_eq!(request.value, Some(U256::ZERO));
            Ok(45_000)
        });
        chain
            .expect_send_raw_transaction()
            .times(1)
            .returning(|_| Ok(TxHash::repeat_byte(0x77)));
        chain.expect_receipt_status().returning(|_| {
            Ok(ReceiptStatus::Success {
                gas_used: 45_000,
                effective_gas_price: 1_000_000_000,
            })
        });

        let summary = module(chain, vec![]).run().await.unwrap();
        assert_eq!(summary.actions, 1);
        assert_eq!(summary.volume_wei, U256::ZERO);
        assert_eq!(summary.stop, StopReason::InsufficientBalance);
    }

    #[tokio::test]
    async fn test_balance_read_is_retried() {
        let mut chain = MockChainClient::new();
        let mut reads = 0u32;
        chain.expect_balance().times(2).returning(move |_| {
            reads += 1;
            if reads == 1 {
                Err(BlazerError::Rpc("eth_getBalance timed out".into()))
            } else {
                Ok(native_to_wei(0.005))
            }
        });
        chain.expect_call().returning(|_| Ok(word(U256::ZERO)));
        chain.expect_send_raw_transaction().times(0);

        let summary = module(chain, vec![]).run().await.unwrap();
        assert_eq!(summary.stop, StopReason::InsufficientBalance);
    }

    #[tokio::test]
    async fn test_balance_read_exhaustion_is_an_error() {
        let mut chain = MockChainClient::new();
        chain
            .expect_balance()
            .times(3)
            .returning(|_| Err(BlazerError::Rpc("connection refused".into())));
        chain.expect_send_raw_transaction().times(0);

        let err = module(chain, vec![]).run().await.unwrap_err();
        assert!(matches!(
            err,
            BlazerError::RetriesExhausted { ref action, attempts: 3 } if action == "balance check"
        ));
    }
}
