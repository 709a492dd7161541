//! Today's point-relevant history for one wallet during one module run.

use alloy::primitives::{Address, TxHash, U256};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::adapters::ActivitySource;
use crate::domain::{filter_to_today, merge_by_hash, ActivityTx, PointCoefficients, PointTotals};
use crate::error::Result;

/// Explorer history merged with transactions confirmed in this run.
///
/// Totals are always recomputed from the merged list; the session never
/// keeps a running score.
pub struct PointSession {
    address: Address,
    activity: Arc<dyn ActivitySource>,
    coefficients: PointCoefficients,
    history: Vec<ActivityTx>,
    confirmed: Vec<ActivityTx>,
}

impl PointSession {
    /// Fetch today's history; a failed fetch is returned to the caller
    pub async fn open(
        address: Address,
        activity: Arc<dyn ActivitySource>,
        coefficients: PointCoefficients,
    ) -> Result<Self> {
        let history = filter_to_today(&activity.fetch_transactions(address).await?);
        debug!("{} has {} point transactions today", address, history.len());

        Ok(Self {
            address,
            activity,
            coefficients,
            history,
            confirmed: Vec::new(),
        })
    }

    /// Remember a transaction confirmed by this process
    pub fn record(&mut self, hash: TxHash, fee_wei: U256, value_wei: U256) {
        self.confirmed.push(ActivityTx::new(
            hash,
            Utc::now().timestamp(),
            fee_wei,
            value_wei,
        ));
    }

    /// Re-fetch history and recompute; keeps the previous history if the
    /// explorer is unavailable
    pub async fn refresh(&mut self) -> PointTotals {
        match self.activity.fetch_transactions(self.address).await {
            Ok(txns) => self.history = filter_to_today(&txns),
            Err(e) => warn!(
                "History refresh for {} failed, using last known: {}",
                self.address, e
            ),
        }
        self.totals()
    }

    pub fn transactions(&self) -> Vec<ActivityTx> {
        filter_to_today(&merge_by_hash(&self.history, &self.confirmed))
    }

    pub fn totals(&self) -> PointTotals {
        PointTotals::compute(&self.transactions(), &self.coefficients)
    }
}
