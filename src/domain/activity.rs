use alloy::primitives::{TxHash, U256};
use chrono::{DateTime, TimeZone, Utc};

/// One outgoing transaction that counts toward points.
///
/// Built either from explorer history or from a receipt confirmed during
/// the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityTx {
    pub hash: TxHash,
    /// Unix seconds
    pub timestamp: i64,
    /// Burned fee in wei (gas used × gas price)
    pub fee_wei: U256,
    /// Native value sent with the call in wei
    pub value_wei: U256,
}

impl ActivityTx {
    pub fn new(hash: TxHash, timestamp: i64, fee_wei: U256, value_wei: U256) -> Self {
        Self {
            hash,
            timestamp,
            fee_wei,
            value_wei,
        }
    }
}

/// Midnight UTC of the day containing `now`
pub fn utc_day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_else(|| now.naive_utc());
    Utc.from_utc_datetime(&midnight)
}

/// Keep transactions at or after `since`
pub fn filter_since(txns: &[ActivityTx], since: DateTime<Utc>) -> Vec<ActivityTx> {
    let cutoff = since.timestamp();
    txns.iter()
        .filter(|tx| tx.timestamp >= cutoff)
        .cloned()
        .collect()
}

/// Keep transactions from the current UTC day
pub fn filter_to_today(txns: &[ActivityTx]) -> Vec<ActivityTx> {
    filter_since(txns, utc_day_start(Utc::now()))
}

/// Union of two transaction lists, first occurrence of each hash wins
pub fn merge_by_hash(history: &[ActivityTx], local: &[ActivityTx]) -> Vec<ActivityTx> {
    let mut merged: Vec<ActivityTx> = history.to_vec();
    for tx in local {
        if !merged.iter().any(|known| known.hash == tx.hash) {
            merged.push(tx.clone());
        }
    }
    merged
}

/// Total burned fee in wei
pub fn total_fees(txns: &[ActivityTx]) -> U256 {
    txns.iter().fold(U256::ZERO, |acc, tx| acc.saturating_add(tx.fee_wei))
}
