use alloy::primitives::U256;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

use crate::domain::native_to_wei;

/// Uniform whole-second draw from an inclusive range
pub fn pick_secs(range: (u64, u64)) -> u64 {
    let (lo, hi) = range;
    if hi <= lo {
        lo
    } else {
        rand::thread_rng().gen_range(lo..=hi)
    }
}

/// Sleep a random number of seconds from `range`, announcing it first
pub async fn random_sleep(range: (u64, u64)) {
    let secs = pick_secs(range);
    if secs == 0 {
        return;
    }
    info!("Sleeping for {} seconds...", secs);
    sleep(Duration::from_secs(secs)).await;
}

/// Native balance to hold back for gas, drawn uniformly from `range` (native units)
pub fn random_reserve(range: (f64, f64)) -> U256 {
    let (lo, hi) = range;
    let amount = if hi > lo {
        rand::thread_rng().gen_range(lo..=hi)
    } else {
        lo
    };
    native_to_wei(amount)
}
