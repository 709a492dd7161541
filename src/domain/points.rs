//! Trailblazer point math.
//!
//! Points are a pure function of a transaction list and the coefficients:
//! each transaction contributes `min(amount / coefficient, cap)` and the
//! contributions are summed. Nothing here keeps running state, so callers
//! recompute totals from whatever history they currently trust.

use serde::{Deserialize, Serialize};

use super::activity::ActivityTx;
use super::units::wei_to_native;
use crate::config::PointsConfig;

/// Conversion constants for both accumulators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointCoefficients {
    /// Native units of burned fee per gas point
    pub gas: f64,
    /// Native units of value per volume point
    pub volume: f64,
    /// Per-transaction ceiling for either accumulator
    pub per_tx_cap: f64,
}

impl Default for PointCoefficients {
    fn default() -> Self {
        Self::from(&PointsConfig::default())
    }
}

impl From<&PointsConfig> for PointCoefficients {
    fn from(config: &PointsConfig) -> Self {
        Self {
            gas: config.gas_coefficient,
            volume: config.volume_coefficient,
            per_tx_cap: config.per_tx_cap,
        }
    }
}

impl PointCoefficients {
    /// Points for one transaction's burned fee, in native units
    pub fn tx_gas_points(&self, fee_native: f64) -> f64 {
        capped(fee_native / self.gas, self.per_tx_cap)
    }

    /// Points for one transaction's value, in native units
    pub fn tx_volume_points(&self, value_native: f64) -> f64 {
        capped(value_native / self.volume, self.per_tx_cap)
    }
}

fn capped(points: f64, cap: f64) -> f64 {
    if points.is_nan() || points <= 0.0 {
        0.0
    } else {
        points.min(cap)
    }
}

/// Sum of per-transaction gas points
pub fn gas_points(txns: &[ActivityTx], coefficients: &PointCoefficients) -> f64 {
    txns.iter()
        .map(|tx| coefficients.tx_gas_points(wei_to_native(tx.fee_wei)))
        .sum()
}

/// Sum of per-transaction volume points
pub fn volume_points(txns: &[ActivityTx], coefficients: &PointCoefficients) -> f64 {
    txns.iter()
        .map(|tx| coefficients.tx_volume_points(wei_to_native(tx.value_wei)))
        .sum()
}

/// Both accumulators for one wallet at one moment
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointTotals {
    pub gas: f64,
    pub volume: f64,
}

impl PointTotals {
    pub fn compute(txns: &[ActivityTx], coefficients: &PointCoefficients) -> Self {
        Self {
            gas: gas_points(txns, coefficients),
            volume: volume_points(txns, coefficients),
        }
    }

    pub fn gas_reached(&self, target: f64) -> bool {
        self.gas >= target
    }

    pub fn volume_reached(&self, target: f64) -> bool {
        self.volume >= target
    }

    /// Either accumulator at target
    pub fn any_reached(&self, target: f64) -> bool {
        self.gas_reached(target) || self.volume_reached(target)
    }

    pub fn gas_progress_pct(&self, target: f64) -> f64 {
        progress_pct(self.gas, target)
    }

    pub fn volume_progress_pct(&self, target: f64) -> f64 {
        progress_pct(self.volume, target)
    }
}

fn progress_pct(points: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    points / target * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::units::native_to_wei;
    use alloy::primitives::{TxHash, U256};

    fn coefficients() -> PointCoefficients {
        PointCoefficients::default()
    }

    fn tx(fee: f64, value: f64) -> ActivityTx {
        ActivityTx::new(TxHash::ZERO, 0, native_to_wei(fee), native_to_wei(value))
    }

    #[test]
    fn test_single_tx_is_capped() {
        let c = coefficients();
        // 1 ETH of fees is far above the cap
        assert_eq!(c.tx_gas_points(1.0), 1000.0);
        assert_eq!(c.tx_volume_points(10.0), 1000.0);
    }

    #[test]
    fn test_small_tx_scales_linearly() {
        let c = coefficients();
        let pts = c.tx_volume_points(0.0002200895244 * 10.0);
        assert!((pts - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_totals_sum_both_accumulators() {
        let c = coefficients();
        let txns = vec![tx(0.000001, 0.02), tx(0.000001, 0.0)];
        let totals = PointTotals::compute(&txns, &c);

        let expected_gas = 2.0 * (0.000001 / c.gas);
        assert!((totals.gas - expected_gas).abs() < 1e-6);
        assert!((totals.volume - 0.02 / c.volume).abs() < 1e-6);
    }

    #[test]
    fn test_empty_history_is_zero() {
        let totals = PointTotals::compute(&[], &coefficients());
        assert_eq!(totals, PointTotals::default());
        assert!(!totals.any_reached(73000.0));
    }

    #[test]
    fn test_progress_and_targets() {
        let totals = PointTotals {
            gas: 75000.0,
            volume: 36500.0,
        };
        assert!(totals.gas_reached(73000.0));
        assert!(!totals.volume_reached(73000.0));
        assert!(totals.any_reached(73000.0));
        assert!((totals.volume_progress_pct(73000.0) - 50.0).abs() < 1e-9);
        assert_eq!(totals.gas_progress_pct(0.0), 0.0);
    }

    #[test]
    fn test_zero_fee_contributes_nothing() {
        let c = coefficients();
        let zero = ActivityTx::new(TxHash::ZERO, 0, U256::ZERO, U256::ZERO);
        assert_eq!(gas_points(&[zero], &c), 0.0);
    }
}
