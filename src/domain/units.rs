//! Wei ↔ native unit conversions shared by points, reports and loops.

use alloy::primitives::U256;
use rust_decimal::Decimal;

/// Decimals of the native currency and its wrapped token
pub const NATIVE_DECIMALS: u32 = 18;

const WEI_PER_NATIVE: f64 = 1e18;

/// Wei as a float in native units (precision is fine for point math)
pub fn wei_to_native(wei: U256) -> f64 {
    u128::try_from(wei).unwrap_or(u128::MAX) as f64 / WEI_PER_NATIVE
}

/// Wei as an exact decimal in native units, saturating at `Decimal::MAX`
pub fn wei_to_decimal(wei: U256) -> Decimal {
    u128::try_from(wei)
        .ok()
        .and_then(|raw| i128::try_from(raw).ok())
        .and_then(|raw| Decimal::try_from_i128_with_scale(raw, NATIVE_DECIMALS).ok())
        .map(|d| d.normalize())
        .unwrap_or(Decimal::MAX)
}

/// Native units to wei, truncating below one wei; negatives clamp to zero
pub fn native_to_wei(amount: f64) -> U256 {
    if !amount.is_finite() || amount <= 0.0 {
        return U256::ZERO;
    }
    U256::from((amount * WEI_PER_NATIVE) as u128)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_wei_to_native() {
        let one = U256::from(10u128.pow(18));
        assert_eq!(wei_to_native(one), 1.0);
        assert_eq!(wei_to_native(U256::ZERO), 0.0);
    }

    #[test]
    fn test_wei_to_decimal_is_exact() {
        let wei = U256::from(19_700_000_000_000_000u128);
        assert_eq!(wei_to_decimal(wei), dec!(0.0197));
    }

    #[test]
    fn test_native_to_wei() {
        assert_eq!(native_to_wei(0.01), U256::from(10_000_000_000_000_000u128));
        assert_eq!(native_to_wei(-1.0), U256::ZERO);
        assert_eq!(native_to_wei(f64::NAN), U256::ZERO);
    }
}
