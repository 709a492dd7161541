use alloy::primitives::{Address, U256};
use blazer::cli::parse_wallet_selection;
use blazer::domain::{native_to_wei, wei_to_native, PointTotals};
use blazer::error::BlazerError;
use blazer::services::{build_rows, WalletReport};
use blazer::strategy::{plan_wrap_step, WrapStep};
use rust_decimal::Decimal;

#[test]
fn wallet_selection_syntax() {
    assert_eq!(parse_wallet_selection("all", 4).unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(parse_wallet_selection("3", 4).unwrap(), vec![3]);
    assert_eq!(parse_wallet_selection("1,4", 4).unwrap(), vec![1, 4]);
    assert_eq!(parse_wallet_selection("2-4", 4).unwrap(), vec![2, 3, 4]);

    assert!(matches!(
        parse_wallet_selection("5", 4),
        Err(BlazerError::Selection(_))
    ));
    assert!(matches!(
        parse_wallet_selection("3-1", 4),
        Err(BlazerError::Selection(_))
    ));
}

/// 0.02 balance with a 0.0001–0.0003 reserve deposits 0.0197–0.0199
#[test]
fn wrap_deposits_above_minimum() {
    let min = native_to_wei(0.01);
    for reserve in [0.0001, 0.0002, 0.0003] {
        match plan_wrap_step(native_to_wei(0.02), native_to_wei(reserve), U256::ZERO, min) {
            WrapStep::Deposit(amount) => {
                let eth = wei_to_native(amount);
                assert!((0.0197 - 1e-9..=0.0199 + 1e-9).contains(&eth), "got {}", eth);
                assert!(amount >= min);
            }
            other => panic!("expected deposit, got {:?}", other),
        }
    }
}

/// 0.005 balance and nothing wrapped means stop without a transaction
#[test]
fn wrap_stops_when_balance_is_too_small() {
    let step = plan_wrap_step(
        native_to_wei(0.005),
        native_to_wei(0.0002),
        U256::ZERO,
        native_to_wei(0.01),
    );
    assert_eq!(step, WrapStep::Stop);
}

#[test]
fn wrap_withdraws_instead_of_small_deposit() {
    let weth = native_to_wei(0.015);
    let step = plan_wrap_step(native_to_wei(0.004), native_to_wei(0.0001), weth, native_to_wei(0.01));
    assert_eq!(step, WrapStep::Withdraw(weth));
}

fn report(index: usize) -> WalletReport {
    WalletReport {
        index,
        address: Address::repeat_byte(index as u8),
        eth_wei: native_to_wei(0.1),
        weth_wei: U256::ZERO,
        today_txns: index,
        all_txns: index * 10,
        rank: None,
        points: PointTotals::default(),
        today_fees_wei: U256::ZERO,
        all_fees_wei: U256::ZERO,
    }
}

#[test]
fn totals_row_is_always_last() {
    for order in [vec![1, 2, 3, 10], vec![10, 3, 2, 1], vec![3, 10, 1, 2]] {
        let reports = order.into_iter().map(report).collect();
        let rows = build_rows(reports, 73_000.0, Decimal::ZERO);

        let numbers: Vec<&str> = rows.iter().map(|r| r.number.as_str()).collect();
        assert_eq!(numbers, vec!["1", "2", "3", "10", "Total"]);
        assert_eq!(rows.last().map(|r| r.txns.as_str()), Some("16|160"));
    }
}

#[test]
fn empty_batch_still_has_totals_row() {
    let rows = build_rows(Vec::new(), 73_000.0, Decimal::ZERO);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_total());
    assert_eq!(rows[0].ban, "0/0");
}
