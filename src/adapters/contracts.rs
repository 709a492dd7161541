//! Call encodings for the two contracts the loops talk to.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::error::{BlazerError, Result};

sol! {
    /// Wrapped native token (WETH9 layout)
    interface IWrappedNative {
        function deposit() external payable;
        function withdraw(uint256 wad) external;
        function balanceOf(address account) external view returns (uint256);
    }

    /// Rubyscore vote contract
    interface IRubyscoreVoting {
        function vote() external payable;
    }
}

/// Parse a configured contract address
pub fn parse_address(raw: &str, what: &str) -> Result<Address> {
    raw.trim()
        .parse()
        .map_err(|e| BlazerError::AddressParsing(format!("Invalid {} address {}: {}", what, raw, e)))
}

pub fn deposit_calldata() -> Bytes {
    IWrappedNative::depositCall {}.abi_encode().into()
}

pub fn withdraw_calldata(amount: U256) -> Bytes {
    IWrappedNative::withdrawCall { wad: amount }.abi_encode().into()
}

pub fn balance_of_calldata(account: Address) -> Bytes {
    IWrappedNative::balanceOfCall { account }.abi_encode().into()
}

pub fn decode_balance_of(raw: &[u8]) -> Result<U256> {
    IWrappedNative::balanceOfCall::abi_decode_returns(raw)
        .map_err(|e| BlazerError::Abi(format!("balanceOf returned garbage: {}", e)))
}

pub fn vote_calldata() -> Bytes {
    IRubyscoreVoting::voteCall {}.abi_encode().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors() {
        // keccak("deposit()")[..4]
        assert_eq!(deposit_calldata().as_ref(), &[0xd0, 0xe3, 0x0d, 0xb0]);
        // keccak("withdraw(uint256)")[..4]
        assert_eq!(&withdraw_calldata(U256::from(1u64))[..4], &[0x2e, 0x1a, 0x7d, 0x4d]);
        // keccak("balanceOf(address)")[..4]
        assert_eq!(&balance_of_calldata(Address::ZERO)[..4], &[0x70, 0xa0, 0x82, 0x31]);
        // keccak("vote()")[..4]
        assert_eq!(vote_calldata().len(), 4);
    }

    #[test]
    fn test_withdraw_encodes_amount() {
        let data = withdraw_calldata(U256::from(0x1234u64));
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[34..], &[0x12, 0x34]);
    }

    #[test]
    fn test_decode_balance_of() {
        let mut word = [0u8; 32];
        word[31] = 42;
        assert_eq!(decode_balance_of(&word).unwrap(), U256::from(42u64));
        assert!(decode_balance_of(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("0xA51894664A773981C6C112C43ce576f315d5b1B6", "weth").is_ok());
        assert!(matches!(
            parse_address("0x1234", "weth"),
            Err(BlazerError::AddressParsing(_))
        ));
    }
}
