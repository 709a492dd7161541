pub mod keys;
pub mod wallet;

pub use keys::load_keys;
pub use wallet::{jittered_gas_price, Confirmation, TxSettings, Wallet};
