pub mod adapters;
pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod services;
pub mod signing;
pub mod strategy;

pub use config::AppConfig;
pub use context::AppContext;
pub use error::{BlazerError, Result};
pub use services::Checker;
pub use signing::Wallet;
pub use strategy::{RubyscoreModule, WrapModule};
