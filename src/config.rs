use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub contracts: ContractsConfig,
    #[serde(default)]
    pub apis: ApiConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub points: PointsConfig,
    #[serde(default)]
    pub wrap: WrapConfig,
    #[serde(default)]
    pub checker: CheckerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Block explorer prefix for transaction links
    pub explorer_tx_url: String,
    /// Upper bound on a single JSON-RPC request
    pub rpc_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://rpc.ankr.com/taiko".to_string(),
            explorer_tx_url: "https://taikoexplorer.com/tx/".to_string(),
            rpc_timeout_secs: 20,
        }
    }
}

impl NetworkConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// Wrapped native token (deposit/withdraw/balanceOf)
    pub weth: String,
    /// Rubyscore voting contract
    pub rubyscore: String,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            weth: "0xA51894664A773981C6C112C43ce576f315d5b1B6".to_string(),
            rubyscore: "0x4D1E2145082d0AB0fDa4a973dC4887C7295e21aB".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Etherscan-compatible explorer API
    pub explorer_url: String,
    /// Explorer API key (falls back to EXPLORER_API_KEY)
    pub explorer_api_key: Option<String>,
    /// Trailblazer rank endpoint
    pub rank_url: String,
    /// Spot price ticker endpoint
    pub price_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            explorer_url: "https://api.taikoscan.io/api".to_string(),
            explorer_api_key: None,
            rank_url: "https://trailblazer.mainnet.taiko.xyz/s2/user/rank".to_string(),
            price_url: "https://api.binance.com/api/v3/ticker/price".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn resolved_explorer_api_key(&self) -> Option<String> {
        self.explorer_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("EXPLORER_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Attempts per on-chain action before giving up on the wallet
    pub retry_count: u32,
    /// Uniform multiplier range applied to the node's gas price
    pub gas_multiplier: (f64, f64),
    /// Random pause between transactions, seconds
    pub sleep_between_txns: (u64, u64),
    /// Random pause between wallets, seconds
    pub sleep_between_wallets: (u64, u64),
    /// Give up waiting for a receipt after this many seconds
    pub confirmation_timeout_secs: u64,
    /// Re-poll interval while the receipt is pending
    pub pending_poll_ms: u64,
    /// Re-poll interval while the node does not know the transaction
    pub not_found_poll_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            retry_count: 3,
            gas_multiplier: (1.2, 1.4),
            sleep_between_txns: (10, 15),
            sleep_between_wallets: (30, 60),
            confirmation_timeout_secs: 300,
            pending_poll_ms: 500,
            not_found_poll_ms: 1000,
        }
    }
}

impl ExecutionConfig {
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn pending_poll_interval(&self) -> Duration {
        Duration::from_millis(self.pending_poll_ms)
    }

    pub fn not_found_poll_interval(&self) -> Duration {
        Duration::from_millis(self.not_found_poll_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PointsConfig {
    /// Native units of burned fee worth one gas point
    pub gas_coefficient: f64,
    /// Native units of value worth one volume point
    pub volume_coefficient: f64,
    /// Maximum points a single transaction can contribute
    pub per_tx_cap: f64,
    /// Daily target for either accumulator
    pub daily_target: f64,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            gas_coefficient: 0.000000004856534,
            volume_coefficient: 0.0002200895244,
            per_tx_cap: 1000.0,
            daily_target: 73000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WrapConfig {
    /// Smallest deposit worth submitting, native units
    pub min_deposit: f64,
    /// Native balance kept back for gas, drawn uniformly per round
    pub reserve: (f64, f64),
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            min_deposit: 0.01,
            reserve: (0.0001, 0.0003),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Concurrent per-wallet stat collections
    pub workers: usize,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self { workers: 8 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// One private key per line
    pub keys_file: PathBuf,
    /// Daily CSV snapshots of the checker table
    pub checker_dir: PathBuf,
    /// Rolling log files
    pub log_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            keys_file: PathBuf::from("data/keys.txt"),
            checker_dir: PathBuf::from("data/checker"),
            log_dir: PathBuf::from("data/logs"),
        }
    }
}

impl PathsConfig {
    /// Create the output directories if they do not exist yet
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.checker_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable JSON formatted logs
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("BLAZER_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (BLAZER_NETWORK__RPC_URL, etc.)
            .add_source(
                Environment::with_prefix("BLAZER")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.network.rpc_url.trim().is_empty() {
            errors.push("network.rpc_url must not be empty".to_string());
        }
        if self.network.rpc_timeout_secs == 0 {
            errors.push("network.rpc_timeout_secs must be positive".to_string());
        }

        let exec = &self.execution;
        if exec.retry_count == 0 {
            errors.push("execution.retry_count must be at least 1".to_string());
        }
        if exec.gas_multiplier.0 <= 0.0 || exec.gas_multiplier.0 > exec.gas_multiplier.1 {
            errors.push(format!(
                "execution.gas_multiplier must be a positive ascending range, got {:?}",
                exec.gas_multiplier
            ));
        }
        if exec.sleep_between_txns.0 > exec.sleep_between_txns.1 {
            errors.push("execution.sleep_between_txns range is inverted".to_string());
        }
        if exec.sleep_between_wallets.0 > exec.sleep_between_wallets.1 {
            errors.push("execution.sleep_between_wallets range is inverted".to_string());
        }
        if exec.confirmation_timeout_secs == 0 {
            errors.push("execution.confirmation_timeout_secs must be positive".to_string());
        }

        let points = &self.points;
        if points.gas_coefficient <= 0.0 || points.volume_coefficient <= 0.0 {
            errors.push("points coefficients must be positive".to_string());
        }
        if points.per_tx_cap <= 0.0 || points.daily_target <= 0.0 {
            errors.push("points.per_tx_cap and points.daily_target must be positive".to_string());
        }

        if self.wrap.min_deposit <= 0.0 {
            errors.push("wrap.min_deposit must be positive".to_string());
        }
        if self.wrap.reserve.0 < 0.0 || self.wrap.reserve.0 > self.wrap.reserve.1 {
            errors.push(format!(
                "wrap.reserve must be a non-negative ascending range, got {:?}",
                self.wrap.reserve
            ));
        }

        if self.checker.workers == 0 {
            errors.push("checker.workers must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.execution.retry_count, 3);
        assert_eq!(config.execution.confirmation_timeout(), Duration::from_secs(300));
        assert_eq!(config.network.rpc_timeout(), Duration::from_secs(20));
        assert_eq!(config.points.daily_target, 73000.0);
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let mut config = AppConfig::default();
        config.execution.retry_count = 0;
        config.execution.gas_multiplier = (1.4, 1.2);
        config.wrap.reserve = (0.0003, 0.0001);

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("retry_count")));
        assert!(errors.iter().any(|e| e.contains("gas_multiplier")));
        assert!(errors.iter().any(|e| e.contains("wrap.reserve")));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            r#"
[execution]
retry_count = 5
sleep_between_txns = [1, 2]

[wrap]
min_deposit = 0.05
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.execution.retry_count, 5);
        assert_eq!(config.execution.sleep_between_txns, (1, 2));
        // untouched keys keep their defaults
        assert_eq!(config.execution.gas_multiplier, (1.2, 1.4));
        assert_eq!(config.wrap.min_deposit, 0.05);
        assert_eq!(config.network.rpc_url, "https://rpc.ankr.com/taiko");
    }
}
