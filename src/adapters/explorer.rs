//! Etherscan-compatible explorer client (taikoscan `account/txlist`).

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::ActivitySource;
use crate::domain::ActivityTx;
use crate::error::{BlazerError, Result};

const NO_TRANSACTIONS: &str = "No transactions found";

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// Raw `txlist` row; every number arrives as a decimal string
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTx {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub value: String,
    pub gas_used: String,
    pub gas_price: String,
    pub time_stamp: String,
    pub is_error: String,
    #[serde(default)]
    pub function_name: String,
}

impl ExplorerTx {
    /// Whether this row earns points for `wallet`: originated by the wallet,
    /// not a self-send, not a token transfer/approval, not reverted
    pub fn counts_for(&self, wallet: &str) -> bool {
        self.from.eq_ignore_ascii_case(wallet)
            && !self.to.eq_ignore_ascii_case(wallet)
            && !self.function_name.starts_with("transfer")
            && !self.function_name.starts_with("approve")
            && self.is_error == "0"
    }

    pub fn to_activity(&self) -> Result<ActivityTx> {
        let hash: TxHash = self
            .hash
            .parse()
            .map_err(|e| BlazerError::Explorer(format!("bad hash {}: {}", self.hash, e)))?;
        let gas_used = parse_u256(&self.gas_used, "gasUsed")?;
        let gas_price = parse_u256(&self.gas_price, "gasPrice")?;
        let value = parse_u256(&self.value, "value")?;
        let timestamp = self
            .time_stamp
            .parse::<i64>()
            .map_err(|e| BlazerError::Explorer(format!("bad timeStamp {}: {}", self.time_stamp, e)))?;

        Ok(ActivityTx::new(
            hash,
            timestamp,
            gas_used.saturating_mul(gas_price),
            value,
        ))
    }
}

fn parse_u256(raw: &str, field: &str) -> Result<U256> {
    U256::from_str_radix(raw.trim(), 10)
        .map_err(|e| BlazerError::Explorer(format!("bad {} {}: {}", field, raw, e)))
}

/// Filter and convert a raw `txlist` page for `wallet`.
///
/// Rows that fail to parse are skipped with a warning rather than failing
/// the whole history.
pub fn select_point_transactions(rows: &[ExplorerTx], wallet: Address) -> Vec<ActivityTx> {
    let wallet = format!("{:#x}", wallet);
    rows.iter()
        .filter(|row| row.counts_for(&wallet))
        .filter_map(|row| match row.to_activity() {
            Ok(tx) => Some(tx),
            Err(e) => {
                warn!("Skipping explorer row {}: {}", row.hash, e);
                None
            }
        })
        .collect()
}

/// Explorer API client
#[derive(Clone)]
pub struct ExplorerClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ExplorerClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("blazer/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| BlazerError::Internal(format!("failed to build explorer HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Full outgoing history for `address`, oldest first
    pub async fn txlist(&self, address: Address) -> Result<Vec<ExplorerTx>> {
        let mut query = vec![
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", format!("{:#x}", address)),
            ("startblock", "0".to_string()),
            ("endblock", "9999999999".to_string()),
            ("page", "1".to_string()),
            ("sort", "asc".to_string()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.clone()));
        }

        let resp = self.http.get(&self.base_url).query(&query).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            debug!("Explorer body: {}", text);
            return Err(BlazerError::Explorer(format!(
                "txlist for {} failed: status={}",
                address, status
            )));
        }

        parse_txlist(&text)
    }
}

/// Decode a `txlist` body; "no transactions" is an empty history, any other
/// non-"1" status is an error
pub fn parse_txlist(body: &str) -> Result<Vec<ExplorerTx>> {
    let envelope: ExplorerResponse = serde_json::from_str(body)?;

    if envelope.status != "1" {
        if envelope.message.starts_with(NO_TRANSACTIONS) {
            return Ok(Vec::new());
        }
        return Err(BlazerError::Explorer(format!(
            "txlist rejected: {} ({})",
            envelope.message, envelope.result
        )));
    }

    Ok(serde_json::from_value(envelope.result)?)
}

#[async_trait]
impl ActivitySource for ExplorerClient {
    async fn fetch_transactions(&self, address: Address) -> Result<Vec<ActivityTx>> {
        let rows = self.txlist(address).await?;
        let selected = select_point_transactions(&rows, address);
        debug!(
            "Explorer returned {} rows for {}, {} count for points",
            rows.len(),
            address,
            selected.len()
        );
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "0x00000000000000000000000000000000000000aa";

    fn row(from: &str, to: &str, function_name: &str, is_error: &str) -> ExplorerTx {
        ExplorerTx {
            hash: format!("0x{}", "11".repeat(32)),
            from: from.to_string(),
            to: to.to_string(),
            value: "20000000000000000".to_string(),
            gas_used: "50000".to_string(),
            gas_price: "100000000".to_string(),
            time_stamp: "1726444800".to_string(),
            is_error: is_error.to_string(),
            function_name: function_name.to_string(),
        }
    }

    #[test]
    fn test_counts_for_filters() {
        let weth = "0xa51894664a773981c6c112c43ce576f315d5b1b6";
        assert!(row(WALLET, weth, "deposit()", "0").counts_for(WALLET));
        // someone else's transaction
        assert!(!row(weth, WALLET, "deposit()", "0").counts_for(WALLET));
        // self-send
        assert!(!row(WALLET, WALLET, "", "0").counts_for(WALLET));
        // token plumbing
        assert!(!row(WALLET, weth, "transfer(address,uint256)", "0").counts_for(WALLET));
        assert!(!row(WALLET, weth, "approve(address,uint256)", "0").counts_for(WALLET));
        // reverted
        assert!(!row(WALLET, weth, "deposit()", "1").counts_for(WALLET));
    }

    #[test]
    fn test_to_activity_derives_burned_fee() {
        let tx = row(WALLET, "0x01", "deposit()", "0").to_activity().unwrap();
        assert_eq!(tx.fee_wei, U256::from(50_000u64 * 100_000_000u64));
        assert_eq!(tx.value_wei, U256::from(20_000_000_000_000_000u64));
        assert_eq!(tx.timestamp, 1_726_444_800);
    }

    #[test]
    fn test_select_skips_unparseable_rows() {
        let wallet: Address = WALLET.parse().unwrap();
        let mut broken = row(WALLET, "0x01", "deposit()", "0");
        broken.gas_used = "lots".to_string();
        let good = row(WALLET, "0x01", "vote()", "0");

        let selected = select_point_transactions(&[broken, good], wallet);
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_parse_txlist_envelopes() {
        let ok = r#"{"status":"1","message":"OK","result":[{"hash":"0x1111111111111111111111111111111111111111111111111111111111111111","from":"0xaa","to":"0xbb","value":"0","gasUsed":"21000","gasPrice":"1","timeStamp":"1","isError":"0","functionName":"vote()"}]}"#;
        assert_eq!(parse_txlist(ok).unwrap().len(), 1);

        let empty = r#"{"status":"0","message":"No transactions found","result":[]}"#;
        assert!(parse_txlist(empty).unwrap().is_empty());

        let denied = r#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#;
        assert!(matches!(parse_txlist(denied), Err(BlazerError::Explorer(_))));
    }
}
