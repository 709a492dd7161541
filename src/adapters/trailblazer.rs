//! Trailblazer leaderboard API client.

use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::traits::RankSource;
use crate::domain::level_for_rank;
use crate::error::{BlazerError, Result};

/// Score, rank and ban flag for one wallet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankStats {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub rank: u64,
    #[serde(default)]
    pub blacklisted: bool,
}

impl RankStats {
    pub fn level(&self) -> u8 {
        level_for_rank(self.rank)
    }
}

#[derive(Clone)]
pub struct TrailblazerClient {
    http: Client,
    rank_url: String,
}

impl TrailblazerClient {
    pub fn new(rank_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("blazer/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                BlazerError::Internal(format!("failed to build rank HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            rank_url: rank_url.to_string(),
        })
    }
}

#[async_trait]
impl RankSource for TrailblazerClient {
    async fn fetch_rank(&self, address: Address) -> Result<RankStats> {
        let resp = self
            .http
            .get(&self.rank_url)
            .query(&[("address", address.to_checksum(None))])
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            debug!("Rank API body: {}", text);
            return Err(BlazerError::RankApi(format!(
                "rank lookup for {} failed: status={}",
                address, status
            )));
        }

        Ok(serde_json::from_str(&text)?)
    }
}
