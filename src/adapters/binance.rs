//! Spot price lookup used to express gas spent in USD.

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{BlazerError, Result};

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: Decimal,
}

#[derive(Clone)]
pub struct PriceClient {
    http: Client,
    price_url: String,
}

impl PriceClient {
    pub fn new(price_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                BlazerError::Internal(format!("failed to build price HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            price_url: price_url.to_string(),
        })
    }

    /// Latest price for a ticker symbol such as `ETHUSDT`
    pub async fn price(&self, symbol: &str) -> Result<Decimal> {
        let resp = self
            .http
            .get(&self.price_url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(BlazerError::PriceApi(format!(
                "{} price request failed: status={} body={}",
                symbol, status, text
            )));
        }

        parse_ticker(&text)
    }

    pub async fn eth_usd(&self) -> Result<Decimal> {
        self.price("ETHUSDT").await
    }
}

fn parse_ticker(body: &str) -> Result<Decimal> {
    let ticker: TickerPrice = serde_json::from_str(body)?;
    Ok(ticker.price)
}
