use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;

use super::MarketData;
use crate::models::Bar;

const BINANCE_API_BASE: &str = "https://api.binance.com";
const MAX_RETRIES: u32 = 3;

/// Binance spot market-data client (public endpoints only, no auth)
#[derive(Debug, Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BINANCE_API_BASE)
    }

    /// Point the client at a different host (tests use a mock server)
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Make an API request with bounded retry on 429/5xx
    async fn make_request(&self, url: &str) -> Result<reqwest::Response> {
        for attempt in 1..=MAX_RETRIES {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let backoff_secs = 2u64.pow(attempt);
                        tracing::warn!(
                            "Binance returned {}, backing off {}s (attempt {}/{})",
                            status,
                            backoff_secs,
                            attempt,
                            MAX_RETRIES
                        );
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        continue;
                    }

                    // Other 4xx: caller error, don't retry
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    anyhow::bail!("Binance API error ({}): {}", status, error_text);
                }
                Err(e) if attempt < MAX_RETRIES => {
                    let backoff_secs = 2u64.pow(attempt);
                    tracing::warn!(
                        "Network error: {}, retrying in {}s (attempt {}/{})",
                        e,
                        backoff_secs,
                        attempt,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                }
                Err(e) => anyhow::bail!("Network error after {} retries: {}", MAX_RETRIES, e),
            }
        }

        anyhow::bail!("Failed after {} retries", MAX_RETRIES)
    }

    /// Parse one kline row: [open_time_ms, open, high, low, close, volume, ..]
    fn parse_kline(row: &Value) -> Result<Bar> {
        let fields = row.as_array().context("kline row is not an array")?;
        if fields.len() < 6 {
            anyhow::bail!("kline row has {} fields, expected at least 6", fields.len());
        }

        let open_time_ms = fields[0]
            .as_i64()
            .context("kline open time is not an integer")?;
        let timestamp: DateTime<Utc> = DateTime::from_timestamp_millis(open_time_ms)
            .with_context(|| format!("kline open time {} out of range", open_time_ms))?;

        let price = |index: usize, name: &str| -> Result<f64> {
            fields[index]
                .as_str()
                .with_context(|| format!("kline {} is not a string", name))?
                .parse::<f64>()
                .with_context(|| format!("kline {} is not numeric", name))
        };

        Ok(Bar {
            timestamp,
            open: price(1, "open")?,
            high: price(2, "high")?,
            low: price(3, "low")?,
            close: price(4, "close")?,
            volume: price(5, "volume")?,
        })
    }
}

impl MarketData for BinanceClient {
    /// Fetch the most recent `limit` bars, oldest first
    async fn fetch_bars(&self, pair: &str, interval: &str, limit: usize) -> Result<Vec<Bar>> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url, pair, interval, limit
        );

        tracing::debug!("Fetching {} {} klines for {}", limit, interval, pair);

        let response = self.make_request(&url).await?;
        let rows: Vec<Value> = response.json().await.context("Failed to parse klines")?;

        let bars = rows
            .iter()
            .map(Self::parse_kline)
            .collect::<Result<Vec<Bar>>>()?;

        // The decision engine assumes strictly increasing timestamps
        for window in bars.windows(2) {
            if window[1].timestamp <= window[0].timestamp {
                anyhow::bail!(
                    "klines out of order: {} then {}",
                    window[0].timestamp,
                    window[1].timestamp
                );
            }
        }

        tracing::debug!("Fetched {} bars for {}", bars.len(), pair);
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kline_body() -> String {
        serde_json::json!([
            [1700000000000i64, "100.0", "105.0", "99.0", "104.0", "1200.5", 1700003599999i64,
             "0", 0, "0", "0", "0"],
            [1700003600000i64, "104.0", "108.0", "103.0", "107.5", "980.0", 1700007199999i64,
             "0", 0, "0", "0", "0"]
        ])
        .to_string()
    }

    #[tokio::test]
    async fn test_fetch_bars_parses_klines() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v3/klines")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(kline_body())
            .create_async()
            .await;

        let client = BinanceClient::with_base_url(&server.url()).unwrap();
        let bars = client.fetch_bars("BTCUSDT", "1h", 2).await.unwrap();

        mock.assert_async().await;
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].close, 104.0);
        assert_eq!(bars[1].high, 108.0);
        assert_eq!(bars[1].volume, 980.0);
        assert!(bars[1].timestamp > bars[0].timestamp);
    }

    #[tokio::test]
    async fn test_fetch_bars_rejects_unordered() {
        let body = serde_json::json!([
            [1700003600000i64, "104.0", "108.0", "103.0", "107.5", "980.0"],
            [1700000000000i64, "100.0", "105.0", "99.0", "104.0", "1200.5"]
        ])
        .to_string();

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = BinanceClient::with_base_url(&server.url()).unwrap();
        let result = client.fetch_bars("BTCUSDT", "1h", 2).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("out of order"));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(400)
            .with_body(r#"{"code":-1121,"msg":"Invalid symbol."}"#)
            .expect(1)
            .create_async()
            .await;

        let client = BinanceClient::with_base_url(&server.url()).unwrap();
        let result = client.fetch_bars("NOPE", "1h", 10).await;

        mock.assert_async().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid symbol"));
    }

    #[test]
    fn test_parse_kline_rejects_short_row() {
        let row = serde_json::json!([1700000000000i64, "100.0"]);
        assert!(BinanceClient::parse_kline(&row).is_err());
    }
}
