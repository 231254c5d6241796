use crate::responses::{ApiErrorResponse, RawKline, TickerPriceResponse};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use configuration::PriceFeedConfig;
use core_types::Candle;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::time::Duration;

pub mod error;
pub mod responses;

// --- Public API ---
pub use error::ApiError;

/// The Binance error code returned for a symbol the exchange does not know.
const UNKNOWN_SYMBOL_CODE: i16 = -1121;

/// The generic, abstract interface for a market price source.
/// This trait is the contract the monitoring core uses, allowing the
/// underlying implementation (live or mock) to be swapped out.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetches the current spot price for a pair of assets.
    ///
    /// Implementations must resolve an identity pair (`base == quote`) to
    /// `1.0` locally, without touching the network.
    async fn current_price(&self, base: &str, quote: &str) -> Result<Decimal, ApiError>;

    /// Fetches the most recent `limit` closed candles for a symbol,
    /// ordered oldest-first.
    async fn recent_closes(
        &self,
        symbol: &str,
        interval: &str,
        limit: u16,
    ) -> Result<Vec<Candle>, ApiError>;
}

/// A concrete implementation of `PriceSource` for the Binance futures API.
///
/// Only public market-data endpoints are used, so no request signing is
/// involved.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(config: &PriceFeedConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                // A bounded timeout so a stalled exchange call cannot starve
                // a subscriber's polling loop.
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .expect("Failed to build reqwest client"),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            let api_error: ApiErrorResponse = serde_json::from_str(&text).map_err(|e| {
                ApiError::Deserialization(format!(
                    "Failed to deserialize error response: {}. Original text: {}",
                    e, text
                ))
            })?;
            if api_error.code == UNKNOWN_SYMBOL_CODE {
                Err(ApiError::UnknownSymbol(api_error.msg))
            } else {
                Err(ApiError::BinanceError(api_error.code, api_error.msg))
            }
        }
    }
}

#[async_trait]
impl PriceSource for BinanceClient {
    async fn current_price(&self, base: &str, quote: &str) -> Result<Decimal, ApiError> {
        // Identity conversion: an asset is always worth exactly one of itself.
        if base.eq_ignore_ascii_case(quote) {
            return Ok(Decimal::ONE);
        }

        let symbol = format!("{}{}", base, quote).to_uppercase();
        let ticker: TickerPriceResponse = self
            .get_json("/fapi/v1/ticker/price", &[("symbol", symbol)])
            .await?;

        Decimal::from_str(&ticker.price)
            .map_err(|e| ApiError::Deserialization(format!("Invalid price '{}': {}", ticker.price, e)))
    }

    async fn recent_closes(
        &self,
        symbol: &str,
        interval: &str,
        limit: u16,
    ) -> Result<Vec<Candle>, ApiError> {
        let raw: Vec<RawKline> = self
            .get_json(
                "/fapi/v1/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let candles = raw
            .into_iter()
            .map(|kline| {
                Ok(Candle {
                    close: Decimal::from_str(&kline.4)
                        .map_err(|e| ApiError::Deserialization(e.to_string()))?,
                    close_time: Utc
                        .timestamp_millis_opt(kline.6)
                        .single()
                        .ok_or_else(|| {
                            ApiError::InvalidData(format!("Invalid close_time: {}", kline.6))
                        })?,
                })
            })
            .collect::<Result<Vec<Candle>, ApiError>>()?;

        Ok(candles)
    }
}
