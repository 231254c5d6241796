use serde::Deserialize;

/// The response from `GET /fapi/v1/ticker/price`.
///
/// Binance serializes prices as JSON strings; parsing into `Decimal` happens
/// at the call site so a malformed price is reported as a payload error.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerPriceResponse {
    pub symbol: String,
    pub price: String,
}

/// A single kline from `GET /fapi/v1/klines`, as the positional array the
/// exchange sends: open time, OHLCV as strings, close time, and a tail of
/// fields we never read.
#[derive(Debug, Deserialize)]
pub struct RawKline(
    pub i64,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub i64,
    pub String,
    pub i64,
    pub String,
    pub String,
    pub String,
);

/// Represents an error response from the Binance API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i16,
    pub msg: String,
}
