use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The identifier of one chat/subscriber. Telegram chat ids are signed 64-bit
/// integers, and groups use negative values, so this must not be narrowed.
pub type ChatId = i64;

/// A single closed candle from the market data feed.
///
/// Candle sequences are always ordered oldest-first (newest last), which is
/// the order the exchange returns them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// The closing price of the candle.
    pub close: Decimal,
    /// The time at which the candle closed.
    pub close_time: DateTime<Utc>,
}
