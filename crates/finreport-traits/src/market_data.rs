//! Market data source traits.
//!
//! [`MarketDataSource`] is the seam between the tool handlers and whatever
//! serves prices: a REST API, a JSON snapshot on disk, or an in-memory
//! fixture in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TraitError;

/// History ranges accepted by [`MarketDataSource::price_history`].
pub const HISTORY_RANGES: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];

/// Bar intervals accepted by [`MarketDataSource::price_history`].
pub const HISTORY_INTERVALS: &[&str] = &[
    "1m", "2m", "5m", "15m", "30m", "60m", "90m", "1h", "1d", "5d", "1wk", "1mo", "3mo",
];

/// Checks a range/interval pair against the supported vocabularies.
pub fn validate_history_request(range: &str, interval: &str) -> Result<(), TraitError> {
    if !HISTORY_RANGES.contains(&range) {
        return Err(TraitError::InvalidInput(format!(
            "unsupported period '{range}', expected one of {}",
            HISTORY_RANGES.join(", ")
        )));
    }
    if !HISTORY_INTERVALS.contains(&interval) {
        return Err(TraitError::InvalidInput(format!(
            "unsupported interval '{interval}', expected one of {}",
            HISTORY_INTERVALS.join(", ")
        )));
    }
    Ok(())
}

/// One OHLCV observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Bar open time
    pub timestamp: DateTime<Utc>,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Traded volume
    pub volume: u64,
}

/// Ordered price bars for one symbol, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    /// Ticker symbol
    pub symbol: String,
    /// Requested range (e.g. "1mo")
    pub range: String,
    /// Bar interval (e.g. "1d")
    pub interval: String,
    /// Bars in chronological order
    pub bars: Vec<PriceBar>,
}

impl PriceHistory {
    /// True when the source returned no bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices in chronological order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// First close, if any.
    pub fn first_close(&self) -> Option<f64> {
        self.bars.first().map(|b| b.close)
    }

    /// Latest close, if any.
    pub fn latest_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Highest high across all bars.
    pub fn high(&self) -> Option<f64> {
        self.bars.iter().map(|b| b.high).reduce(f64::max)
    }

    /// Lowest low across all bars.
    pub fn low(&self) -> Option<f64> {
        self.bars.iter().map(|b| b.low).reduce(f64::min)
    }

    /// Sum of volumes.
    pub fn total_volume(&self) -> u64 {
        self.bars.iter().map(|b| b.volume).sum()
    }
}

/// Snapshot quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    /// Ticker symbol
    pub symbol: String,
    /// Last price
    pub price: Option<f64>,
    /// Session volume
    pub volume: Option<u64>,
    /// Market capitalization
    pub market_cap: Option<f64>,
}

/// Company descriptive data and headline ratios.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Ticker symbol
    pub symbol: String,
    /// Long company name
    pub name: String,
    /// Sector
    pub sector: Option<String>,
    /// Industry
    pub industry: Option<String>,
    /// Market capitalization
    pub market_cap: Option<f64>,
    /// Trailing price/earnings
    pub trailing_pe: Option<f64>,
    /// Price/book
    pub price_to_book: Option<f64>,
    /// Dividend yield as a fraction
    pub dividend_yield: Option<f64>,
    /// 52-week high
    pub fifty_two_week_high: Option<f64>,
    /// 52-week low
    pub fifty_two_week_low: Option<f64>,
    /// Current price
    pub current_price: Option<f64>,
    /// Session volume
    pub volume: Option<u64>,
}

/// Trait for market data providers.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Short provider name for logs and responses.
    fn name(&self) -> &str;

    /// Price bars for `symbol` over `range`, sampled every `interval`.
    async fn price_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<PriceHistory, TraitError>;

    /// Company profile and headline ratios.
    async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile, TraitError>;

    /// Current snapshot quote.
    async fn quote(&self, symbol: &str) -> Result<StockQuote, TraitError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(day: u32, close: f64, high: f64, low: f64, volume: u64) -> PriceBar {
        PriceBar {
            timestamp: Utc.with_ymd_and_hms(2025, 1, day, 14, 30, 0).unwrap(),
            open: close,
            high,
            low,
            close,
            volume,
        }
    }

    #[test]
    fn test_history_summaries() {
        let history = PriceHistory {
            symbol: "AAPL".into(),
            range: "5d".into(),
            interval: "1d".into(),
            bars: vec![
                bar(2, 100.0, 101.0, 99.0, 10),
                bar(3, 103.0, 105.0, 100.5, 20),
                bar(6, 102.0, 104.0, 98.5, 30),
            ],
        };
        assert_eq!(history.closes(), vec![100.0, 103.0, 102.0]);
        assert_eq!(history.first_close(), Some(100.0));
        assert_eq!(history.latest_close(), Some(102.0));
        assert_eq!(history.high(), Some(105.0));
        assert_eq!(history.low(), Some(98.5));
        assert_eq!(history.total_volume(), 60);
    }

    #[test]
    fn test_empty_history() {
        let history = PriceHistory {
            symbol: "NONE".into(),
            range: "1mo".into(),
            interval: "1d".into(),
            bars: vec![],
        };
        assert!(history.is_empty());
        assert_eq!(history.high(), None);
        assert_eq!(history.total_volume(), 0);
    }

    #[test]
    fn test_validate_history_request() {
        assert!(validate_history_request("1mo", "1d").is_ok());
        assert!(validate_history_request("ytd", "1wk").is_ok());
        assert!(matches!(
            validate_history_request("7w", "1d"),
            Err(TraitError::InvalidInput(_))
        ));
        assert!(validate_history_request("1mo", "4h").is_err());
    }
}
