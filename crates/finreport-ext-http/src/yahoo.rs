//! Yahoo-Finance-compatible market data client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;

use finreport_traits::error::TraitError;
use finreport_traits::market_data::{
    validate_history_request, CompanyProfile, MarketDataSource, PriceBar, PriceHistory, StockQuote,
};

use crate::http::{build_client, check_status, map_reqwest_error, trim_base_url};

/// Default API root.
pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; finreport)";

/// Modules requested for a company profile.
const PROFILE_MODULES: &str = "price,summaryDetail,assetProfile,defaultKeyStatistics";

/// Market data client over the `v8/finance/chart` and
/// `v10/finance/quoteSummary` endpoints.
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    /// Create a client against `base_url`.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        user_agent: Option<&str>,
    ) -> Result<Self, TraitError> {
        Ok(Self {
            client: build_client(timeout, Some(user_agent.unwrap_or(DEFAULT_USER_AGENT)))?,
            base_url: trim_base_url(base_url),
        })
    }

    /// Create a client against the public API with a 30 second timeout.
    pub fn with_defaults() -> Result<Self, TraitError> {
        Self::new(DEFAULT_YAHOO_URL, Duration::from_secs(30), None)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T, TraitError> {
        tracing::debug!(url, ?query, "market data request");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response, what).await?;
        response.json::<T>().await.map_err(map_reqwest_error)
    }

    async fn summary(&self, symbol: &str, modules: &str) -> Result<SummaryResult, TraitError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        let body: SummaryResponse = self
            .get_json(&url, &[("modules", modules)], &format!("symbol '{symbol}'"))
            .await?;
        parse_summary(symbol, body)
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn price_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<PriceHistory, TraitError> {
        validate_history_request(range, interval)?;
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let body: ChartResponse = self
            .get_json(
                &url,
                &[("range", range), ("interval", interval)],
                &format!("symbol '{symbol}'"),
            )
            .await?;
        parse_chart(symbol, range, interval, body)
    }

    async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile, TraitError> {
        let summary = self.summary(symbol, PROFILE_MODULES).await?;
        Ok(summary.into_profile(symbol))
    }

    async fn quote(&self, symbol: &str) -> Result<StockQuote, TraitError> {
        let summary = self.summary(symbol, "price").await?;
        let price = summary.price.unwrap_or_default();
        Ok(StockQuote {
            symbol: symbol.to_string(),
            price: price.regular_market_price.and_then(|v| v.raw),
            volume: price.regular_market_volume.and_then(|v| v.as_u64()),
            market_cap: price.market_cap.and_then(|v| v.raw),
        })
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<String>,
    description: Option<String>,
}

impl ApiError {
    fn into_trait_error(self, symbol: &str) -> TraitError {
        let description = self.description.unwrap_or_default();
        match self.code.as_deref() {
            Some("Not Found") => TraitError::NotFound(format!("symbol '{symbol}'")),
            code => TraitError::SourceNotAvailable(format!(
                "{}: {}",
                code.unwrap_or("error"),
                description
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteIndicator>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteIndicator {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// `{ "raw": 1.23, "fmt": "1.23" }` wrapper used by quoteSummary.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

impl RawValue {
    fn as_u64(self) -> Option<u64> {
        self.raw.filter(|v| *v >= 0.0).map(|v| v as u64)
    }
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<SummaryResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetailModule>,
    asset_profile: Option<AssetProfileModule>,
    default_key_statistics: Option<KeyStatisticsModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<RawValue>,
    regular_market_volume: Option<RawValue>,
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    dividend_yield: Option<RawValue>,
    fifty_two_week_high: Option<RawValue>,
    fifty_two_week_low: Option<RawValue>,
    volume: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetProfileModule {
    sector: Option<String>,
    industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatisticsModule {
    price_to_book: Option<RawValue>,
}

impl SummaryResult {
    fn into_profile(self, symbol: &str) -> CompanyProfile {
        let price = self.price.unwrap_or_default();
        let detail = self.summary_detail.unwrap_or_default();
        let profile = self.asset_profile.unwrap_or_default();
        let stats = self.default_key_statistics.unwrap_or_default();
        let raw = |v: Option<RawValue>| v.and_then(|v| v.raw);

        CompanyProfile {
            symbol: symbol.to_string(),
            name: price
                .long_name
                .or(price.short_name)
                .unwrap_or_else(|| symbol.to_string()),
            sector: profile.sector,
            industry: profile.industry,
            market_cap: raw(price.market_cap),
            trailing_pe: raw(detail.trailing_pe),
            price_to_book: raw(stats.price_to_book),
            dividend_yield: raw(detail.dividend_yield),
            fifty_two_week_high: raw(detail.fifty_two_week_high),
            fifty_two_week_low: raw(detail.fifty_two_week_low),
            current_price: raw(price.regular_market_price),
            volume: price
                .regular_market_volume
                .or(detail.volume)
                .and_then(RawValue::as_u64),
        }
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_chart(
    symbol: &str,
    range: &str,
    interval: &str,
    body: ChartResponse,
) -> Result<PriceHistory, TraitError> {
    if let Some(error) = body.chart.error {
        return Err(error.into_trait_error(symbol));
    }
    let result = body
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| TraitError::NotFound(format!("symbol '{symbol}'")))?;
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    // Bars with a missing close (halted sessions, partial candles) are dropped.
    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let close = quote.close.get(i).copied().flatten()?;
            let timestamp = Utc.timestamp_opt(*ts, 0).single()?;
            let field = |v: &Vec<Option<f64>>| v.get(i).copied().flatten().unwrap_or(close);
            Some(PriceBar {
                timestamp,
                open: field(&quote.open),
                high: field(&quote.high),
                low: field(&quote.low),
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            })
        })
        .collect();

    Ok(PriceHistory {
        symbol: symbol.to_string(),
        range: range.to_string(),
        interval: interval.to_string(),
        bars,
    })
}

fn parse_summary(symbol: &str, body: SummaryResponse) -> Result<SummaryResult, TraitError> {
    if let Some(error) = body.quote_summary.error {
        return Err(error.into_trait_error(symbol));
    }
    body.quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| TraitError::NotFound(format!("symbol '{symbol}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart_body() -> ChartResponse {
        serde_json::from_value(json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "AAPL", "regularMarketPrice": 190.0 },
                    "timestamp": [1735828200, 1735914600, 1736173800],
                    "indicators": { "quote": [{
                        "open":   [185.0, 187.0, 188.0],
                        "high":   [186.5, 189.0, null],
                        "low":    [184.0, 186.0, 187.5],
                        "close":  [186.0, null,  190.0],
                        "volume": [1000,  2000,  null]
                    }]}
                }],
                "error": null
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_chart_skips_missing_closes() {
        let history = parse_chart("AAPL", "5d", "1d", chart_body()).unwrap();
        assert_eq!(history.bars.len(), 2);
        assert_eq!(history.closes(), vec![186.0, 190.0]);
        // null high falls back to the close, null volume to zero
        assert_eq!(history.bars[1].high, 190.0);
        assert_eq!(history.bars[1].volume, 0);
        assert_eq!(history.range, "5d");
    }

    #[test]
    fn test_parse_chart_error() {
        let body: ChartResponse = serde_json::from_value(json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }))
        .unwrap();
        assert!(matches!(
            parse_chart("XXXX", "1mo", "1d", body),
            Err(TraitError::NotFound(_))
        ));
    }

    #[test]
    fn test_parse_summary_profile() {
        let body: SummaryResponse = serde_json::from_value(json!({
            "quoteSummary": {
                "result": [{
                    "price": {
                        "longName": "Apple Inc.",
                        "regularMarketPrice": { "raw": 190.5, "fmt": "190.50" },
                        "regularMarketVolume": { "raw": 51234567, "fmt": "51.23M" },
                        "marketCap": { "raw": 2.9e12, "fmt": "2.9T" }
                    },
                    "summaryDetail": {
                        "trailingPE": { "raw": 29.4 },
                        "dividendYield": { "raw": 0.0051 },
                        "fiftyTwoWeekHigh": { "raw": 199.6 },
                        "fiftyTwoWeekLow": {}
                    },
                    "assetProfile": { "sector": "Technology", "industry": "Consumer Electronics" },
                    "defaultKeyStatistics": { "priceToBook": { "raw": 45.1 } }
                }],
                "error": null
            }
        }))
        .unwrap();

        let profile = parse_summary("AAPL", body).unwrap().into_profile("AAPL");
        assert_eq!(profile.name, "Apple Inc.");
        assert_eq!(profile.sector.as_deref(), Some("Technology"));
        assert_eq!(profile.trailing_pe, Some(29.4));
        assert_eq!(profile.price_to_book, Some(45.1));
        assert_eq!(profile.fifty_two_week_low, None);
        assert_eq!(profile.volume, Some(51_234_567));
        assert_eq!(profile.current_price, Some(190.5));
    }

    #[test]
    fn test_parse_summary_missing_modules_uses_symbol_name() {
        let body: SummaryResponse =
            serde_json::from_value(json!({ "quoteSummary": { "result": [{}], "error": null } }))
                .unwrap();
        let profile = parse_summary("IBM", body).unwrap().into_profile("IBM");
        assert_eq!(profile.name, "IBM");
        assert_eq!(profile.market_cap, None);
    }

    #[test]
    fn test_client_construction() {
        let client =
            YahooFinanceClient::new("http://localhost:9999/", Duration::from_secs(5), None).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999");
        assert_eq!(client.name(), "yahoo");
    }
}
