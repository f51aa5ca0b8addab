//! Market data tools.

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::schemars::JsonSchema;
use rmcp::{tool, tool_router, ErrorData as McpError};
use serde::Deserialize;
use serde_json::{json, Value};

use finreport_core::rounding::round_to;
use finreport_traits::StockQuote;

use crate::error::{ToolError, ToolResult};
use crate::server::FinReportServer;

fn default_history_period() -> String {
    "1mo".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_info_type() -> String {
    "info".to_string()
}

fn default_data_type() -> String {
    "price".to_string()
}

/// get_stock_price parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StockPriceParams {
    /// Ticker symbol, e.g. AAPL
    pub symbol: String,
    /// History range: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max
    #[serde(default = "default_history_period")]
    pub period: String,
    /// Bar interval: 1m, 2m, 5m, 15m, 30m, 60m, 90m, 1h, 1d, 5d, 1wk, 1mo, 3mo
    #[serde(default = "default_interval")]
    pub interval: String,
}

/// get_financial_info parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FinancialInfoParams {
    /// Ticker symbol
    pub symbol: String,
    /// Information type. Only "info" is supported.
    #[serde(default = "default_info_type")]
    pub info_type: String,
}

/// get_market_data parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MarketDataParams {
    /// Ticker symbols
    pub symbols: Vec<String>,
    /// Field to fetch: price, volume or market_cap
    #[serde(default = "default_data_type")]
    pub data_type: String,
}

/// Snapshot field selected by get_market_data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SnapshotField {
    Price,
    Volume,
    MarketCap,
}

impl SnapshotField {
    fn parse(tag: &str) -> ToolResult<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "price" => Ok(Self::Price),
            "volume" => Ok(Self::Volume),
            "market_cap" => Ok(Self::MarketCap),
            other => Err(ToolError::invalid(format!(
                "unknown data_type '{other}', expected one of: price, volume, market_cap"
            ))),
        }
    }

    fn entry(self, quote: &StockQuote) -> Value {
        match self {
            Self::Price => json!({ "symbol": quote.symbol, "current_price": quote.price }),
            Self::Volume => json!({ "symbol": quote.symbol, "volume": quote.volume }),
            Self::MarketCap => json!({ "symbol": quote.symbol, "market_cap": quote.market_cap }),
        }
    }
}

#[tool_router(router = market_router, vis = "pub(crate)")]
impl FinReportServer {
    /// Price history summary
    #[tool(
        description = "Get a price history summary for a stock: latest price, change over the period, high, low and total volume."
    )]
    pub async fn get_stock_price(
        &self,
        Parameters(params): Parameters<StockPriceParams>,
    ) -> Result<CallToolResult, McpError> {
        let symbol = Self::normalize_symbol(&params.symbol)?;
        let history = self
            .market_data
            .price_history(&symbol, &params.period, &params.interval)
            .await
            .map_err(ToolError::from)?;

        let (Some(first), Some(latest)) = (history.first_close(), history.latest_close()) else {
            return Err(ToolError::NotFound(format!("no price data for symbol '{symbol}'")).into());
        };
        let change_pct = (first != 0.0).then(|| round_to((latest / first - 1.0) * 100.0, 2));

        let response = json!({
            "symbol": symbol,
            "period": history.range,
            "interval": history.interval,
            "data_points": history.bars.len(),
            "latest_price": latest,
            "price_change": round_to(latest - first, 4),
            "price_change_pct": change_pct,
            "high": history.high(),
            "low": history.low(),
            "volume": history.total_volume(),
            "source": self.market_data.name(),
        });

        Self::json_result(&response)
    }

    /// Company profile
    #[tool(
        description = "Get key company information: name, sector, industry, market cap, P/E, P/B, dividend yield and 52-week range."
    )]
    pub async fn get_financial_info(
        &self,
        Parameters(params): Parameters<FinancialInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        let symbol = Self::normalize_symbol(&params.symbol)?;
        if params.info_type.trim() != "info" {
            return Err(ToolError::Unsupported(format!(
                "info_type '{}' is not supported, use 'info'",
                params.info_type
            ))
            .into());
        }

        let profile = self
            .market_data
            .company_profile(&symbol)
            .await
            .map_err(ToolError::from)?;

        let response = json!({
            "symbol": symbol,
            "name": profile.name,
            "sector": profile.sector,
            "industry": profile.industry,
            "market_cap": profile.market_cap,
            "trailing_pe": profile.trailing_pe,
            "price_to_book": profile.price_to_book,
            "dividend_yield": profile.dividend_yield,
            "fifty_two_week_high": profile.fifty_two_week_high,
            "fifty_two_week_low": profile.fifty_two_week_low,
            "source": self.market_data.name(),
        });

        Self::json_result(&response)
    }

    /// Multi-symbol snapshot
    #[tool(
        description = "Get one market field (price, volume or market_cap) for several symbols. Symbols that fail are reported inline with an error message."
    )]
    pub async fn get_market_data(
        &self,
        Parameters(params): Parameters<MarketDataParams>,
    ) -> Result<CallToolResult, McpError> {
        if params.symbols.is_empty() {
            return Err(ToolError::invalid("symbols must not be empty").into());
        }
        let field = SnapshotField::parse(&params.data_type)?;

        let mut results = Vec::with_capacity(params.symbols.len());
        let mut failed = 0usize;
        for raw in &params.symbols {
            let entry = match Self::normalize_symbol(raw) {
                Ok(symbol) => match self.market_data.quote(&symbol).await {
                    Ok(quote) => field.entry(&quote),
                    Err(e) => {
                        tracing::warn!(%symbol, error = %e, "quote failed");
                        failed += 1;
                        json!({ "symbol": symbol, "error": e.to_string() })
                    }
                },
                Err(e) => {
                    failed += 1;
                    json!({ "symbol": raw, "error": e.to_string() })
                }
            };
            results.push(entry);
        }
        tracing::debug!(symbols = results.len(), failed, "get_market_data");

        let response = json!({
            "data_type": params.data_type.trim().to_ascii_lowercase(),
            "count": results.len(),
            "failed": failed,
            "results": results,
        });

        Self::json_result(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_field_parse() {
        assert_eq!(SnapshotField::parse("Market_Cap").unwrap(), SnapshotField::MarketCap);
        assert!(SnapshotField::parse("eps").is_err());
    }

    #[test]
    fn test_snapshot_entry_shape() {
        let quote = StockQuote {
            symbol: "AAPL".into(),
            price: Some(190.5),
            volume: None,
            market_cap: Some(2.9e12),
        };
        assert_eq!(
            SnapshotField::Price.entry(&quote),
            json!({ "symbol": "AAPL", "current_price": 190.5 })
        );
        assert_eq!(
            SnapshotField::Volume.entry(&quote),
            json!({ "symbol": "AAPL", "volume": null })
        );
    }
}
