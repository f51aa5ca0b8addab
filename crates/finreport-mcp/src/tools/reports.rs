//! Report generation tools.

use chrono::Utc;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::schemars::JsonSchema;
use rmcp::{tool, tool_router, ErrorData as McpError};
use serde::Deserialize;
use serde_json::json;

use finreport_core::analysis as calc;
use finreport_core::rounding::round_to;
use finreport_core::Period;
use finreport_traits::output::sanitize_report_name;
use finreport_traits::{CompanyProfile, ReportLocation};

use crate::error::{ToolError, ToolResult};
use crate::server::FinReportServer;
use crate::templates::{self, Holding, StockReport};

/// History pulled for every report.
pub(crate) const REPORT_RANGE: &str = "1mo";
pub(crate) const REPORT_INTERVAL: &str = "1d";

fn default_report_type() -> String {
    "basic".to_string()
}

/// generate_stock_report parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StockReportParams {
    /// Ticker symbol
    pub symbol: String,
    /// basic or detailed
    #[serde(default = "default_report_type")]
    pub report_type: String,
}

/// generate_portfolio_report parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PortfolioReportParams {
    /// Ticker symbols in the portfolio
    pub symbols: Vec<String>,
    /// Optional weights, one per symbol. Normalized to sum to 1. Equal weights when omitted.
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
}

/// Normalized portfolio weights.
pub(crate) fn normalize_weights(count: usize, weights: Option<&[f64]>) -> ToolResult<Vec<f64>> {
    let Some(weights) = weights else {
        return Ok(vec![1.0 / count as f64; count]);
    };
    if weights.len() != count {
        return Err(ToolError::invalid(format!(
            "weights has {} entries but symbols has {count}",
            weights.len()
        )));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ToolError::invalid("weights must be finite and non-negative"));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(ToolError::invalid("weights must sum to a positive value"));
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

impl FinReportServer {
    /// Profile, or a bare one naming only the symbol when the source has none.
    pub(crate) async fn profile_or_bare(&self, symbol: &str) -> CompanyProfile {
        match self.market_data.company_profile(symbol).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "company profile unavailable, report omits it");
                CompanyProfile {
                    symbol: symbol.to_string(),
                    name: symbol.to_string(),
                    ..CompanyProfile::default()
                }
            }
        }
    }

    pub(crate) async fn store_report(&self, name: &str, content: &str) -> ToolResult<ReportLocation> {
        let name = sanitize_report_name(name);
        Ok(self.reports.write(&name, content).await?)
    }
}

#[tool_router(router = reports_router, vis = "pub(crate)")]
impl FinReportServer {
    /// Single-stock report
    #[tool(
        description = "Generate a plain-text stock report from one month of daily prices and save it. report_type 'detailed' adds return, volatility and fundamentals sections."
    )]
    pub async fn generate_stock_report(
        &self,
        Parameters(params): Parameters<StockReportParams>,
    ) -> Result<CallToolResult, McpError> {
        let symbol = Self::normalize_symbol(&params.symbol)?;
        let report_type = params.report_type.trim().to_ascii_lowercase();
        let detailed = match report_type.as_str() {
            "basic" => false,
            "detailed" => true,
            other => {
                return Err(ToolError::invalid(format!(
                    "unknown report_type '{other}', expected basic or detailed"
                ))
                .into())
            }
        };

        let history = self
            .market_data
            .price_history(&symbol, REPORT_RANGE, REPORT_INTERVAL)
            .await
            .map_err(ToolError::from)?;
        let closes = history.closes();
        let returns = calc::compute_returns(&closes).map_err(ToolError::from)?;
        let volatility = if detailed {
            let series = calc::simple_returns(&closes).map_err(ToolError::from)?;
            Some(calc::compute_volatility(&series, Period::Daily).map_err(ToolError::from)?)
        } else {
            None
        };
        let profile = self.profile_or_bare(&symbol).await;

        let now = Utc::now();
        let text = templates::render_stock_report(&StockReport {
            profile: &profile,
            history: &history,
            returns: &returns,
            volatility: volatility.as_ref(),
            report_type: &report_type,
            source: self.market_data.name(),
            generated_at: now,
        });
        let name = format!("stock_report_{symbol}_{}.txt", templates::report_timestamp(now));
        let location = self.store_report(&name, &text).await?;
        tracing::info!(%symbol, report = %location.name, "stock report generated");

        let response = json!({
            "symbol": symbol,
            "report_type": report_type,
            "total_return_pct": returns.total_return_pct,
            "volatility": volatility,
            "report_name": location.name,
            "resource_uri": templates::generated_uri(&location.name),
            "location": location.uri,
            "report": text,
        });

        Self::json_result(&response)
    }

    /// Portfolio report
    #[tool(
        description = "Generate a plain-text portfolio report from one month of daily prices and save it. Weights are optional and normalized; equal weights by default."
    )]
    pub async fn generate_portfolio_report(
        &self,
        Parameters(params): Parameters<PortfolioReportParams>,
    ) -> Result<CallToolResult, McpError> {
        let symbols = Self::normalize_symbols(&params.symbols)?;
        let weights = normalize_weights(symbols.len(), params.weights.as_deref())?;

        let mut holdings = Vec::with_capacity(symbols.len());
        for (symbol, weight) in symbols.iter().zip(&weights) {
            let history = self
                .market_data
                .price_history(symbol, REPORT_RANGE, REPORT_INTERVAL)
                .await
                .map_err(ToolError::from)?;
            let returns = calc::compute_returns(&history.closes()).map_err(ToolError::from)?;
            holdings.push(Holding {
                symbol: symbol.clone(),
                weight_pct: round_to(weight * 100.0, 2),
                total_return_pct: returns.total_return_pct,
                latest_price: history.latest_close(),
            });
        }
        let portfolio_return_pct = round_to(
            holdings
                .iter()
                .zip(&weights)
                .map(|(h, w)| h.total_return_pct * w)
                .sum(),
            2,
        );

        let now = Utc::now();
        let text = templates::render_portfolio_report(&holdings, portfolio_return_pct, now);
        let name = format!("portfolio_report_{}.txt", templates::report_timestamp(now));
        let location = self.store_report(&name, &text).await?;
        tracing::info!(holdings = holdings.len(), report = %location.name, "portfolio report generated");

        let response = json!({
            "symbols": symbols,
            "holdings": holdings,
            "portfolio_return_pct": portfolio_return_pct,
            "report_name": location.name,
            "resource_uri": templates::generated_uri(&location.name),
            "location": location.uri,
            "report": text,
        });

        Self::json_result(&response)
    }
}
