//! Statistical analysis tools.

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::schemars::JsonSchema;
use rmcp::{tool, tool_router, ErrorData as McpError};
use serde::Deserialize;

use finreport_core::analysis::{self as calc, DEFAULT_RISK_FREE_RATE};
use finreport_core::Period;

use crate::error::ToolError;
use crate::server::FinReportServer;

fn default_period() -> String {
    "daily".to_string()
}

fn default_risk_free_rate() -> f64 {
    DEFAULT_RISK_FREE_RATE
}

/// compute_returns parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ComputeReturnsParams {
    /// Prices in chronological order (at least 2, none zero)
    pub prices: Vec<f64>,
    /// Reporting period tag: daily, weekly or monthly
    #[serde(default = "default_period")]
    pub period: String,
}

/// compute_volatility parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ComputeVolatilityParams {
    /// Fractional period returns (at least 2)
    pub returns: Vec<f64>,
    /// Reporting period tag: daily, weekly or monthly. Unknown tags use daily.
    #[serde(default = "default_period")]
    pub period: String,
}

/// compute_sharpe_ratio parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ComputeSharpeParams {
    /// Fractional daily returns (at least 2)
    pub returns: Vec<f64>,
    /// Annual risk-free rate as a fraction (0.02 = 2%)
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
}

#[tool_router(router = analysis_router, vis = "pub(crate)")]
impl FinReportServer {
    /// Simple returns of a price series
    #[tool(
        description = "Compute period-over-period simple returns of a price series. Returns total, average, max and min return as percentages."
    )]
    pub async fn compute_returns(
        &self,
        Parameters(params): Parameters<ComputeReturnsParams>,
    ) -> Result<CallToolResult, McpError> {
        let period = Period::from_tag(&params.period);
        let summary = calc::compute_returns(&params.prices).map_err(ToolError::from)?;
        tracing::debug!(prices = params.prices.len(), "compute_returns");

        let response = serde_json::json!({
            "period": period.as_str(),
            "total_return_pct": summary.total_return_pct,
            "avg_return_pct": summary.avg_return_pct,
            "max_return_pct": summary.max_return_pct,
            "min_return_pct": summary.min_return_pct,
            "return_count": summary.return_count,
        });

        Self::json_result(&response)
    }

    /// Volatility of a return series
    #[tool(
        description = "Compute the volatility (population standard deviation) of a return series and annualize it for the given period (daily, weekly, monthly). Results are percentages."
    )]
    pub async fn compute_volatility(
        &self,
        Parameters(params): Parameters<ComputeVolatilityParams>,
    ) -> Result<CallToolResult, McpError> {
        let period = Period::from_tag(&params.period);
        let summary = calc::compute_volatility(&params.returns, period).map_err(ToolError::from)?;
        tracing::debug!(returns = params.returns.len(), %period, "compute_volatility");

        let response = serde_json::json!({
            "period": period.as_str(),
            "volatility_pct": summary.volatility_pct,
            "annualized_volatility_pct": summary.annualized_volatility_pct,
            "data_points": summary.data_points,
        });

        Self::json_result(&response)
    }

    /// Sharpe ratio of a return series
    #[tool(
        description = "Compute the Sharpe ratio of a daily return series against an annual risk-free rate (default 0.02). The annualized ratio always uses sqrt(252)."
    )]
    pub async fn compute_sharpe_ratio(
        &self,
        Parameters(params): Parameters<ComputeSharpeParams>,
    ) -> Result<CallToolResult, McpError> {
        let summary = calc::compute_sharpe_ratio(&params.returns, params.risk_free_rate)
            .map_err(ToolError::from)?;
        tracing::debug!(returns = params.returns.len(), "compute_sharpe_ratio");

        Self::json_result(&summary)
    }
}
