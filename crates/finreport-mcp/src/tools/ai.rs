//! AI-assisted analysis tools.

use chrono::Utc;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::schemars::JsonSchema;
use rmcp::{tool, tool_router, ErrorData as McpError};
use serde::Deserialize;
use serde_json::json;

use finreport_core::analysis::{self as calc, ReturnsSummary};
use finreport_traits::{CompanyProfile, CompletionRequest};

use crate::ai::RoutedCompletion;
use crate::error::ToolResult;
use crate::prompts::{self, AnalysisFocus, CompanyContext, InvestmentHorizon, ReportStyle};
use crate::server::FinReportServer;
use crate::templates;
use crate::tools::reports::{REPORT_INTERVAL, REPORT_RANGE};

fn default_analysis_type() -> String {
    "comprehensive".to_string()
}

fn default_report_style() -> String {
    "professional".to_string()
}

fn default_horizon() -> String {
    "medium_term".to_string()
}

/// ai_analyze_company parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnalyzeCompanyParams {
    /// Ticker symbol, e.g. NVDA
    pub symbol: String,
    /// financial, investment, risk or comprehensive
    #[serde(default = "default_analysis_type")]
    pub analysis_type: String,
}

/// ai_generate_report parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AiReportParams {
    /// Ticker symbol
    pub symbol: String,
    /// professional, simple or detailed
    #[serde(default = "default_report_style")]
    pub report_style: String,
}

/// ai_investment_advice parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct InvestmentAdviceParams {
    /// Ticker symbol
    pub symbol: String,
    /// short_term, medium_term or long_term
    #[serde(default = "default_horizon")]
    pub investment_horizon: String,
}

impl FinReportServer {
    /// Profile plus one-month returns, when history is available.
    async fn company_facts(&self, symbol: &str) -> ToolResult<(CompanyProfile, Option<ReturnsSummary>)> {
        let profile = self.market_data.company_profile(symbol).await?;
        let recent = match self
            .market_data
            .price_history(symbol, REPORT_RANGE, REPORT_INTERVAL)
            .await
        {
            Ok(history) => calc::compute_returns(&history.closes()).ok(),
            Err(e) => {
                tracing::debug!(%symbol, error = %e, "no recent history for prompt");
                None
            }
        };
        Ok((profile, recent))
    }

    async fn ask(&self, request: &CompletionRequest) -> ToolResult<RoutedCompletion> {
        let routed = self.models.complete(request).await?;
        tracing::info!(
            backend = %routed.backend,
            model = %routed.model,
            degraded = routed.degraded,
            "model answered"
        );
        Ok(routed)
    }
}

#[tool_router(router = ai_router, vis = "pub(crate)")]
impl FinReportServer {
    /// AI company analysis
    #[tool(
        description = "Ask a language model to analyze a company from its market profile. analysis_type: financial, investment, risk or comprehensive. The response says which backend answered and whether it was a fallback (degraded)."
    )]
    pub async fn ai_analyze_company(
        &self,
        Parameters(params): Parameters<AnalyzeCompanyParams>,
    ) -> Result<CallToolResult, McpError> {
        let symbol = Self::normalize_symbol(&params.symbol)?;
        let focus: AnalysisFocus = params.analysis_type.parse()?;
        let (profile, recent) = self.company_facts(&symbol).await?;
        let ctx = CompanyContext {
            profile: &profile,
            recent: recent.as_ref(),
        };
        let routed = self.ask(&prompts::analysis_prompt(&ctx, focus)).await?;

        let response = json!({
            "symbol": symbol,
            "company": profile.name,
            "analysis_type": focus.as_str(),
            "analysis": routed.text,
            "backend": routed.backend,
            "model": routed.model,
            "degraded": routed.degraded,
        });

        Self::json_result(&response)
    }

    /// AI markdown report
    #[tool(
        description = "Ask a language model for a markdown company report and save it. report_style: professional, simple or detailed."
    )]
    pub async fn ai_generate_report(
        &self,
        Parameters(params): Parameters<AiReportParams>,
    ) -> Result<CallToolResult, McpError> {
        let symbol = Self::normalize_symbol(&params.symbol)?;
        let style: ReportStyle = params.report_style.parse()?;
        let (profile, recent) = self.company_facts(&symbol).await?;
        let ctx = CompanyContext {
            profile: &profile,
            recent: recent.as_ref(),
        };
        let routed = self.ask(&prompts::report_prompt(&ctx, style)).await?;

        let now = Utc::now();
        let markdown = templates::ensure_markdown(&routed.text, &profile.name, &symbol, now);
        let name = format!("ai_report_{symbol}_{}.md", templates::report_timestamp(now));
        let location = self.store_report(&name, &markdown).await?;
        tracing::info!(%symbol, report = %location.name, "ai report generated");

        let response = json!({
            "symbol": symbol,
            "company": profile.name,
            "report_style": style.as_str(),
            "report": markdown,
            "report_name": location.name,
            "resource_uri": templates::generated_uri(&location.name),
            "location": location.uri,
            "backend": routed.backend,
            "model": routed.model,
            "degraded": routed.degraded,
        });

        Self::json_result(&response)
    }

    /// AI investment advice
    #[tool(
        description = "Ask a language model for investment guidance on a company. investment_horizon: short_term, medium_term or long_term. Not financial advice."
    )]
    pub async fn ai_investment_advice(
        &self,
        Parameters(params): Parameters<InvestmentAdviceParams>,
    ) -> Result<CallToolResult, McpError> {
        let symbol = Self::normalize_symbol(&params.symbol)?;
        let horizon: InvestmentHorizon = params.investment_horizon.parse()?;
        let (profile, recent) = self.company_facts(&symbol).await?;
        let ctx = CompanyContext {
            profile: &profile,
            recent: recent.as_ref(),
        };
        let routed = self.ask(&prompts::advice_prompt(&ctx, horizon)).await?;

        let response = json!({
            "symbol": symbol,
            "company": profile.name,
            "investment_horizon": horizon.as_str(),
            "advice": routed.text,
            "backend": routed.backend,
            "model": routed.model,
            "degraded": routed.degraded,
        });

        Self::json_result(&response)
    }

    /// Backend health
    #[tool(description = "Report the health and available models of each configured language model backend.")]
    pub async fn ai_status(&self) -> Result<CallToolResult, McpError> {
        let backends = self.models.status().await;
        let healthy = backends.iter().filter(|b| b.healthy).count();

        let response = json!({
            "backends": backends,
            "healthy": healthy,
            "offline_fallback": self.models.allows_offline(),
        });

        Self::json_result(&response)
    }
}
