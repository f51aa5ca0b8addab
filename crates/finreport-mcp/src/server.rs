//! MCP server implementation for FinReport.

use std::sync::Arc;
use std::time::Duration;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::model::{
    AnnotateAble, CallToolResult, Content, Implementation, ListResourcesResult,
    PaginatedRequestParam, ProtocolVersion, RawResource, ReadResourceRequestParam,
    ReadResourceResult, Resource, ResourceContents, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{tool_handler, ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::json;

use finreport_ext_file::{FileReportSink, InMemoryMarketData, InMemoryReportSink, JsonMarketDataSource};
use finreport_ext_http::{OllamaClient, OpenAiClient, YahooFinanceClient};
use finreport_traits::{LanguageModel, MarketDataSource, ReportSink, TraitError};

use crate::ai::ModelRouter;
use crate::config::{AiBackendKind, ConfigError, MarketSourceKind, ServerConfig, ToolsConfig};
use crate::error::{ToolError, ToolResult};
use crate::templates::{self, GENERATED_PREFIX, TEMPLATES};
use crate::{SERVER_NAME, SERVER_VERSION};

/// MCP server for FinReport tools
#[derive(Clone)]
pub struct FinReportServer {
    /// Market data capability
    pub(crate) market_data: Arc<dyn MarketDataSource>,
    /// Report persistence capability
    pub(crate) reports: Arc<dyn ReportSink>,
    /// Language model backends
    pub(crate) models: ModelRouter,
    /// Enabled tool groups
    tools: ToolsConfig,
    /// Tool router for MCP tools
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for FinReportServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinReportServer")
            .field("market_data", &self.market_data.name())
            .field("models", &self.models)
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

/// Builder for [`FinReportServer`].
///
/// Capabilities left unset default to empty in-memory implementations.
#[derive(Default)]
pub struct FinReportServerBuilder {
    market_data: Option<Arc<dyn MarketDataSource>>,
    reports: Option<Arc<dyn ReportSink>>,
    models: ModelRouter,
    tools: ToolsConfig,
}

impl FinReportServerBuilder {
    /// Sets the market data source.
    #[must_use]
    pub fn with_market_data(mut self, source: Arc<dyn MarketDataSource>) -> Self {
        self.market_data = Some(source);
        self
    }

    /// Sets the report sink.
    #[must_use]
    pub fn with_report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.reports = Some(sink);
        self
    }

    /// Appends a language model backend. Backends are tried in insertion order.
    #[must_use]
    pub fn with_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.models.push(model);
        self
    }

    /// Replaces the model router.
    #[must_use]
    pub fn with_router(mut self, router: ModelRouter) -> Self {
        self.models = router;
        self
    }

    /// Enables or disables the offline placeholder answer.
    #[must_use]
    pub fn with_offline_fallback(mut self, allow: bool) -> Self {
        self.models = self.models.with_offline_fallback(allow);
        self
    }

    /// Selects the registered tool groups.
    #[must_use]
    pub fn with_tools(mut self, tools: ToolsConfig) -> Self {
        self.tools = tools;
        self
    }

    /// Build the server.
    pub fn build(self) -> FinReportServer {
        FinReportServer {
            market_data: self
                .market_data
                .unwrap_or_else(|| Arc::new(InMemoryMarketData::new())),
            reports: self
                .reports
                .unwrap_or_else(|| Arc::new(InMemoryReportSink::new())),
            models: self.models,
            tools: self.tools,
            tool_router: FinReportServer::build_router(self.tools),
        }
    }
}

impl FinReportServer {
    /// Start building a server.
    pub fn builder() -> FinReportServerBuilder {
        FinReportServerBuilder::default()
    }

    /// Wire the configured capabilities.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let md = &config.market_data;
        let market_data: Arc<dyn MarketDataSource> = match md.source {
            MarketSourceKind::Yahoo => Arc::new(
                YahooFinanceClient::new(
                    &md.base_url,
                    Duration::from_secs(md.timeout_secs),
                    md.user_agent.as_deref(),
                )
                .map_err(|source| ConfigError::Client {
                    what: "market data client",
                    source,
                })?,
            ),
            MarketSourceKind::File => {
                let path = md.file.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("market_data.file is required for the file source".into())
                })?;
                Arc::new(JsonMarketDataSource::new(path).map_err(|source| {
                    ConfigError::Client {
                        what: "market data file",
                        source,
                    }
                })?)
            }
        };
        tracing::info!(source = market_data.name(), "market data source ready");

        let reports = Arc::new(FileReportSink::new(&config.reports.output_dir));
        tracing::info!(dir = %config.reports.output_dir.display(), "report sink ready");

        let mut builder = Self::builder()
            .with_market_data(market_data)
            .with_report_sink(reports)
            .with_tools(config.tools);

        for kind in &config.ai.order {
            match kind {
                AiBackendKind::Ollama if config.ollama.enabled => {
                    let client = OllamaClient::new(
                        &config.ollama.base_url,
                        &config.ollama.model,
                        Duration::from_secs(config.ollama.timeout_secs),
                    )
                    .map_err(|source| ConfigError::Client {
                        what: "ollama client",
                        source,
                    })?;
                    tracing::info!(model = %config.ollama.model, url = %config.ollama.base_url, "ollama backend configured");
                    builder = builder.with_model(Arc::new(client));
                }
                AiBackendKind::OpenAi if config.openai.enabled => {
                    let key = std::env::var(&config.openai.api_key_env).unwrap_or_default();
                    if key.trim().is_empty() {
                        tracing::warn!(
                            env = %config.openai.api_key_env,
                            "no API key in environment, openai backend skipped"
                        );
                        continue;
                    }
                    let client = OpenAiClient::new(
                        &config.openai.base_url,
                        &key,
                        &config.openai.model,
                        Duration::from_secs(config.openai.timeout_secs),
                    )
                    .map_err(|source| ConfigError::Client {
                        what: "openai client",
                        source,
                    })?;
                    tracing::info!(model = %config.openai.model, "openai backend configured");
                    builder = builder.with_model(Arc::new(client));
                }
                _ => tracing::debug!(backend = ?kind, "backend disabled"),
            }
        }

        Ok(builder
            .with_offline_fallback(config.ai.allow_offline_fallback)
            .build())
    }

    fn build_router(tools: ToolsConfig) -> ToolRouter<Self> {
        let mut router = ToolRouter::new();
        if tools.analysis {
            router.merge(Self::analysis_router());
        }
        if tools.market_data {
            router.merge(Self::market_router());
        }
        if tools.reports {
            router.merge(Self::reports_router());
        }
        if tools.ai {
            router.merge(Self::ai_router());
        }
        router
    }

    /// Names of the registered tools, sorted.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        names
    }

    /// The model router.
    pub fn models(&self) -> &ModelRouter {
        &self.models
    }

    /// Create a success result with JSON content
    pub fn json_result<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Templates plus one entry per stored report.
    pub async fn report_resources(&self) -> Result<Vec<Resource>, McpError> {
        let mut resources: Vec<Resource> = TEMPLATES
            .iter()
            .map(|t| {
                let mut raw = RawResource::new(t.uri, t.name);
                raw.description = Some(t.description.to_string());
                raw.mime_type = Some("text/plain".to_string());
                raw.no_annotation()
            })
            .collect();

        let stored = self
            .reports
            .list()
            .await
            .map_err(|e| McpError::from(ToolError::from(e)))?;
        for report in stored {
            let mut raw = RawResource::new(templates::generated_uri(&report.name), report.name.clone());
            raw.description = Some(format!("Generated report: {}", report.name));
            raw.mime_type = Some(mime_for(&report.name).to_string());
            resources.push(raw.no_annotation());
        }
        Ok(resources)
    }

    /// Text of a template or stored report.
    pub async fn read_report_resource(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        let text = if let Some(template) = templates::template(uri) {
            template.body.to_string()
        } else if let Some(name) = uri.strip_prefix(GENERATED_PREFIX) {
            match self.reports.read(name).await {
                Ok(report) => report.content,
                Err(TraitError::NotFound(_) | TraitError::InvalidInput(_)) => {
                    return Err(not_found(uri));
                }
                Err(e) => return Err(ToolError::from(e).into()),
            }
        } else {
            return Err(not_found(uri));
        };

        tracing::debug!(uri, bytes = text.len(), "resource read");
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }

    /// Upper-cased, validated ticker symbol.
    pub(crate) fn normalize_symbol(raw: &str) -> ToolResult<String> {
        let symbol = raw.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(ToolError::invalid("symbol must not be empty"));
        }
        if !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
        {
            return Err(ToolError::invalid(format!("invalid symbol '{}'", raw.trim())));
        }
        Ok(symbol)
    }

    /// Validated, non-empty symbol list.
    pub(crate) fn normalize_symbols(raw: &[String]) -> ToolResult<Vec<String>> {
        if raw.is_empty() {
            return Err(ToolError::invalid("symbols must not be empty"));
        }
        raw.iter().map(|s| Self::normalize_symbol(s)).collect()
    }
}

fn not_found(uri: &str) -> McpError {
    McpError::resource_not_found(
        format!("unknown resource '{uri}'"),
        Some(json!({ "kind": "not_found", "uri": uri })),
    )
}

fn mime_for(name: &str) -> &'static str {
    if name.ends_with(".md") {
        "text/markdown"
    } else {
        "text/plain"
    }
}

#[tool_handler]
impl ServerHandler for FinReportServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = "FinReport MCP Server - financial analysis and reporting. \
             Compute returns, volatility and Sharpe ratios, pull market data, generate \
             stock and portfolio reports, and ask a language model for analysis. \
             AI answers carry a `degraded` flag when a fallback backend answered. \
             Generated reports are listed as resources under financial://reports/generated/.";

        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
                title: Some("FinReport Financial Analysis".to_string()),
                icons: None,
                website_url: None,
            },
            instructions: Some(instructions.to_string()),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(
            self.report_resources().await?,
        ))
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri, .. }: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        self.read_report_resource(&uri).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(FinReportServer::normalize_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(FinReportServer::normalize_symbol("brk.b").unwrap(), "BRK.B");
        assert_eq!(FinReportServer::normalize_symbol("^gspc").unwrap(), "^GSPC");
        assert!(FinReportServer::normalize_symbol("  ").is_err());
        assert!(FinReportServer::normalize_symbol("../etc").is_err());
        assert!(FinReportServer::normalize_symbols(&[]).is_err());
    }

    #[test]
    fn test_all_groups_registered_by_default() {
        let server = FinReportServer::builder().build();
        let names = server.tool_names();
        assert_eq!(names.len(), 12);
        assert!(names.contains(&"compute_sharpe_ratio".to_string()));
        assert!(names.contains(&"ai_status".to_string()));
    }

    #[test]
    fn test_disabled_groups_not_registered() {
        let server = FinReportServer::builder()
            .with_tools(ToolsConfig {
                ai: false,
                market_data: false,
                ..ToolsConfig::default()
            })
            .build();
        let names = server.tool_names();
        assert_eq!(names.len(), 5);
        assert!(!names.iter().any(|n| n.starts_with("ai_")));
        assert!(!names.contains(&"get_stock_price".to_string()));
    }

    #[test]
    fn test_server_info() {
        let info = FinReportServer::builder().build().get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
    }

    #[test]
    fn test_from_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::default();
        config.reports.output_dir = dir.path().to_path_buf();
        config.openai.api_key_env = "FINREPORT_TEST_UNSET_KEY".into();
        let server = FinReportServer::from_config(&config).unwrap();
        assert_eq!(server.market_data.name(), "yahoo");
        // ollama only; the key variable is unset
        assert_eq!(server.models().len(), 1);
    }
}
