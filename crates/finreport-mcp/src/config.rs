//! Server configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use finreport_ext_http::{
    DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_OPENAI_MODEL, DEFAULT_OPENAI_URL,
    DEFAULT_YAHOO_URL,
};
use finreport_traits::TraitError;

/// Configuration loading and wiring errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`ServerConfig`].
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but do not make sense together.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// A capability client could not be constructed.
    #[error("failed to initialize {what}: {source}")]
    Client {
        /// Which client
        what: &'static str,
        /// Underlying error
        source: TraitError,
    },
}

/// Top-level configuration, read from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listener settings for the HTTP transport
    #[serde(default)]
    pub server: ListenConfig,

    /// Tool group switches
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Market data source
    #[serde(default)]
    pub market_data: MarketDataConfig,

    /// Report storage
    #[serde(default)]
    pub reports: ReportsConfig,

    /// Model routing
    #[serde(default)]
    pub ai: AiConfig,

    /// Local Ollama backend
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// OpenAI-compatible backend
    #[serde(default)]
    pub openai: OpenAiConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Per-group tool switches. A disabled group is not registered at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// compute_returns, compute_volatility, compute_sharpe_ratio
    #[serde(default = "default_true")]
    pub analysis: bool,

    /// get_stock_price, get_financial_info, get_market_data
    #[serde(default = "default_true")]
    pub market_data: bool,

    /// generate_stock_report, generate_portfolio_report
    #[serde(default = "default_true")]
    pub reports: bool,

    /// ai_* tools
    #[serde(default = "default_true")]
    pub ai: bool,
}

/// Where market data comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketSourceKind {
    /// Yahoo-Finance-compatible HTTP API
    #[default]
    Yahoo,
    /// JSON snapshot file
    File,
}

/// Market data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDataConfig {
    /// Source kind
    #[serde(default)]
    pub source: MarketSourceKind,

    /// API root for the `yahoo` source
    #[serde(default = "default_yahoo_url")]
    pub base_url: String,

    /// User agent sent to the API
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_market_timeout")]
    pub timeout_secs: u64,

    /// Snapshot file for the `file` source
    pub file: Option<PathBuf>,
}

/// Report storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Directory generated reports are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// A language model backend name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiBackendKind {
    /// Local Ollama server
    Ollama,
    /// OpenAI-compatible API
    #[serde(rename = "openai")]
    OpenAi,
}

/// Model routing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Backends in the order they are tried
    #[serde(default = "default_ai_order")]
    pub order: Vec<AiBackendKind>,

    /// Answer with a marked placeholder when every backend fails
    #[serde(default)]
    pub allow_offline_fallback: bool,
}

/// Ollama backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Include this backend
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Server root
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    /// Model tag
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_ollama_timeout")]
    pub timeout_secs: u64,
}

/// OpenAI-compatible backend settings. The key is read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Include this backend when a key is present
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API root
    #[serde(default = "default_openai_url")]
    pub base_url: String,

    /// Chat model
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_openai_timeout")]
    pub timeout_secs: u64,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_yahoo_url() -> String {
    DEFAULT_YAHOO_URL.to_string()
}

fn default_market_timeout() -> u64 {
    30
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_ai_order() -> Vec<AiBackendKind> {
    vec![AiBackendKind::Ollama, AiBackendKind::OpenAi]
}

fn default_ollama_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

fn default_ollama_model() -> String {
    DEFAULT_OLLAMA_MODEL.to_string()
}

fn default_ollama_timeout() -> u64 {
    120
}

fn default_openai_url() -> String {
    DEFAULT_OPENAI_URL.to_string()
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_openai_timeout() -> u64 {
    60
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            analysis: true,
            market_data: true,
            reports: true,
            ai: true,
        }
    }
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            source: MarketSourceKind::default(),
            base_url: default_yahoo_url(),
            user_agent: None,
            timeout_secs: default_market_timeout(),
            file: None,
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            order: default_ai_order(),
            allow_offline_fallback: false,
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_ollama_url(),
            model: default_ollama_model(),
            timeout_secs: default_ollama_timeout(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_openai_url(),
            model: default_openai_model(),
            timeout_secs: default_openai_timeout(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given. A missing file falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            None => Ok(Self::default()),
            Some(path) if !path.exists() => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            Some(path) => Self::from_file(path),
        }
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.market_data.source == MarketSourceKind::File && self.market_data.file.is_none() {
            return Err(ConfigError::Invalid(
                "market_data.source = \"file\" requires market_data.file".into(),
            ));
        }
        let timeouts = [
            ("market_data.timeout_secs", self.market_data.timeout_secs),
            ("ollama.timeout_secs", self.ollama.timeout_secs),
            ("openai.timeout_secs", self.openai.timeout_secs),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be positive")));
        }
        for (i, kind) in self.ai.order.iter().enumerate() {
            if self.ai.order[..i].contains(kind) {
                return Err(ConfigError::Invalid(format!(
                    "ai.order lists {kind:?} more than once"
                )));
            }
        }
        Ok(())
    }
}
