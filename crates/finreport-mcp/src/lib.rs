//! # FinReport MCP Server
//!
//! Model Context Protocol (MCP) server exposing FinReport's financial tools
//! to AI assistants and other MCP-compatible clients.
//!
//! ## Tool groups
//!
//! - **Analysis**: returns, volatility and Sharpe ratio over number series
//! - **Market data**: price history, company profile and multi-symbol snapshots
//! - **Reports**: templated stock and portfolio reports written to a report sink
//! - **AI**: prompt construction over Ollama and OpenAI-compatible backends,
//!   with an explicit `degraded` flag whenever a fallback answered
//!
//! Generated reports and the built-in report templates are also published as
//! MCP resources under `financial://reports/`.
//!
//! ## Quick Start
//!
//! ```bash
//! # stdio transport (desktop clients)
//! finreport-mcp-server --config finreport.toml
//!
//! # streamable HTTP transport
//! finreport-mcp-server --http --port 8080
//! ```

#![warn(missing_docs)]

pub mod ai;
pub mod config;
pub mod error;
pub mod prompts;
pub mod server;
pub mod templates;
pub mod tools;

pub use ai::{AiError, BackendStatus, ModelRouter, RoutedCompletion};
pub use config::{ConfigError, ServerConfig};
pub use server::{FinReportServer, FinReportServerBuilder};

/// Server name for MCP protocol
pub const SERVER_NAME: &str = "finreport-mcp";

/// Server version (same as crate version)
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
