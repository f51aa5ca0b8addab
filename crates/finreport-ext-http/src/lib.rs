//! # FinReport Ext HTTP
//!
//! Network-backed capability implementations for FinReport:
//!
//! - [`YahooFinanceClient`]: chart and quote-summary endpoints of a
//!   Yahoo-Finance-compatible market data API
//! - [`OllamaClient`]: a locally served model over the Ollama REST API
//! - [`OpenAiClient`]: an OpenAI-compatible chat completions API
//!
//! Every client carries one request timeout and makes a single attempt per
//! call. Retrying is left to the caller.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod http;
mod ollama;
mod openai;
mod yahoo;

pub use http::ChatMessage;
pub use ollama::{OllamaClient, OllamaModel, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};
pub use openai::{OpenAiClient, DEFAULT_OPENAI_MODEL, DEFAULT_OPENAI_URL};
pub use yahoo::{YahooFinanceClient, DEFAULT_YAHOO_URL};
