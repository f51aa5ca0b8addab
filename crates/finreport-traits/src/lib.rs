//! # FinReport Traits
//!
//! Capability traits for the FinReport tool server.
//!
//! This crate contains ONLY trait definitions and the data types that cross
//! them. All implementations are in separate extension crates.
//!
//! ## Module Structure
//!
//! - [`market_data`]: Price history, quotes and company profiles
//! - [`llm`]: Text generation backends
//! - [`output`]: Report persistence
//!
//! ## Dependency Injection
//!
//! The server receives each capability as a trait object:
//!
//! ```ignore
//! FinReportServer::builder()
//!     .with_market_data(Arc::new(impl MarketDataSource))
//!     .with_report_sink(Arc::new(impl ReportSink))
//!     .with_model(Arc::new(impl LanguageModel))
//!     .build()
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod llm;
pub mod market_data;
pub mod output;

// Re-export commonly used types
pub use error::TraitError;
pub use llm::{Completion, CompletionRequest, LanguageModel};
pub use market_data::{CompanyProfile, MarketDataSource, PriceBar, PriceHistory, StockQuote};
pub use output::{ReportLocation, ReportSink, StoredReport};
