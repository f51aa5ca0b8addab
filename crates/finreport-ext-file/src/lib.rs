//! # FinReport Ext File
//!
//! File-based and in-memory capability implementations for FinReport.
//!
//! This crate provides default implementations for local use and tests:
//! - Report sinks writing to a directory or to memory
//! - Market data served from a JSON snapshot or from memory
//!
//! For live market data, use the HTTP extension.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod market_data;
mod reports;

pub use market_data::*;
pub use reports::*;
