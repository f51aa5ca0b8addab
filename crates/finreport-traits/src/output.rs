//! Report persistence.
//!
//! Rendered reports are handed to a [`ReportSink`] injected by the caller;
//! the tool handlers never choose a path themselves.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TraitError;

/// Where a written report ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLocation {
    /// Report name as stored
    pub name: String,
    /// Sink-specific locator (file path, memory URI, ...)
    pub uri: String,
}

/// A stored report and its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredReport {
    /// Report name
    pub name: String,
    /// Report body
    pub content: String,
}

/// Trait for report sinks.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persist `content` under `name`, replacing any previous report.
    async fn write(&self, name: &str, content: &str) -> Result<ReportLocation, TraitError>;

    /// Read a report back.
    async fn read(&self, name: &str) -> Result<StoredReport, TraitError>;

    /// List stored reports, sorted by name.
    async fn list(&self) -> Result<Vec<ReportLocation>, TraitError>;
}

/// Reduces `name` to characters safe for any sink: ASCII alphanumerics,
/// `-`, `_` and `.`. Other characters become `_`; leading dots are dropped.
pub fn sanitize_report_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}
