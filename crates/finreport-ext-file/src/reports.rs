//! Report sinks.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use finreport_traits::error::TraitError;
use finreport_traits::output::{sanitize_report_name, ReportLocation, ReportSink, StoredReport};

fn checked_name(name: &str) -> Result<String, TraitError> {
    let clean = sanitize_report_name(name);
    if clean.is_empty() || clean != name {
        return Err(TraitError::InvalidInput(format!(
            "invalid report name '{name}'"
        )));
    }
    Ok(clean)
}

// =============================================================================
// FILE SINK
// =============================================================================

/// Writes each report as a file in one directory.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    /// Create a sink rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn location(&self, name: &str) -> ReportLocation {
        ReportLocation {
            name: name.to_string(),
            uri: self.dir.join(name).display().to_string(),
        }
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn write(&self, name: &str, content: &str) -> Result<ReportLocation, TraitError> {
        let name = checked_name(name)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&name), content).await?;
        tracing::info!(report = %name, dir = %self.dir.display(), "report written");
        Ok(self.location(&name))
    }

    async fn read(&self, name: &str) -> Result<StoredReport, TraitError> {
        let name = checked_name(name)?;
        let path = self.dir.join(&name);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TraitError::NotFound(format!("report '{name}'")),
            _ => TraitError::IoError(e.to_string()),
        })?;
        Ok(StoredReport { name, content })
    }

    async fn list(&self) -> Result<Vec<ReportLocation>, TraitError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reports = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if sanitize_report_name(name) == name {
                    reports.push(self.location(name));
                }
            }
        }
        reports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(reports)
    }
}

// =============================================================================
// IN-MEMORY SINK
// =============================================================================

/// Keeps reports in memory. Useful for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryReportSink {
    reports: DashMap<String, String>,
}

impl InMemoryReportSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reports.
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    fn location(name: &str) -> ReportLocation {
        ReportLocation {
            name: name.to_string(),
            uri: format!("memory://reports/{name}"),
        }
    }
}

#[async_trait]
impl ReportSink for InMemoryReportSink {
    async fn write(&self, name: &str, content: &str) -> Result<ReportLocation, TraitError> {
        let name = checked_name(name)?;
        self.reports.insert(name.clone(), content.to_string());
        Ok(Self::location(&name))
    }

    async fn read(&self, name: &str) -> Result<StoredReport, TraitError> {
        self.reports
            .get(name)
            .map(|content| StoredReport {
                name: name.to_string(),
                content: content.clone(),
            })
            .ok_or_else(|| TraitError::NotFound(format!("report '{name}'")))
    }

    async fn list(&self) -> Result<Vec<ReportLocation>, TraitError> {
        let mut reports: Vec<_> = self
            .reports
            .iter()
            .map(|entry| Self::location(entry.key()))
            .collect();
        reports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(reports)
    }
}
