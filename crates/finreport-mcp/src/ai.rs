//! Language model routing.
//!
//! [`ModelRouter`] tries its backends in order and reports which one answered.
//! An answer from anything but the first backend is flagged `degraded`, as is
//! the optional offline placeholder.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use finreport_traits::{CompletionRequest, LanguageModel};

/// Backend name reported for placeholder answers.
pub const OFFLINE_BACKEND: &str = "offline";

/// Placeholder text returned when no backend answered.
pub const OFFLINE_NOTICE: &str = "[offline placeholder] No language model backend was available \
to answer this request. This text was not generated by a model and contains no analysis. \
Check the ai_status tool for backend health.";

/// One backend's failure during a routed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendFailure {
    /// Backend name
    pub backend: String,
    /// What went wrong
    pub reason: String,
}

impl fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.backend, self.reason)
    }
}

/// Routing failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    /// No backend produced an answer and the placeholder is disabled.
    #[error("no language model backend answered ({})", describe(.failures))]
    AllBackendsFailed {
        /// Per-backend failures, in routing order
        failures: Vec<BackendFailure>,
    },
}

fn describe(failures: &[BackendFailure]) -> String {
    if failures.is_empty() {
        "none configured".to_string()
    } else {
        failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Generated text and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedCompletion {
    /// Generated text
    pub text: String,
    /// Backend that answered
    pub backend: String,
    /// Model that answered
    pub model: String,
    /// True unless the first configured backend answered
    pub degraded: bool,
}

/// Health of one configured backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendStatus {
    /// Backend name
    pub backend: String,
    /// Configured model
    pub model: String,
    /// Health check result
    pub healthy: bool,
    /// Models the backend reports, when it is reachable
    pub models: Vec<String>,
}

/// Ordered set of language model backends.
#[derive(Clone, Default)]
pub struct ModelRouter {
    backends: Vec<Arc<dyn LanguageModel>>,
    allow_offline: bool,
}

impl fmt::Debug for ModelRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRouter")
            .field(
                "backends",
                &self.backends.iter().map(|b| b.backend()).collect::<Vec<_>>(),
            )
            .field("allow_offline", &self.allow_offline)
            .finish()
    }
}

impl ModelRouter {
    /// Router over `backends`, tried in order.
    pub fn new(backends: Vec<Arc<dyn LanguageModel>>) -> Self {
        Self {
            backends,
            allow_offline: false,
        }
    }

    /// Enables the offline placeholder.
    #[must_use]
    pub fn with_offline_fallback(mut self, allow: bool) -> Self {
        self.allow_offline = allow;
        self
    }

    /// Appends a backend.
    pub fn push(&mut self, backend: Arc<dyn LanguageModel>) {
        self.backends.push(backend);
    }

    /// Number of configured backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// True when no backend is configured.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Whether the offline placeholder is enabled.
    pub fn allows_offline(&self) -> bool {
        self.allow_offline
    }

    /// Generate with the first backend that is healthy and succeeds.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<RoutedCompletion, AiError> {
        let mut failures = Vec::new();

        for (position, backend) in self.backends.iter().enumerate() {
            if !backend.health_check().await {
                tracing::warn!(backend = backend.backend(), "backend unhealthy, skipping");
                failures.push(BackendFailure {
                    backend: backend.backend().to_string(),
                    reason: "health check failed".into(),
                });
                continue;
            }

            match backend.generate(request).await {
                Ok(completion) => {
                    let degraded = position > 0;
                    if degraded {
                        tracing::warn!(
                            backend = backend.backend(),
                            skipped = position,
                            "answered by fallback backend"
                        );
                    } else {
                        tracing::debug!(backend = backend.backend(), "answered by primary backend");
                    }
                    return Ok(RoutedCompletion {
                        text: completion.text,
                        backend: backend.backend().to_string(),
                        model: completion.model,
                        degraded,
                    });
                }
                Err(e) => {
                    tracing::error!(backend = backend.backend(), error = %e, "generation failed");
                    failures.push(BackendFailure {
                        backend: backend.backend().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if self.allow_offline {
            tracing::warn!(failed = failures.len(), "no backend answered, using offline placeholder");
            return Ok(RoutedCompletion {
                text: OFFLINE_NOTICE.to_string(),
                backend: OFFLINE_BACKEND.to_string(),
                model: "none".to_string(),
                degraded: true,
            });
        }

        Err(AiError::AllBackendsFailed { failures })
    }

    /// Health and model list of every backend, in routing order.
    pub async fn status(&self) -> Vec<BackendStatus> {
        let mut statuses = Vec::with_capacity(self.backends.len());
        for backend in &self.backends {
            let healthy = backend.health_check().await;
            let models = if healthy {
                backend.available_models().await.unwrap_or_else(|e| {
                    tracing::debug!(backend = backend.backend(), error = %e, "model list failed");
                    Vec::new()
                })
            } else {
                Vec::new()
            };
            statuses.push(BackendStatus {
                backend: backend.backend().to_string(),
                model: backend.model().to_string(),
                healthy,
                models,
            });
        }
        statuses
    }
}
