//! Text generation backends.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TraitError;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default generation length limit.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// A single prompt with optional system instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System prompt
    pub system: Option<String>,
    /// User prompt
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Creates a request with default sampling settings.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the generation length limit.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Generated text and the model that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Generated text
    pub text: String,
    /// Model identifier reported by the backend
    pub model: String,
}

/// Trait for language model backends.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Backend name (e.g. "ollama", "openai").
    fn backend(&self) -> &str;

    /// Configured model identifier.
    fn model(&self) -> &str;

    /// Generate a completion for `request`.
    async fn generate(&self, request: &CompletionRequest) -> Result<Completion, TraitError>;

    /// Cheap liveness probe. Backends without one report `true`.
    async fn health_check(&self) -> bool {
        true
    }

    /// Models this backend can serve. Defaults to the configured model.
    async fn available_models(&self) -> Result<Vec<String>, TraitError> {
        Ok(vec![self.model().to_string()])
    }
}
