//! Ollama REST API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use finreport_traits::error::TraitError;
use finreport_traits::llm::{Completion, CompletionRequest, LanguageModel};

use crate::http::{build_client, check_status, map_reqwest_error, trim_base_url, ChatMessage};

/// Default local Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model name.
pub const DEFAULT_OLLAMA_MODEL: &str = "deepseek-r1:7b";

/// Probe timeout for [`OllamaClient::list_models`] and health checks.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// A model installed on the Ollama server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OllamaModel {
    /// Model tag, e.g. `llama3:8b`
    pub name: String,
    /// Size on disk in bytes
    #[serde(default)]
    pub size: u64,
    /// Last modification time as reported by the server
    #[serde(default)]
    pub modified_at: String,
}

/// Client for a locally served model.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct Options {
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: Options,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    model: Option<String>,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: Options,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
    model: Option<String>,
}

impl ChatResponse {
    fn into_completion(self, requested: &str) -> Result<Completion, TraitError> {
        let message = self
            .message
            .ok_or_else(|| TraitError::ParseError("chat response has no message".into()))?;
        Ok(Completion {
            text: message.content,
            model: self.model.unwrap_or_else(|| requested.to_string()),
        })
    }
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

impl OllamaClient {
    /// Create a client for `model` served at `base_url`.
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, TraitError> {
        Ok(Self {
            client: build_client(timeout, None)?,
            base_url: trim_base_url(base_url),
            model: model.to_string(),
        })
    }

    /// Multi-turn chat via `/api/chat`.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Completion, TraitError> {
        let body = ChatBody {
            model: &self.model,
            messages,
            stream: false,
            options: Options {
                temperature,
                num_predict: max_tokens,
            },
        };
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response, &format!("ollama model '{}'", self.model)).await?;
        let parsed: ChatResponse = response.json().await.map_err(map_reqwest_error)?;
        parsed.into_completion(&self.model)
    }

    /// Models installed on the server, via `/api/tags`.
    pub async fn list_models(&self) -> Result<Vec<OllamaModel>, TraitError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response, "ollama tags").await?;
        let tags: TagsResponse = response.json().await.map_err(map_reqwest_error)?;
        Ok(tags.models)
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    fn backend(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<Completion, TraitError> {
        let body = GenerateBody {
            model: &self.model,
            prompt: &request.prompt,
            system: request.system.as_deref(),
            stream: false,
            options: Options {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };
        tracing::debug!(model = %self.model, prompt_len = request.prompt.len(), "ollama generate");
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response, &format!("ollama model '{}'", self.model)).await?;
        let parsed: GenerateResponse = response.json().await.map_err(map_reqwest_error)?;
        Ok(Completion {
            text: parsed.response,
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
        })
    }

    async fn health_check(&self) -> bool {
        match self.list_models().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "ollama health check failed");
                false
            }
        }
    }

    async fn available_models(&self) -> Result<Vec<String>, TraitError> {
        Ok(self.list_models().await?.into_iter().map(|m| m.name).collect())
    }
}
