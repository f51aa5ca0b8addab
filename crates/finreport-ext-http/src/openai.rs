//! OpenAI-compatible chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use finreport_traits::error::TraitError;
use finreport_traits::llm::{Completion, CompletionRequest, LanguageModel};

use crate::http::{build_client, check_status, map_reqwest_error, trim_base_url, ChatMessage};

/// Default API root.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

/// Default chat model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Client for `/v1/chat/completions`.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    model: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

fn build_messages(request: &CompletionRequest) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system {
        messages.push(ChatMessage::system(system.clone()));
    }
    messages.push(ChatMessage::user(request.prompt.clone()));
    messages
}

fn first_choice(parsed: ChatCompletionResponse, fallback_model: &str) -> Result<Completion, TraitError> {
    let model = parsed.model.unwrap_or_else(|| fallback_model.to_string());
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| TraitError::ParseError("completion has no choices".into()))?;
    Ok(Completion {
        text: choice.message.content,
        model,
    })
}

impl OpenAiClient {
    /// Create a client. An empty `api_key` is rejected.
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, TraitError> {
        if api_key.trim().is_empty() {
            return Err(TraitError::AuthenticationFailed("missing API key".into()));
        }
        Ok(Self {
            client: build_client(timeout, None)?,
            base_url: trim_base_url(base_url),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    fn backend(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<Completion, TraitError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: build_messages(request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        tracing::debug!(model = %self.model, "openai chat completion");
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response, &format!("openai model '{}'", self.model)).await?;
        let parsed: ChatCompletionResponse = response.json().await.map_err(map_reqwest_error)?;
        first_choice(parsed, &self.model)
    }

    async fn health_check(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/v1/models", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await;
        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "openai health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_include_system_first() {
        let request = CompletionRequest::new("analyze").with_system("be brief");
        let messages = build_messages(&request);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content, "analyze");

        assert_eq!(build_messages(&CompletionRequest::new("x")).len(), 1);
    }

    #[test]
    fn test_first_choice() {
        let parsed: ChatCompletionResponse = serde_json::from_str(
            r#"{"id":"c1","model":"gpt-3.5-turbo-0125","choices":[{"index":0,"message":{"role":"assistant","content":"Hold."},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        let completion = first_choice(parsed, "gpt-3.5-turbo").unwrap();
        assert_eq!(completion.text, "Hold.");
        assert_eq!(completion.model, "gpt-3.5-turbo-0125");
    }

    #[test]
    fn test_empty_choices_is_parse_error() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            first_choice(parsed, "m"),
            Err(TraitError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_key_rejected() {
        let result = OpenAiClient::new(DEFAULT_OPENAI_URL, "  ", DEFAULT_OPENAI_MODEL, Duration::from_secs(5));
        assert!(matches!(result, Err(TraitError::AuthenticationFailed(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let client =
            OpenAiClient::new(DEFAULT_OPENAI_URL, "sk-secret", DEFAULT_OPENAI_MODEL, Duration::from_secs(5))
                .unwrap();
        assert!(!format!("{client:?}").contains("sk-secret"));
    }
}
