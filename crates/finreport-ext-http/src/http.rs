//! Shared reqwest plumbing.

use std::time::Duration;

use finreport_traits::error::TraitError;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

/// Longest response body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// A role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant"
    pub role: String,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// System message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    /// User message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

pub(crate) fn build_client(timeout: Duration, user_agent: Option<&str>) -> Result<Client, TraitError> {
    let mut builder = Client::builder().timeout(timeout);
    if let Some(agent) = user_agent {
        builder = builder.user_agent(agent.to_string());
    }
    builder
        .build()
        .map_err(|e| TraitError::ConnectionFailed(format!("failed to build HTTP client: {e}")))
}

pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

pub(crate) fn map_reqwest_error(e: reqwest::Error) -> TraitError {
    if e.is_timeout() {
        TraitError::Timeout
    } else if e.is_decode() {
        TraitError::ParseError(e.to_string())
    } else {
        TraitError::ConnectionFailed(e.to_string())
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

/// Turns a non-success response into the matching [`TraitError`].
pub(crate) async fn check_status(response: Response, what: &str) -> Result<Response, TraitError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = truncate(response.text().await.unwrap_or_default());
    tracing::error!(%status, what, body = %body, "upstream request failed");
    Err(match status {
        StatusCode::NOT_FOUND => TraitError::NotFound(what.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            TraitError::AuthenticationFailed(body)
        }
        StatusCode::TOO_MANY_REQUESTS => TraitError::RateLimited,
        _ => TraitError::Http {
            status: status.as_u16(),
            body,
        },
    })
}
