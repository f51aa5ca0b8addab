//! Mapping of domain errors onto MCP error responses.
//!
//! Every error carries a structured `data` object `{ "kind": ... }` so clients
//! can branch without parsing messages.

use rmcp::ErrorData as McpError;
use serde_json::json;
use thiserror::Error;

use finreport_core::AnalysisError;
use finreport_traits::TraitError;

use crate::ai::AiError;

/// Errors raised by tool handlers.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Calculator rejected its input.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// A capability call failed.
    #[error(transparent)]
    Capability(#[from] TraitError),

    /// No language model could answer.
    #[error(transparent)]
    Ai(#[from] AiError),

    /// Argument validation failed.
    #[error("{0}")]
    InvalidArgument(String),

    /// Argument is well-formed but not supported.
    #[error("{0}")]
    Unsupported(String),

    /// Requested entity does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl ToolError {
    /// Shorthand for [`ToolError::InvalidArgument`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Analysis(e) => e.kind(),
            ToolError::Capability(TraitError::NotFound(_)) | ToolError::NotFound(_) => "not_found",
            ToolError::Capability(TraitError::InvalidInput(_)) | ToolError::InvalidArgument(_) => {
                "invalid_input"
            }
            ToolError::Capability(TraitError::Timeout) => "timeout",
            ToolError::Capability(_) => "upstream",
            ToolError::Ai(_) => "ai_unavailable",
            ToolError::Unsupported(_) => "unsupported",
        }
    }

    fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            "insufficient_data"
                | "division_by_zero"
                | "invalid_input"
                | "not_found"
                | "unsupported"
        )
    }
}

impl From<ToolError> for McpError {
    fn from(e: ToolError) -> Self {
        let data = Some(json!({ "kind": e.kind() }));
        if e.is_client_error() {
            tracing::debug!(error = %e, "tool call rejected");
            McpError::invalid_params(e.to_string(), data)
        } else {
            tracing::error!(error = %e, "tool call failed");
            McpError::internal_error(e.to_string(), data)
        }
    }
}

/// Tool handler result.
pub type ToolResult<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn test_analysis_errors_are_invalid_params() {
        let err: McpError = ToolError::from(AnalysisError::insufficient_data(2, 1)).into();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.data, Some(json!({ "kind": "insufficient_data" })));
    }

    #[test]
    fn test_upstream_errors_are_internal() {
        let err: McpError = ToolError::from(TraitError::ConnectionFailed("refused".into())).into();
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(err.data, Some(json!({ "kind": "upstream" })));

        let err: McpError = ToolError::from(TraitError::Timeout).into();
        assert_eq!(err.data, Some(json!({ "kind": "timeout" })));
    }

    #[test]
    fn test_not_found_is_invalid_params() {
        let err: McpError = ToolError::from(TraitError::NotFound("symbol 'XXXX'".into())).into();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.data, Some(json!({ "kind": "not_found" })));
    }

    #[test]
    fn test_unsupported_kind() {
        let err = ToolError::Unsupported("info_type 'balance_sheet'".into());
        assert_eq!(err.kind(), "unsupported");
        assert!(err.is_client_error());
    }
}
