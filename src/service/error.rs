//! Service error types

use thiserror::Error;

/// Failure reported by a `ConversationService`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("request failed"))]
    Status { status: u16, detail: Option<String> },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn status(status: u16, detail: Option<String>) -> Self {
        Self::Status { status, detail }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Message the server attached to the failure, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            Self::NotFound(detail) if !detail.is_empty() => Some(detail),
            _ => None,
        }
    }

    /// HTTP status code, when the failure came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_only_for_server_messages() {
        let err = ServiceError::status(400, Some("No documents uploaded".to_string()));
        assert_eq!(err.detail(), Some("No documents uploaded"));
        assert_eq!(err.status_code(), Some(400));

        let err = ServiceError::transport("connection refused");
        assert_eq!(err.detail(), None);
        assert_eq!(err.status_code(), None);

        assert_eq!(ServiceError::status(502, None).to_string(), "HTTP 502: request failed");
    }
}
