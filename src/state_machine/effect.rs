//! Effects produced by state transitions

use super::state::RequestId;
use crate::service::ServiceError;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a question to the service
    Ask {
        request: RequestId,
        question: String,
        /// No conversation has been saved for this surface yet
        new_chat: bool,
    },

    /// Fetch the full detail of a conversation
    FetchDetail {
        request: RequestId,
        conversation_id: String,
    },

    /// Tell subscribers the history listing is out of date
    NotifyHistoryChanged,

    /// Surface a failed background call without touching the messages
    ReportBackgroundFailure {
        operation: &'static str,
        error: ServiceError,
    },
}

impl Effect {
    pub fn ask(request: RequestId, question: impl Into<String>, new_chat: bool) -> Self {
        Effect::Ask {
            request,
            question: question.into(),
            new_chat,
        }
    }

    pub fn fetch_detail(request: RequestId, conversation_id: impl Into<String>) -> Self {
        Effect::FetchDetail {
            request,
            conversation_id: conversation_id.into(),
        }
    }

    pub fn background_failure(operation: &'static str, error: ServiceError) -> Self {
        Effect::ReportBackgroundFailure { operation, error }
    }
}
