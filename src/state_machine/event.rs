//! Events that can occur on the chat surface

use super::state::RequestId;
use crate::model::{AskReply, ConversationDetail, ConversationSummary};
use crate::service::ServiceError;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    NewChat,
    Submit {
        question: String,
        timestamp: String,
    },
    SelectSummary {
        summary: ConversationSummary,
    },

    // Service events
    AnswerReceived {
        request: RequestId,
        reply: AskReply,
        timestamp: String,
    },
    AskFailed {
        request: RequestId,
        error: ServiceError,
        timestamp: String,
    },
    DetailLoaded {
        request: RequestId,
        detail: ConversationDetail,
    },
    DetailFailed {
        request: RequestId,
        error: ServiceError,
    },
}
