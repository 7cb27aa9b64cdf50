//! Chat surface state types

use crate::model::Message;
use serde::Serialize;

/// Identifies one ask or fetch so late responses can be matched or discarded
pub type RequestId = u64;

/// Where the chat surface is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationPhase {
    /// Fresh, unsaved chat with nothing in it
    #[default]
    NewEmpty,

    /// User message appended, waiting for the answer
    NewPending { request: RequestId },

    /// Fetching the full detail of a selected summary
    ResumedLoading {
        conversation_id: String,
        request: RequestId,
    },

    /// Showing a conversation and accepting input
    ResumedReady,

    /// Last ask failed and its error message is shown; accepts input
    ErrorDisplayed,
}

impl ConversationPhase {
    /// Check if an ask or fetch is outstanding
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::NewPending { .. } | Self::ResumedLoading { .. })
    }

    /// Request id of the outstanding call, if any
    pub fn pending_request(&self) -> Option<RequestId> {
        match self {
            Self::NewPending { request } | Self::ResumedLoading { request, .. } => Some(*request),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NewEmpty => "new_empty",
            Self::NewPending { .. } => "new_pending",
            Self::ResumedLoading { .. } => "resumed_loading",
            Self::ResumedReady => "resumed_ready",
            Self::ErrorDisplayed => "error_displayed",
        }
    }
}

/// Full state of the chat surface, owned by the session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversationView {
    pub phase: ConversationPhase,
    /// `None` while the conversation has not been saved
    pub conversation_id: Option<String>,
    pub messages: Vec<Message>,
    /// Last request id handed out
    pub last_request: RequestId,
}

impl ConversationView {
    /// Phase to settle into when a background call leaves content as it was
    pub fn settled_phase(&self) -> ConversationPhase {
        if self.conversation_id.is_none() && self.messages.is_empty() {
            ConversationPhase::NewEmpty
        } else {
            ConversationPhase::ResumedReady
        }
    }

    pub fn snapshot(&self) -> ConversationViewState {
        ConversationViewState {
            conversation_id: self.conversation_id.clone(),
            messages: self.messages.clone(),
            is_loading_detail: matches!(self.phase, ConversationPhase::ResumedLoading { .. }),
            is_awaiting_answer: matches!(self.phase, ConversationPhase::NewPending { .. }),
        }
    }
}

/// Read-only snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConversationViewState {
    pub conversation_id: Option<String>,
    pub messages: Vec<Message>,
    pub is_loading_detail: bool,
    pub is_awaiting_answer: bool,
}

impl ConversationViewState {
    /// True for an unsaved chat with no messages
    pub fn is_blank(&self) -> bool {
        self.conversation_id.is_none() && self.messages.is_empty()
    }
}
