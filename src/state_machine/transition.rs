//! Pure state transition function
//!
//! Given the same view and event it always produces the same result; the
//! session performs the returned effects.

use super::resolve::{format_entries, SummaryContent};
use super::state::{ConversationPhase, ConversationView, RequestId};
use super::{Effect, Event};
use crate::model::Message;
use thiserror::Error;

/// Shown when a failed ask carries no message from the server
pub const ASK_FAILED_FALLBACK: &str =
    "Sorry, I encountered an error. Please make sure you have documents uploaded.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_view: ConversationView,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(view: ConversationView) -> Self {
        Self {
            new_view: view,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Events the current view refuses
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Question is blank")]
    BlankQuestion,
    #[error("A request is already in flight")]
    RequestInFlight,
    #[error("Response for request {0} is no longer awaited")]
    StaleResponse(RequestId),
}

/// Pure transition function
pub fn transition(
    view: &ConversationView,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (&view.phase, event) {
        // ============================================================
        // New chat
        // ============================================================
        (_, Event::NewChat) => Ok(TransitionResult::new(ConversationView {
            last_request: view.last_request,
            ..ConversationView::default()
        })),

        // ============================================================
        // Submitting a question
        // ============================================================
        (_, Event::Submit { question, .. }) if question.trim().is_empty() => {
            Err(TransitionError::BlankQuestion)
        }

        (ConversationPhase::NewPending { .. } | ConversationPhase::ResumedLoading { .. }, Event::Submit { .. }) => {
            Err(TransitionError::RequestInFlight)
        }

        // NewEmpty | ResumedReady | ErrorDisplayed: append optimistically
        (_, Event::Submit { question, timestamp }) => {
            let request = view.last_request + 1;
            let mut next = view.clone();
            next.messages.push(Message::user(question.clone(), timestamp));
            next.phase = ConversationPhase::NewPending { request };
            next.last_request = request;

            Ok(TransitionResult::new(next).with_effect(Effect::ask(
                request,
                question,
                view.conversation_id.is_none(),
            )))
        }

        (ConversationPhase::NewPending { request: awaited }, Event::AnswerReceived { request, reply, timestamp })
            if *awaited == request =>
        {
            let mut next = view.clone();
            next.messages.push(Message::from_reply(&reply, timestamp));
            if let Some(id) = reply.conversation_id.filter(|id| !id.is_empty()) {
                next.conversation_id = Some(id);
            }
            next.phase = ConversationPhase::ResumedReady;

            Ok(TransitionResult::new(next).with_effect(Effect::NotifyHistoryChanged))
        }

        // The user message stays; the error takes the answer's place
        (ConversationPhase::NewPending { request: awaited }, Event::AskFailed { request, error, timestamp })
            if *awaited == request =>
        {
            let content = error.detail().unwrap_or(ASK_FAILED_FALLBACK);
            let mut next = view.clone();
            next.messages.push(Message::error(content, timestamp));
            next.phase = ConversationPhase::ErrorDisplayed;

            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Selecting a history summary
        // ============================================================
        (ConversationPhase::ResumedLoading { conversation_id, .. }, Event::SelectSummary { summary })
            if *conversation_id == summary.id =>
        {
            Err(TransitionError::RequestInFlight)
        }

        (_, Event::SelectSummary { summary }) => match SummaryContent::classify(&summary) {
            SummaryContent::NeedsFetch(conversation_id) => {
                let request = view.last_request + 1;
                let mut next = view.clone();
                next.phase = ConversationPhase::ResumedLoading {
                    conversation_id: conversation_id.clone(),
                    request,
                };
                next.last_request = request;

                Ok(TransitionResult::new(next).with_effect(Effect::fetch_detail(request, conversation_id)))
            }
            content => Ok(TransitionResult::new(ConversationView {
                phase: ConversationPhase::ResumedReady,
                conversation_id: Some(summary.id).filter(|id| !id.trim().is_empty()),
                messages: content.format().unwrap_or_default(),
                last_request: view.last_request,
            })),
        },

        (ConversationPhase::ResumedLoading { conversation_id, request: awaited }, Event::DetailLoaded { request, detail })
            if *awaited == request =>
        {
            Ok(TransitionResult::new(ConversationView {
                phase: ConversationPhase::ResumedReady,
                conversation_id: Some(conversation_id.clone()),
                messages: format_entries(&detail.messages),
                last_request: view.last_request,
            }))
        }

        // Previous content stays on screen; nothing is appended
        (ConversationPhase::ResumedLoading { request: awaited, .. }, Event::DetailFailed { request, error })
            if *awaited == request =>
        {
            let mut next = view.clone();
            next.phase = view.settled_phase();

            Ok(TransitionResult::new(next)
                .with_effect(Effect::background_failure("get_conversation", error)))
        }

        // ============================================================
        // Responses nobody is waiting for
        // ============================================================
        (
            _,
            Event::AnswerReceived { request, .. }
            | Event::AskFailed { request, .. }
            | Event::DetailLoaded { request, .. }
            | Event::DetailFailed { request, .. },
        ) => Err(TransitionError::StaleResponse(request)),
    }
}
