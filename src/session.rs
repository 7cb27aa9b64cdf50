//! Chat session: runs transitions and executes their effects
//!
//! The view lives behind a mutex that is only held while a transition is
//! applied, never across a service call. Concurrent submits are rejected by
//! the state machine rather than queued. Effects run on spawned tasks, so a
//! caller that stops waiting never leaves the surface stuck mid-request.

use crate::model::{format_timestamp, AskRequest, ConversationSummary};
use crate::service::{ConversationService, ServiceError};
use crate::state_machine::{
    transition, ConversationView, ConversationViewState, Effect, Event, TransitionError,
};
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const NOTICE_CAPACITY: usize = 32;

/// Signals published to other surfaces (the history sidebar, toasts, logs)
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    /// The history listing is out of date
    HistoryChanged,
    /// A detail fetch or delete failed; the chat view was left as it was
    BackgroundFailure {
        operation: &'static str,
        error: ServiceError,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Rejected: {0}")]
    Rejected(#[from] TransitionError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Effect task failed: {0}")]
    Task(String),
}

impl SessionError {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// The active chat surface
pub struct ChatSession<S> {
    service: S,
    view: Mutex<ConversationView>,
    notices: broadcast::Sender<SessionNotice>,
    /// Restrict asks to these documents; `None` queries everything
    document_ids: Option<Vec<String>>,
}

impl<S: ConversationService + 'static> ChatSession<S> {
    pub fn new(service: S) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            service,
            view: Mutex::new(ConversationView::default()),
            notices,
            document_ids: None,
        }
    }

    pub fn with_documents(mut self, document_ids: Vec<String>) -> Self {
        self.document_ids = Some(document_ids);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotice> {
        self.notices.subscribe()
    }

    /// Latest settled snapshot
    pub fn state(&self) -> ConversationViewState {
        self.lock().snapshot()
    }

    /// Start a new, unsaved chat
    pub fn reset(&self) -> ConversationViewState {
        if let Err(e) = self.apply(Event::NewChat) {
            tracing::warn!(error = %e, "New chat rejected");
        }
        self.state()
    }

    /// Submit a question.
    ///
    /// Blank questions and submits while a request is in flight are rejected
    /// immediately. Otherwise the user message is already part of `state()`
    /// when this returns. The ask runs on its own task; the handle resolves
    /// once the answer (or the error message standing in for it) has been
    /// appended, and dropping it does not cancel the ask.
    pub fn submit(
        self: &Arc<Self>,
        question: impl Into<String>,
    ) -> Result<JoinHandle<ConversationViewState>, SessionError> {
        let effects = self.apply(Event::Submit {
            question: question.into(),
            timestamp: format_timestamp(Utc::now()),
        })?;

        let session = Arc::clone(self);
        Ok(tokio::spawn(async move {
            // Ask failures end up in the message list, not here
            if let Err(e) = session.run_effects(effects).await {
                tracing::debug!(error = %e, "Background failure while answering");
            }
            session.state()
        }))
    }

    /// Show a past conversation.
    ///
    /// On a failed detail fetch the previous view is kept and the error is
    /// returned (and published) without being added to the messages.
    pub async fn select_summary(
        self: &Arc<Self>,
        summary: &ConversationSummary,
    ) -> Result<ConversationViewState, SessionError> {
        tracing::info!(conversation_id = %summary.id, "Selecting history summary");
        let effects = self.apply(Event::SelectSummary {
            summary: summary.clone(),
        })?;

        let session = Arc::clone(self);
        tokio::spawn(async move { session.run_effects(effects).await })
            .await
            .map_err(|e| SessionError::Task(e.to_string()))??;
        Ok(self.state())
    }

    /// Delete a history entry. The active view is not touched.
    pub async fn delete_summary(&self, id: &str) -> Result<(), SessionError> {
        let result = self.service.delete_summary(id).await;
        if result.is_ok() {
            tracing::info!(conversation_id = %id, "History entry deleted");
        }
        self.finish_history_change("delete_summary", result)
    }

    /// Delete all history. The active view is not touched.
    pub async fn clear_history(&self) -> Result<(), SessionError> {
        let result = self.service.clear_summaries().await;
        if result.is_ok() {
            tracing::info!("History cleared");
        }
        self.finish_history_change("clear_summaries", result)
    }

    fn finish_history_change(
        &self,
        operation: &'static str,
        result: Result<(), ServiceError>,
    ) -> Result<(), SessionError> {
        match result {
            Ok(()) => {
                self.publish(SessionNotice::HistoryChanged);
                Ok(())
            }
            Err(error) => {
                self.report_failure(operation, error.clone());
                Err(error.into())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConversationView> {
        // A panic mid-transition cannot leave a half-written view: transitions
        // build the next view before it is stored
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one event atomically and return the effects to run
    fn apply(&self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let mut view = self.lock();
        let result = transition(&view, event)?;
        if result.new_view.phase != view.phase {
            tracing::debug!(
                from = view.phase.name(),
                to = result.new_view.phase.name(),
                "Conversation phase changed"
            );
        }
        *view = result.new_view;
        Ok(result.effects)
    }

    /// Execute effects, feeding service responses back through `transition`.
    ///
    /// Returns the first background failure reported along the way.
    async fn run_effects(&self, effects: Vec<Effect>) -> Result<(), ServiceError> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut failure = None;

        while let Some(effect) = queue.pop_front() {
            if let Effect::ReportBackgroundFailure { error, .. } = &effect {
                failure.get_or_insert_with(|| error.clone());
            }

            let Some(event) = self.execute_effect(effect).await else {
                continue;
            };
            let answered = matches!(event, Event::AnswerReceived { .. });
            match self.apply(event) {
                Ok(more) => queue.extend(more),
                Err(TransitionError::StaleResponse(request)) => {
                    tracing::debug!(request, "Discarding stale response");
                    // The exchange is stored server-side even though it is no longer shown
                    if answered {
                        self.publish(SessionNotice::HistoryChanged);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Response rejected by state machine"),
            }
        }

        failure.map_or(Ok(()), Err)
    }

    async fn execute_effect(&self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::Ask {
                request,
                question,
                new_chat,
            } => {
                let body = AskRequest {
                    question,
                    document_ids: self.document_ids.clone(),
                    new_chat,
                };
                let result = self.service.ask(&body).await;
                let timestamp = format_timestamp(Utc::now());
                Some(match result {
                    Ok(reply) => Event::AnswerReceived {
                        request,
                        reply,
                        timestamp,
                    },
                    Err(error) => {
                        tracing::warn!(request, error = %error, "Ask failed");
                        Event::AskFailed {
                            request,
                            error,
                            timestamp,
                        }
                    }
                })
            }

            Effect::FetchDetail {
                request,
                conversation_id,
            } => Some(match self.service.get_conversation(&conversation_id).await {
                Ok(detail) => Event::DetailLoaded { request, detail },
                Err(error) => Event::DetailFailed { request, error },
            }),

            Effect::NotifyHistoryChanged => {
                self.publish(SessionNotice::HistoryChanged);
                None
            }

            Effect::ReportBackgroundFailure { operation, error } => {
                self.report_failure(operation, error);
                None
            }
        }
    }

    fn report_failure(&self, operation: &'static str, error: ServiceError) {
        tracing::error!(operation, error = %error, "Background operation failed");
        self.publish(SessionNotice::BackgroundFailure { operation, error });
    }

    fn publish(&self, notice: SessionNotice) {
        // No subscribers is fine
        let _ = self.notices.send(notice);
    }
}
