//! Conversation service abstraction
//!
//! The chat surface never performs I/O itself; everything goes through a
//! `ConversationService`.

mod error;
pub mod http;

#[cfg(test)]
pub mod testing;

pub use error::ServiceError;
pub use http::HttpConversationService;

use crate::model::{AskReply, AskRequest, ConversationDetail, ConversationSummary};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Remote operations the chat surface depends on
#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Ask a question against the user's documents
    async fn ask(&self, request: &AskRequest) -> Result<AskReply, ServiceError>;

    /// Fetch the full message history of one conversation
    async fn get_conversation(&self, id: &str) -> Result<ConversationDetail, ServiceError>;

    /// List history summaries, newest first
    async fn list_summaries(
        &self,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<ConversationSummary>, ServiceError>;

    /// Delete one history entry
    async fn delete_summary(&self, id: &str) -> Result<(), ServiceError>;

    /// Case-insensitive match on question or answer, newest first
    async fn search_summaries(&self, query: &str) -> Result<Vec<ConversationSummary>, ServiceError>;

    /// Delete every history entry
    async fn clear_summaries(&self) -> Result<(), ServiceError>;
}

#[async_trait]
impl<T: ConversationService + ?Sized> ConversationService for Arc<T> {
    async fn ask(&self, request: &AskRequest) -> Result<AskReply, ServiceError> {
        (**self).ask(request).await
    }

    async fn get_conversation(&self, id: &str) -> Result<ConversationDetail, ServiceError> {
        (**self).get_conversation(id).await
    }

    async fn list_summaries(
        &self,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<ConversationSummary>, ServiceError> {
        (**self).list_summaries(limit, skip).await
    }

    async fn delete_summary(&self, id: &str) -> Result<(), ServiceError> {
        (**self).delete_summary(id).await
    }

    async fn search_summaries(&self, query: &str) -> Result<Vec<ConversationSummary>, ServiceError> {
        (**self).search_summaries(query).await
    }

    async fn clear_summaries(&self) -> Result<(), ServiceError> {
        (**self).clear_summaries().await
    }
}

/// Logging wrapper for conversation services
pub struct LoggingService<S> {
    inner: S,
}

impl<S: ConversationService> LoggingService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

fn log_outcome<T>(operation: &'static str, started: Instant, result: &Result<T, ServiceError>) {
    let duration_ms = started.elapsed().as_millis();
    match result {
        Ok(_) => tracing::info!(operation, %duration_ms, "Service call completed"),
        Err(e) => tracing::warn!(
            operation,
            %duration_ms,
            status = ?e.status_code(),
            error = %e,
            "Service call failed"
        ),
    }
}

#[async_trait]
impl<S: ConversationService> ConversationService for LoggingService<S> {
    async fn ask(&self, request: &AskRequest) -> Result<AskReply, ServiceError> {
        let started = Instant::now();
        let result = self.inner.ask(request).await;
        log_outcome("ask", started, &result);
        if let Ok(reply) = &result {
            tracing::debug!(
                sources = reply.sources.len(),
                conversation_id = ?reply.conversation_id,
                new_chat = request.new_chat,
                "Answer received"
            );
        }
        result
    }

    async fn get_conversation(&self, id: &str) -> Result<ConversationDetail, ServiceError> {
        let started = Instant::now();
        let result = self.inner.get_conversation(id).await;
        log_outcome("get_conversation", started, &result);
        result
    }

    async fn list_summaries(
        &self,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<ConversationSummary>, ServiceError> {
        let started = Instant::now();
        let result = self.inner.list_summaries(limit, skip).await;
        log_outcome("list_summaries", started, &result);
        result
    }

    async fn delete_summary(&self, id: &str) -> Result<(), ServiceError> {
        let started = Instant::now();
        let result = self.inner.delete_summary(id).await;
        log_outcome("delete_summary", started, &result);
        result
    }

    async fn search_summaries(&self, query: &str) -> Result<Vec<ConversationSummary>, ServiceError> {
        let started = Instant::now();
        let result = self.inner.search_summaries(query).await;
        log_outcome("search_summaries", started, &result);
        if let Ok(found) = &result {
            tracing::debug!(query, matches = found.len(), "History search finished");
        }
        result
    }

    async fn clear_summaries(&self) -> Result<(), ServiceError> {
        let started = Instant::now();
        let result = self.inner.clear_summaries().await;
        log_outcome("clear_summaries", started, &result);
        result
    }
}
