//! Mock conversation service for testing
//!
//! Responses are queued per operation; every call is recorded.

use super::{ConversationService, ServiceError};
use crate::model::{AskReply, AskRequest, ConversationDetail, ConversationSummary};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// Holds detail fetches in flight until the test releases them
#[derive(Default)]
struct Gate {
    enabled: AtomicBool,
    started: Notify,
    release: Notify,
}

impl Gate {
    async fn pass(&self) {
        if self.enabled.load(Ordering::SeqCst) {
            self.started.notify_one();
            self.release.notified().await;
        }
    }
}

#[derive(Default)]
pub struct MockConversationService {
    asks: Mutex<VecDeque<Result<AskReply, ServiceError>>>,
    details: Mutex<VecDeque<Result<ConversationDetail, ServiceError>>>,
    summaries: Mutex<VecDeque<Result<Vec<ConversationSummary>, ServiceError>>>,
    deletes: Mutex<VecDeque<Result<(), ServiceError>>>,
    searches: Mutex<VecDeque<Result<Vec<ConversationSummary>, ServiceError>>>,
    clears: Mutex<VecDeque<Result<(), ServiceError>>>,
    fetch_gate: Gate,
    ask_requests: Mutex<Vec<AskRequest>>,
    /// Ids passed to `get_conversation`
    fetched_ids: Mutex<Vec<String>>,
    list_calls: Mutex<Vec<(u32, u32)>>,
    deleted_ids: Mutex<Vec<String>>,
    search_queries: Mutex<Vec<String>>,
    clear_calls: AtomicUsize,
}

impl MockConversationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_ask(&self, result: Result<AskReply, ServiceError>) {
        self.asks.lock().unwrap().push_back(result);
    }

    /// Queue a plain successful answer
    pub fn queue_answer(&self, answer: &str, conversation_id: Option<&str>) {
        self.queue_ask(Ok(AskReply {
            answer: answer.to_string(),
            sources: vec!["handbook.pdf".to_string()],
            response_time: 1.25,
            conversation_id: conversation_id.map(str::to_string),
            documents_queried: vec!["handbook.pdf".to_string()],
        }));
    }

    pub fn queue_detail(&self, result: Result<ConversationDetail, ServiceError>) {
        self.details.lock().unwrap().push_back(result);
    }

    pub fn queue_summaries(&self, result: Result<Vec<ConversationSummary>, ServiceError>) {
        self.summaries.lock().unwrap().push_back(result);
    }

    pub fn queue_delete(&self, result: Result<(), ServiceError>) {
        self.deletes.lock().unwrap().push_back(result);
    }

    pub fn queue_search(&self, result: Result<Vec<ConversationSummary>, ServiceError>) {
        self.searches.lock().unwrap().push_back(result);
    }

    pub fn queue_clear(&self, result: Result<(), ServiceError>) {
        self.clears.lock().unwrap().push_back(result);
    }

    /// Make `get_conversation` wait for `release_fetch`
    pub fn hold_fetches(&self) {
        self.fetch_gate.enabled.store(true, Ordering::SeqCst);
    }

    pub async fn fetch_started(&self) {
        self.fetch_gate.started.notified().await;
    }

    pub fn release_fetch(&self) {
        self.fetch_gate.release.notify_one();
    }

    pub fn recorded_asks(&self) -> Vec<AskRequest> {
        self.ask_requests.lock().unwrap().clone()
    }

    pub fn recorded_fetches(&self) -> Vec<String> {
        self.fetched_ids.lock().unwrap().clone()
    }

    pub fn recorded_list_calls(&self) -> Vec<(u32, u32)> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn recorded_deletes(&self) -> Vec<String> {
        self.deleted_ids.lock().unwrap().clone()
    }

    pub fn recorded_searches(&self) -> Vec<String> {
        self.search_queries.lock().unwrap().clone()
    }

    pub fn clear_count(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }
}

fn nothing_queued(operation: &str) -> ServiceError {
    ServiceError::transport(format!("No mock {operation} response queued"))
}

#[async_trait]
impl ConversationService for MockConversationService {
    async fn ask(&self, request: &AskRequest) -> Result<AskReply, ServiceError> {
        self.ask_requests.lock().unwrap().push(request.clone());
        self.asks
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(nothing_queued("ask")))
    }

    async fn get_conversation(&self, id: &str) -> Result<ConversationDetail, ServiceError> {
        self.fetched_ids.lock().unwrap().push(id.to_string());
        self.fetch_gate.pass().await;
        self.details
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(nothing_queued("detail")))
    }

    async fn list_summaries(
        &self,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<ConversationSummary>, ServiceError> {
        self.list_calls.lock().unwrap().push((limit, skip));
        self.summaries
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(nothing_queued("summaries")))
    }

    async fn delete_summary(&self, id: &str) -> Result<(), ServiceError> {
        self.deleted_ids.lock().unwrap().push(id.to_string());
        self.deletes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(nothing_queued("delete")))
    }

    async fn search_summaries(&self, query: &str) -> Result<Vec<ConversationSummary>, ServiceError> {
        self.search_queries.lock().unwrap().push(query.to_string());
        self.searches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(nothing_queued("search")))
    }

    async fn clear_summaries(&self) -> Result<(), ServiceError> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        self.clears
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(nothing_queued("clear")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_pops_queued_responses_in_order() {
        let mock = MockConversationService::new();
        mock.queue_answer("first", Some("c1"));
        mock.queue_ask(Err(ServiceError::status(500, None)));

        let request = AskRequest {
            question: "q".to_string(),
            document_ids: None,
            new_chat: true,
        };
        assert_eq!(mock.ask(&request).await.unwrap().answer, "first");
        assert!(mock.ask(&request).await.is_err());
        // Nothing left
        assert!(mock.ask(&request).await.is_err());
        assert_eq!(mock.recorded_asks().len(), 3);
    }
}
