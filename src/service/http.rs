//! REST implementation of `ConversationService`

use super::{ConversationService, ServiceError};
use crate::config::ClientConfig;
use crate::model::{AskReply, AskRequest, ConversationDetail, ConversationSummary};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// Talks to the query API over HTTP
pub struct HttpConversationService {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpConversationService {
    pub fn new(config: &ClientConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and return the body of a successful response
    async fn send(&self, request: RequestBuilder) -> Result<String, ServiceError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                ServiceError::transport(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                ServiceError::transport(format!("Connection failed: {e}"))
            } else {
                ServiceError::transport(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ServiceError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

/// Map a non-success response to a `ServiceError`, keeping the API's `detail`
fn classify_error(status: StatusCode, body: &str) -> ServiceError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string));

    if status == StatusCode::NOT_FOUND {
        ServiceError::NotFound(detail.unwrap_or_default())
    } else {
        ServiceError::status(status.as_u16(), detail)
    }
}

#[async_trait]
impl ConversationService for HttpConversationService {
    async fn ask(&self, request: &AskRequest) -> Result<AskReply, ServiceError> {
        self.send_json(self.client.post(self.url("/query/ask")).json(request))
            .await
    }

    async fn get_conversation(&self, id: &str) -> Result<ConversationDetail, ServiceError> {
        self.send_json(self.client.get(self.url(&format!("/conversations/{id}"))))
            .await
    }

    async fn list_summaries(
        &self,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<ConversationSummary>, ServiceError> {
        self.send_json(
            self.client
                .get(self.url("/history/"))
                .query(&[("limit", limit), ("skip", skip)]),
        )
        .await
    }

    async fn delete_summary(&self, id: &str) -> Result<(), ServiceError> {
        self.send(self.client.delete(self.url(&format!("/history/{id}"))))
            .await
            .map(|_| ())
    }

    async fn search_summaries(&self, query: &str) -> Result<Vec<ConversationSummary>, ServiceError> {
        self.send_json(
            self.client
                .get(self.url("/history/search"))
                .query(&[("q", query)]),
        )
        .await
    }

    async fn clear_summaries(&self) -> Result<(), ServiceError> {
        self.send(self.client.delete(self.url("/history/")))
            .await
            .map(|_| ())
    }
}
