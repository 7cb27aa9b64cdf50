//! Conversation data types shared by the state machine, history and service layers

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the active chat surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// ISO-8601 timestamp, as sent over the wire
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Server-side answer latency in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents_queried: Vec<String>,
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    pub fn user(content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: timestamp.into(),
            sources: vec![],
            response_time: None,
            documents_queried: vec![],
            is_error: false,
        }
    }

    pub fn assistant(content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            ..Self::user(content, timestamp)
        }
    }

    /// Assistant message built from a successful ask
    pub fn from_reply(reply: &AskReply, timestamp: impl Into<String>) -> Self {
        Self {
            sources: reply.sources.clone(),
            response_time: Some(reply.response_time),
            documents_queried: reply.documents_queried.clone(),
            ..Self::assistant(reply.answer.clone(), timestamp)
        }
    }

    /// Error-flagged assistant message rendered in place of an answer
    pub fn error(content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::assistant(content, timestamp)
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// One question/answer exchange inside a stored conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailEntry {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub response_time: Option<f64>,
}

impl DetailEntry {
    /// Expands the exchange into a user message followed by its answer
    pub fn to_messages(&self) -> [Message; 2] {
        let answer = Message {
            sources: self.sources.clone(),
            response_time: self.response_time,
            ..Message::assistant(self.answer.clone(), self.timestamp.clone())
        };
        [Message::user(self.question.clone(), self.timestamp.clone()), answer]
    }
}

/// Lightweight history listing record
///
/// Older records carry a single inline `answer`; newer ones may carry the
/// whole `messages` array. Records with neither need a detail fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Preview question shown in the sidebar
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<DetailEntry>>,
}

impl ConversationSummary {
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            timestamp: timestamp.into(),
            ..Self::default()
        }
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Full record of one stored conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationDetail {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Vec<DetailEntry>,
}

/// Body of an ask call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskRequest {
    pub question: String,
    pub document_ids: Option<Vec<String>>,
    /// Set when the chat surface has no saved conversation yet
    pub new_chat: bool,
}

/// Answer to an ask call
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AskReply {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub response_time: f64,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub documents_queried: Vec<String>,
}

/// Parse a wire timestamp.
///
/// Accepts RFC 3339. Timestamps without an offset are read as UTC, which is
/// how the backend stores them.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Format an instant the way the chat surface stamps new messages
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
