//! Resolving a selected history summary into chat messages
//!
//! History records come in several historical shapes. Each shape is a
//! variant of `SummaryContent` with its own formatting rule.

use crate::model::{ConversationSummary, DetailEntry, Message};

/// What a summary carries, in resolution priority order
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryContent {
    /// Non-empty inline `messages` array
    InlineMessages(Vec<DetailEntry>),
    /// Single inline question/answer pair
    LegacyQa(DetailEntry),
    /// Nothing inline; the detail must be fetched by id
    NeedsFetch(String),
    /// Nothing inline and no id to fetch by
    Empty,
}

impl SummaryContent {
    pub fn classify(summary: &ConversationSummary) -> Self {
        if let Some(entries) = summary.messages.as_ref().filter(|m| !m.is_empty()) {
            return Self::InlineMessages(entries.clone());
        }

        if let Some(answer) = &summary.answer {
            return Self::LegacyQa(DetailEntry {
                question: summary.question.clone(),
                answer: answer.clone(),
                sources: summary.sources.clone(),
                timestamp: summary.timestamp.clone(),
                response_time: summary.response_time,
            });
        }

        if summary.id.trim().is_empty() {
            Self::Empty
        } else {
            Self::NeedsFetch(summary.id.clone())
        }
    }

    /// Messages available without a fetch; `None` for `NeedsFetch`
    pub fn format(&self) -> Option<Vec<Message>> {
        match self {
            Self::InlineMessages(entries) => Some(format_entries(entries)),
            Self::LegacyQa(entry) => Some(entry.to_messages().to_vec()),
            Self::NeedsFetch(_) => None,
            Self::Empty => Some(vec![]),
        }
    }
}

/// One user message then one assistant message per entry
pub fn format_entries(entries: &[DetailEntry]) -> Vec<Message> {
    entries.iter().flat_map(DetailEntry::to_messages).collect()
}
