//! Conversation history: age buckets, relative labels, and the sidebar model

mod bucket;
mod label;
mod panel;

pub use bucket::{bucket, classify, recent_window, Bucket, HistoryGroups};
pub use label::relative_label;
pub use panel::HistoryPanel;
