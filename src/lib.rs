//! Docuchat client - conversation state and history for document Q&A
//!
//! The chat surface is driven by a pure state machine (`state_machine`)
//! whose effects are executed by a `session::ChatSession` against a
//! `service::ConversationService`. The history sidebar lives in `history`.

pub mod config;
pub mod history;
pub mod model;
pub mod service;
pub mod session;
pub mod state_machine;
