//! Chat surface state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `transition` maps the current view and an event to a new view plus the
//! effects the session must carry out.

mod effect;
pub mod event;
pub mod resolve;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use resolve::SummaryContent;
pub use state::{ConversationPhase, ConversationView, ConversationViewState, RequestId};
pub use transition::{transition, TransitionError, TransitionResult, ASK_FAILED_FALLBACK};
