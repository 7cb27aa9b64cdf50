//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::state::*;
use super::transition::*;
use super::*;
use crate::model::{AskReply, ConversationDetail, ConversationSummary, DetailEntry, Role};
use crate::service::ServiceError;
use proptest::prelude::*;

const TS: &str = "2024-03-05T10:30:00.000Z";

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_detail_entry() -> impl Strategy<Value = DetailEntry> {
    ("[a-zA-Z ?]{1,20}", "[a-zA-Z .]{1,30}").prop_map(|(question, answer)| DetailEntry {
        question,
        answer,
        sources: vec![],
        timestamp: TS.to_string(),
        response_time: None,
    })
}

/// Summaries with a non-blank id in each of the historical shapes
fn arb_summary() -> impl Strategy<Value = ConversationSummary> {
    (
        "c[0-9]{1,3}",
        proptest::option::of(proptest::collection::vec(arb_detail_entry(), 0..4)),
        proptest::option::of("[a-zA-Z ]{1,20}"),
    )
        .prop_map(|(id, messages, answer)| ConversationSummary {
            answer,
            messages,
            ..ConversationSummary::new(id, "preview", TS)
        })
}

fn arb_service_error() -> impl Strategy<Value = ServiceError> {
    prop_oneof![
        "[a-z ]{0,10}".prop_map(ServiceError::NotFound),
        (400u16..600, proptest::option::of("[a-zA-Z ]{1,20}"))
            .prop_map(|(status, detail)| ServiceError::status(status, detail)),
        "[a-z ]{1,10}".prop_map(ServiceError::transport),
    ]
}

fn arb_reply() -> impl Strategy<Value = AskReply> {
    ("[a-zA-Z ]{1,30}", proptest::option::of("c[0-9]{1,3}")).prop_map(|(answer, conversation_id)| {
        AskReply {
            answer,
            sources: vec![],
            response_time: 1.0,
            conversation_id,
            documents_queried: vec![],
        }
    })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::NewChat),
        "[a-zA-Z ]{0,20}".prop_map(|question| Event::Submit {
            question,
            timestamp: TS.to_string(),
        }),
        arb_summary().prop_map(|summary| Event::SelectSummary { summary }),
        (0u64..8, arb_reply()).prop_map(|(request, reply)| Event::AnswerReceived {
            request,
            reply,
            timestamp: TS.to_string(),
        }),
        (0u64..8, arb_service_error()).prop_map(|(request, error)| Event::AskFailed {
            request,
            error,
            timestamp: TS.to_string(),
        }),
        (0u64..8, proptest::collection::vec(arb_detail_entry(), 0..4)).prop_map(
            |(request, messages)| Event::DetailLoaded {
                request,
                detail: ConversationDetail {
                    id: "ignored".to_string(),
                    title: None,
                    messages,
                },
            }
        ),
        (0u64..8, arb_service_error()).prop_map(|(request, error)| Event::DetailFailed { request, error }),
    ]
}

// ============================================================================
// Validity Checkers
// ============================================================================

/// Every assistant message directly follows the user message it answers
fn messages_are_paired(view: &ConversationView) -> bool {
    view.messages.iter().enumerate().all(|(i, m)| match m.role {
        Role::User => true,
        Role::Assistant => i > 0 && view.messages[i - 1].is_user(),
    })
}

fn is_response(event: &Event) -> bool {
    matches!(
        event,
        Event::AnswerReceived { .. }
            | Event::AskFailed { .. }
            | Event::DetailLoaded { .. }
            | Event::DetailFailed { .. }
    )
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: message ordering survives any event sequence
    #[test]
    fn prop_transitions_keep_messages_paired(events in proptest::collection::vec(arb_event(), 0..25)) {
        let mut view = ConversationView::default();
        for event in events {
            if let Ok(result) = transition(&view, event) {
                view = result.new_view;
                prop_assert!(messages_are_paired(&view), "Unpaired messages: {:?}", view.messages);
            }
        }
    }

    // Invariant 2: rejected events never change anything (the caller keeps the old view)
    // and responses never drop an adopted conversation id
    #[test]
    fn prop_responses_never_revert_adopted_id(events in proptest::collection::vec(arb_event(), 0..25)) {
        let mut view = ConversationView::default();
        for event in events {
            let response = is_response(&event);
            let before = view.conversation_id.clone();
            if let Ok(result) = transition(&view, event) {
                if response && before.is_some() {
                    prop_assert!(result.new_view.conversation_id.is_some());
                }
                view = result.new_view;
            }
        }
    }

    // Invariant 3: request ids never go backwards, so stale responses stay stale
    #[test]
    fn prop_request_ids_monotonic(events in proptest::collection::vec(arb_event(), 0..25)) {
        let mut view = ConversationView::default();
        for event in events {
            if let Ok(result) = transition(&view, event) {
                prop_assert!(result.new_view.last_request >= view.last_request);
                if let Some(pending) = result.new_view.phase.pending_request() {
                    prop_assert_eq!(pending, result.new_view.last_request);
                }
                view = result.new_view;
            }
        }
    }

    // Invariant 4: blank questions are always rejected
    #[test]
    fn prop_blank_submit_rejected(
        blank in "[ \t\n]{0,5}",
        events in proptest::collection::vec(arb_event(), 0..10)
    ) {
        let mut view = ConversationView::default();
        for event in events {
            if let Ok(result) = transition(&view, event) {
                view = result.new_view;
            }
        }
        let result = transition(&view, Event::Submit { question: blank, timestamp: TS.to_string() });
        prop_assert_eq!(result.unwrap_err(), TransitionError::BlankQuestion);
    }

    // Invariant 5: a successful ask adds exactly the user message and its answer
    #[test]
    fn prop_successful_ask_adds_two(question in "[a-zA-Z]{1,20}", reply in arb_reply()) {
        let view = ConversationView::default();
        let pending = transition(&view, Event::Submit { question, timestamp: TS.to_string() })
            .unwrap()
            .new_view;
        let request = pending.last_request;
        let done = transition(&pending, Event::AnswerReceived {
            request,
            reply: reply.clone(),
            timestamp: TS.to_string(),
        })
        .unwrap()
        .new_view;

        prop_assert_eq!(done.messages.len(), view.messages.len() + 2);
        prop_assert_eq!(done.conversation_id, reply.conversation_id);
    }

    // Invariant 6: new chat always yields an empty unsaved view
    #[test]
    fn prop_new_chat_always_resets(events in proptest::collection::vec(arb_event(), 0..20)) {
        let mut view = ConversationView::default();
        for event in events {
            if let Ok(result) = transition(&view, event) {
                view = result.new_view;
            }
        }
        let reset = transition(&view, Event::NewChat).unwrap().new_view;
        prop_assert_eq!(reset.phase, ConversationPhase::NewEmpty);
        prop_assert!(reset.conversation_id.is_none());
        prop_assert!(reset.messages.is_empty());
    }
}
