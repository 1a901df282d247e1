mod common;

use common::*;
use fomo::models::{ApprovalStatus, Role, ToolCallStatus, Usage};
use fomo::state::{ConnectionState, SessionAggregator};
use fomo::websocket::{InboundEvent, SocketNotice};

fn apply_frames(aggregator: &mut SessionAggregator, frames: &[String]) {
    for frame in frames {
        let event = InboundEvent::from_frame(frame).unwrap();
        aggregator.apply(&event);
    }
}

#[test]
fn test_hello_scenario() {
    let mut aggregator = SessionAggregator::new();
    apply_frames(
        &mut aggregator,
        &[
            auth_success_frame(),
            delta_frame("Hel"),
            delta_frame("lo"),
            complete_frame("m1", 5, 3, 0.002, Some("t1")),
        ],
    );

    assert_eq!(aggregator.messages().len(), 1);
    let message = &aggregator.messages()[0];
    assert_eq!(message.id, "m1");
    assert_eq!(message.role, Role::Assistant);
    assert_eq!(message.content, "Hello");
    assert!(message.tool_calls.is_empty());
    assert!(message.approval.is_none());
    assert_eq!(aggregator.usage(), Usage::new(5, 3, 0.002));
    assert_eq!(aggregator.current_message(), "");
    assert!(!aggregator.is_streaming());
}

#[test]
fn test_second_approval_wins() {
    let mut aggregator = SessionAggregator::new();
    apply_frames(
        &mut aggregator,
        &[
            approval_frame("a1", "bash"),
            approval_frame("a2", "write_file"),
            complete_frame("m1", 0, 0, 0.0, None),
        ],
    );

    let approval = aggregator.messages()[0].approval.as_ref().unwrap();
    assert_eq!(approval.id, "a2");
    assert_eq!(approval.tool, "write_file");
    assert_eq!(approval.status, ApprovalStatus::Pending);
    assert!(aggregator.pending_approval().is_none());
}

#[test]
fn test_turn_with_tools() {
    let mut aggregator = SessionAggregator::new();
    apply_frames(
        &mut aggregator,
        &[
            session_created_frame("s1"),
            delta_frame("Looking"),
            tool_start_frame("t1", "read_file"),
            tool_start_frame("t2", "bash"),
            tool_complete_frame("t2", false),
            tool_complete_frame("unknown", true),
        ],
    );

    assert_eq!(aggregator.session_id(), Some("s1"));
    assert_eq!(aggregator.tool_calls().len(), 2);
    let pending: Vec<&str> = aggregator
        .pending_tool_calls()
        .map(|call| call.id.as_str())
        .collect();
    assert_eq!(pending, vec!["t1"]);

    apply_frames(&mut aggregator, &[complete_frame("m1", 1, 1, 0.0, None)]);
    let calls = &aggregator.messages()[0].tool_calls;
    assert_eq!(calls[0].id, "t1");
    assert_eq!(calls[0].status, ToolCallStatus::Pending);
    assert_eq!(calls[1].status, ToolCallStatus::Error);
    assert_eq!(calls[1].duration_ms, Some(12));
    assert!(aggregator.tool_calls().is_empty());
}

#[test]
fn test_usage_accumulates_across_turns() {
    let mut aggregator = SessionAggregator::new();
    apply_frames(
        &mut aggregator,
        &[
            delta_frame("one"),
            complete_frame("m1", 5, 3, 0.002, None),
            delta_frame("two"),
            complete_frame("m2", 7, 1, 0.003, None),
        ],
    );

    let usage = aggregator.usage();
    assert_eq!(usage.input_tokens, 12);
    assert_eq!(usage.output_tokens, 4);
    assert!((usage.cost_usd - 0.005).abs() < 1e-9);
    assert_eq!(aggregator.messages()[1].content, "two");
}

#[tokio::test]
async fn test_chat_client_hello_scenario() {
    let (mut chat, connector) = TestChatBuilder::new().build();
    chat.connect();
    assert_eq!(next_notice(&mut chat).await, Some(SocketNotice::Opened));

    for frame in [
        auth_success_frame(),
        delta_frame("Hel"),
        delta_frame("lo"),
        complete_frame("m1", 5, 3, 0.002, Some("t1")),
    ] {
        connector.push_frame(&frame);
        assert!(matches!(
            next_notice(&mut chat).await,
            Some(SocketNotice::Event(_))
        ));
    }

    assert_eq!(chat.connection_state(), ConnectionState::Connected);
    assert_eq!(chat.messages().len(), 1);
    assert_eq!(chat.messages()[0].content, "Hello");
    assert_eq!(chat.usage(), Usage::new(5, 3, 0.002));
    assert_eq!(chat.events().len(), 4);
}

#[tokio::test]
async fn test_clear_chat_resets_everything_but_connection() {
    let (mut chat, connector) = TestChatBuilder::new().build();
    chat.connect();
    next_notice(&mut chat).await;

    connector.push_frame(&auth_success_frame());
    connector.push_frame(&session_created_frame("s1"));
    connector.push_frame(&delta_frame("partial"));
    for _ in 0..3 {
        next_notice(&mut chat).await;
    }
    chat.send("hi");
    assert!(chat.is_streaming());

    chat.clear_chat();

    assert!(chat.messages().is_empty());
    assert_eq!(chat.current_message(), "");
    assert!(chat.usage().is_zero());
    assert!(!chat.is_streaming());
    assert!(chat.session_id().is_none());
    assert_eq!(chat.connection_state(), ConnectionState::Connected);
    assert_eq!(chat.events().len(), 3);
}
