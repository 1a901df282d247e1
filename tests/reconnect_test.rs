mod common;

use common::*;
use fomo::state::ConnectionState;
use fomo::websocket::{CloseDecision, InboundEvent, OutboundCommand, SocketNotice};

#[tokio::test]
async fn test_three_drops_within_budget() {
    let (mut chat, connector) = TestChatBuilder::new().max_attempts(5).build();
    chat.connect();
    assert_eq!(next_notice(&mut chat).await, Some(SocketNotice::Opened));

    let mut reconnecting = Vec::new();
    for expected in 1..=3 {
        assert!(connector.drop_connection());
        assert_eq!(
            next_notice(&mut chat).await,
            Some(SocketNotice::Closed {
                clean: false,
                decision: CloseDecision::Scheduled { attempt: expected }
            })
        );
        match next_notice(&mut chat).await {
            Some(SocketNotice::Reconnecting { attempt }) => reconnecting.push(attempt),
            other => panic!("expected Reconnecting, got {:?}", other),
        }
        assert_eq!(chat.connection_state(), ConnectionState::Connecting);
        assert_eq!(next_notice(&mut chat).await, Some(SocketNotice::Opened));
        assert_eq!(next_notice(&mut chat).await, Some(SocketNotice::Reconnected));
    }

    assert_eq!(reconnecting, vec![1, 2, 3]);
    assert_eq!(connector.connection_count(), 4);
    assert_eq!(chat.reconnect_attempts(), 3);

    // Still usable after the third reopen
    connector.push_event(InboundEvent::AuthSuccess);
    next_notice(&mut chat).await;
    assert_eq!(chat.connection_state(), ConnectionState::Connected);

    connector.clear_sent();
    chat.send("still here");
    chat.approve("a1", None);
    assert_eq!(
        connector.sent_commands(),
        vec![
            OutboundCommand::SendMessage {
                content: "still here".to_string()
            },
            OutboundCommand::approve("a1", None),
        ]
    );
}

#[tokio::test]
async fn test_stops_after_max_attempts() {
    let (mut chat, connector) = TestChatBuilder::new().max_attempts(2).build();
    chat.connect();
    assert_eq!(next_notice(&mut chat).await, Some(SocketNotice::Opened));

    let mut notices = Vec::new();
    for _ in 0..3 {
        assert!(connector.drop_connection());
        loop {
            let notice = next_notice(&mut chat).await.expect("socket went idle early");
            let done = matches!(
                notice,
                SocketNotice::Reconnected
                    | SocketNotice::Closed {
                        decision: CloseDecision::Exhausted,
                        ..
                    }
            );
            notices.push(notice);
            if done {
                break;
            }
        }
    }

    let attempts: Vec<u32> = notices
        .iter()
        .filter_map(|n| match n {
            SocketNotice::Reconnecting { attempt } => Some(*attempt),
            _ => None,
        })
        .collect();
    assert_eq!(attempts, vec![1, 2]);
    assert_eq!(
        notices.last(),
        Some(&SocketNotice::Closed {
            clean: false,
            decision: CloseDecision::Exhausted
        })
    );

    // Nothing more is scheduled
    assert_eq!(next_notice(&mut chat).await, None);
    assert_eq!(connector.connection_count(), 3);
    assert_eq!(chat.connection_state(), ConnectionState::Error);
    assert!(!chat.connection_state().is_connected());
}

#[tokio::test]
async fn test_refused_connects_count_as_unclean() {
    let (mut chat, connector) = TestChatBuilder::new().max_attempts(1).build();
    connector.refuse_next(2);
    chat.connect();

    let notices = drain(&mut chat).await;
    assert_eq!(
        notices,
        vec![
            SocketNotice::Error("connection refused".to_string()),
            SocketNotice::Closed {
                clean: false,
                decision: CloseDecision::Scheduled { attempt: 1 }
            },
            SocketNotice::Reconnecting { attempt: 1 },
            SocketNotice::Error("connection refused".to_string()),
            SocketNotice::Closed {
                clean: false,
                decision: CloseDecision::Exhausted
            },
        ]
    );
    assert_eq!(chat.connection_state(), ConnectionState::Error);
}

#[tokio::test]
async fn test_manual_reconnect_restores_budget() {
    let (mut chat, connector) = TestChatBuilder::new().max_attempts(1).build();
    connector.refuse_next(2);
    chat.connect();
    drain(&mut chat).await;
    assert_eq!(chat.reconnect_attempts(), 1);

    chat.reconnect();
    assert_eq!(chat.reconnect_attempts(), 0);
    assert_eq!(chat.connection_state(), ConnectionState::Connecting);
    assert_eq!(next_notice(&mut chat).await, Some(SocketNotice::Opened));

    connector.push_event(InboundEvent::AuthSuccess);
    next_notice(&mut chat).await;
    assert_eq!(chat.connection_state(), ConnectionState::Connected);
}

#[tokio::test]
async fn test_connect_after_exhaustion_restores_budget() {
    let (mut chat, connector) = TestChatBuilder::new().max_attempts(1).build();
    connector.refuse_next(2);
    chat.connect();
    drain(&mut chat).await;
    assert_eq!(chat.connection_state(), ConnectionState::Error);

    chat.disconnect();
    chat.connect();
    assert_eq!(chat.reconnect_attempts(), 0);
    assert_eq!(next_notice(&mut chat).await, Some(SocketNotice::Opened));

    assert!(connector.drop_connection());
    assert_eq!(
        next_notice(&mut chat).await,
        Some(SocketNotice::Closed {
            clean: false,
            decision: CloseDecision::Scheduled { attempt: 1 }
        })
    );
    assert_eq!(chat.connection_state(), ConnectionState::Connecting);
}

#[tokio::test]
async fn test_server_close_is_not_retried() {
    let (mut chat, connector) = TestChatBuilder::new().build();
    chat.connect();
    next_notice(&mut chat).await;

    assert!(connector.close_cleanly());
    assert_eq!(
        drain(&mut chat).await,
        vec![SocketNotice::Closed {
            clean: true,
            decision: CloseDecision::CleanClose
        }]
    );
    assert_eq!(chat.connection_state(), ConnectionState::Disconnected);
    assert_eq!(connector.connection_count(), 1);
}

#[tokio::test]
async fn test_disconnect_cancels_pending_reconnect() {
    let (mut chat, connector) = TestChatBuilder::new().build();
    chat.connect();
    next_notice(&mut chat).await;

    connector.drop_connection();
    next_notice(&mut chat).await;
    assert!(matches!(
        next_notice(&mut chat).await,
        Some(SocketNotice::Reconnecting { attempt: 1 })
    ));

    chat.disconnect();
    assert_eq!(chat.connection_state(), ConnectionState::Disconnected);
    assert_eq!(next_notice(&mut chat).await, None);
    assert_eq!(connector.connection_count(), 1);
}

#[tokio::test]
async fn test_server_error_event_sets_error_state() {
    let (mut chat, connector) = TestChatBuilder::new().build();
    chat.connect();
    next_notice(&mut chat).await;

    connector.push_frame(&error_frame("AUTH_FAILED", "Invalid API key"));
    next_notice(&mut chat).await;
    assert_eq!(chat.connection_state(), ConnectionState::Error);
}

#[tokio::test]
async fn test_echo_connector_answers_messages() {
    use fomo::adapters::mock::EchoConnector;
    use fomo::chat::ChatClient;
    use std::time::Duration;

    let connector = EchoConnector::new().with_response_delay(Duration::from_millis(10));
    let mut chat = ChatClient::new(connector, test_endpoint(), fast_policy(5));
    chat.connect();

    assert_eq!(next_notice(&mut chat).await, Some(SocketNotice::Opened));
    assert_eq!(
        next_notice(&mut chat).await,
        Some(SocketNotice::Event(InboundEvent::AuthSuccess))
    );

    chat.send("ping");
    next_notice(&mut chat).await;
    next_notice(&mut chat).await;

    assert_eq!(chat.messages().len(), 2);
    assert_eq!(
        chat.messages()[1].content,
        "[Mock Response] You said: ping"
    );
    assert_eq!(chat.usage().input_tokens, 10);
}
