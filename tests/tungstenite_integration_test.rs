//! End-to-end tests of the production transport against a loopback
//! WebSocket server.

mod common;

use std::time::Duration;

use common::*;
use fomo::adapters::TungsteniteConnector;
use fomo::chat::ChatClient;
use fomo::state::ConnectionState;
use fomo::traits::Endpoint;
use fomo::websocket::{CloseDecision, InboundEvent, ReconnectPolicy, SocketNotice};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

type ServerSocket = WebSocketStream<tokio::net::TcpStream>;

async fn loopback() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/api/v1/ws", listener.local_addr().unwrap());
    (listener, url)
}

async fn accept(listener: &TcpListener) -> ServerSocket {
    let (stream, _) = listener.accept().await.unwrap();
    accept_async(stream).await.unwrap()
}

async fn next_text(ws: &mut ServerSocket) -> Option<String> {
    while let Some(Ok(msg)) = ws.next().await {
        if let Message::Text(text) = msg {
            return Some(text);
        }
    }
    None
}

fn client(url: &str, max_attempts: u32) -> ChatClient<TungsteniteConnector> {
    ChatClient::new(
        TungsteniteConnector::new(),
        Endpoint::new(url, TEST_PROJECT_ID, TEST_API_KEY),
        ReconnectPolicy {
            delay: Duration::from_millis(20),
            max_attempts,
        },
    )
}

/// Next notice that is not a socket error.
async fn next_non_error(chat: &mut ChatClient<TungsteniteConnector>) -> Option<SocketNotice> {
    loop {
        match next_notice(chat).await {
            Some(SocketNotice::Error(_)) => continue,
            other => return other,
        }
    }
}

#[tokio::test]
async fn test_full_conversation_over_loopback() {
    let (listener, url) = loopback().await;
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<String>();

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;

        let auth = next_text(&mut ws).await.unwrap();
        seen_tx.send(auth).unwrap();
        ws.send(Message::Text(auth_success_frame())).await.unwrap();

        let message = next_text(&mut ws).await.unwrap();
        seen_tx.send(message).unwrap();

        ws.send(Message::Text("{garbage".to_string())).await.unwrap();
        ws.send(Message::Text(delta_frame("Hel"))).await.unwrap();
        ws.send(Message::Text(delta_frame("lo"))).await.unwrap();
        ws.send(Message::Text(complete_frame("m1", 5, 3, 0.002, Some("t1"))))
            .await
            .unwrap();
        ws.close(None).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let mut chat = client(&url, 5);
    chat.connect();
    assert_eq!(next_notice(&mut chat).await, Some(SocketNotice::Opened));
    assert_eq!(
        next_notice(&mut chat).await,
        Some(SocketNotice::Event(InboundEvent::AuthSuccess))
    );
    assert_eq!(chat.connection_state(), ConnectionState::Connected);

    let auth: serde_json::Value = serde_json::from_str(&seen_rx.recv().await.unwrap()).unwrap();
    assert_eq!(auth["type"], "auth");
    assert_eq!(auth["apiKey"], TEST_API_KEY);

    chat.send("hello");
    let sent: serde_json::Value = serde_json::from_str(&seen_rx.recv().await.unwrap()).unwrap();
    assert_eq!(sent["type"], "message.send");
    assert_eq!(sent["content"], "hello");

    for _ in 0..3 {
        assert!(matches!(
            next_notice(&mut chat).await,
            Some(SocketNotice::Event(_))
        ));
    }
    assert_eq!(chat.messages().len(), 2);
    assert_eq!(chat.messages()[1].content, "Hello");

    assert_eq!(
        next_notice(&mut chat).await,
        Some(SocketNotice::Closed {
            clean: true,
            decision: CloseDecision::CleanClose
        })
    );
    assert_eq!(next_notice(&mut chat).await, None);
    assert_eq!(chat.connection_state(), ConnectionState::Disconnected);

    server.await.unwrap();
}

#[tokio::test]
async fn test_connect_failure_is_unclean_close() {
    let (listener, url) = loopback().await;
    drop(listener);

    let mut chat = client(&url, 0);
    chat.connect();

    assert!(matches!(
        next_notice(&mut chat).await,
        Some(SocketNotice::Error(_))
    ));
    assert_eq!(
        next_notice(&mut chat).await,
        Some(SocketNotice::Closed {
            clean: false,
            decision: CloseDecision::Exhausted
        })
    );
    assert_eq!(chat.connection_state(), ConnectionState::Error);
}

#[tokio::test]
async fn test_reconnects_after_abrupt_drop() {
    let (listener, url) = loopback().await;
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<String>();

    let server = tokio::spawn(async move {
        let mut first = accept(&listener).await;
        seen_tx.send(next_text(&mut first).await.unwrap()).unwrap();
        drop(first);

        let mut second = accept(&listener).await;
        seen_tx.send(next_text(&mut second).await.unwrap()).unwrap();
        second
            .send(Message::Text(auth_success_frame()))
            .await
            .unwrap();
        while let Some(Ok(_)) = second.next().await {}
    });

    let mut chat = client(&url, 3);
    chat.connect();

    assert_eq!(next_non_error(&mut chat).await, Some(SocketNotice::Opened));
    assert_eq!(
        next_non_error(&mut chat).await,
        Some(SocketNotice::Closed {
            clean: false,
            decision: CloseDecision::Scheduled { attempt: 1 }
        })
    );
    assert_eq!(
        next_non_error(&mut chat).await,
        Some(SocketNotice::Reconnecting { attempt: 1 })
    );
    assert_eq!(next_non_error(&mut chat).await, Some(SocketNotice::Opened));
    assert_eq!(next_non_error(&mut chat).await, Some(SocketNotice::Reconnected));
    assert_eq!(
        next_non_error(&mut chat).await,
        Some(SocketNotice::Event(InboundEvent::AuthSuccess))
    );
    assert_eq!(chat.connection_state(), ConnectionState::Connected);

    // Every physical connection authenticates first
    for _ in 0..2 {
        let auth: serde_json::Value =
            serde_json::from_str(&seen_rx.recv().await.unwrap()).unwrap();
        assert_eq!(auth["type"], "auth");
    }

    chat.disconnect();
    assert_eq!(chat.connection_state(), ConnectionState::Disconnected);
    server.await.unwrap();
}
