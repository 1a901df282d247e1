//! Chat client
//!
//! [`ChatClient`] composes the reconnecting socket, the session aggregator
//! and the connection projector into the surface a front end needs. It is
//! owned by a single task: every mutation happens either in a command
//! method or inside [`ChatClient::next_update`], never concurrently.
//!
//! ```ignore
//! let mut chat = ChatClient::new(TungsteniteConnector::new(), endpoint, ReconnectPolicy::default());
//! chat.connect();
//! while let Some(notice) = chat.next_update().await {
//!     render(&chat, &notice);
//! }
//! ```

use std::collections::HashMap;

use tokio::sync::watch;
use tracing::info;

use crate::config::ClientConfig;
use crate::models::{ApprovalRequest, ChatMessage, ToolCall, Usage};
use crate::state::{ConnectionState, ConnectionStateProjector, SessionAggregator};
use crate::traits::{Connector, Endpoint, SocketState};
use crate::websocket::messages::InboundEvent;
use crate::websocket::{ReconnectPolicy, ReconnectingSocket, SocketNotice};

pub struct ChatClient<C: Connector> {
    socket: ReconnectingSocket<C>,
    aggregator: SessionAggregator,
    connection: ConnectionStateProjector,
    /// Every inbound event in arrival order
    events: Vec<InboundEvent>,
}

impl<C: Connector> ChatClient<C> {
    pub fn new(connector: C, endpoint: Endpoint, policy: ReconnectPolicy) -> Self {
        Self::from_socket(ReconnectingSocket::new(connector, endpoint, policy))
    }

    /// Build a client for `project_id` from loaded configuration.
    pub fn from_config(
        connector: C,
        config: &ClientConfig,
        project_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let endpoint = Endpoint::new(config.ws_url.clone(), project_id, api_key);
        Self::from_socket(ReconnectingSocket::with_capacity(
            connector,
            endpoint,
            config.reconnect_policy(),
            config.channel_capacity,
        ))
    }

    fn from_socket(socket: ReconnectingSocket<C>) -> Self {
        Self {
            socket,
            aggregator: SessionAggregator::new(),
            connection: ConnectionStateProjector::new(),
            events: Vec::new(),
        }
    }

    pub fn connect(&mut self) {
        info!("Connecting to project {}", self.socket.endpoint().project_id);
        self.connection.connecting();
        self.socket.connect();
    }

    pub fn disconnect(&mut self) {
        self.socket.close();
        self.connection.closed_locally();
    }

    /// Start over with a fresh attempt budget.
    pub fn reconnect(&mut self) {
        self.connection.connecting();
        self.socket.reconnect();
    }

    /// Record a user message and send it. The message stays in the history
    /// even if the socket drops it.
    pub fn send(&mut self, content: impl Into<String>) {
        let content = content.into();
        self.aggregator.push_user_message(content.clone());
        self.socket.send_message(content);
    }

    pub fn create_session(
        &self,
        agent_id: Option<String>,
        metadata: Option<HashMap<String, serde_json::Value>>,
    ) {
        self.socket.create_session(agent_id, metadata);
    }

    pub fn approve(&self, approval_id: impl Into<String>, note: Option<String>) {
        self.socket.approve(approval_id, note);
    }

    pub fn deny(&self, approval_id: impl Into<String>, note: Option<String>) {
        self.socket.deny(approval_id, note);
    }

    /// Forget the conversation. The connection is untouched.
    pub fn clear_chat(&mut self) {
        self.aggregator.clear();
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Wait for the next socket notice and fold it into the chat state.
    ///
    /// Returns `None` when the socket has nothing more to report until the
    /// next `connect()` or `reconnect()`.
    pub async fn next_update(&mut self) -> Option<SocketNotice> {
        let notice = self.socket.next().await?;
        if let SocketNotice::Event(event) = &notice {
            self.events.push(event.clone());
            self.aggregator.apply(event);
        }
        self.connection.observe(&notice);
        Some(notice)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.aggregator.messages()
    }

    pub fn current_message(&self) -> &str {
        self.aggregator.current_message()
    }

    pub fn is_streaming(&self) -> bool {
        self.aggregator.is_streaming()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.aggregator.session_id()
    }

    pub fn usage(&self) -> Usage {
        self.aggregator.usage()
    }

    pub fn pending_approval(&self) -> Option<&ApprovalRequest> {
        self.aggregator.pending_approval()
    }

    pub fn pending_tool_calls(&self) -> Vec<&ToolCall> {
        self.aggregator.pending_tool_calls().collect()
    }

    pub fn events(&self) -> &[InboundEvent] {
        &self.events
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    /// Ready state of the underlying socket.
    pub fn socket_state(&self) -> SocketState {
        self.socket.state()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.socket.attempts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockConnector;
    use crate::websocket::messages::{ContentDelta, OutboundCommand, SessionCreated};
    use std::time::Duration;

    fn client(connector: &MockConnector) -> ChatClient<MockConnector> {
        ChatClient::new(
            connector.clone(),
            Endpoint::new("ws://mock/api/v1/ws", "proj", "key"),
            ReconnectPolicy {
                delay: Duration::from_millis(5),
                max_attempts: 5,
            },
        )
    }

    #[tokio::test]
    async fn test_connect_waits_for_auth() {
        let connector = MockConnector::new();
        let mut chat = client(&connector);
        assert_eq!(chat.connection_state(), ConnectionState::Disconnected);

        chat.connect();
        assert_eq!(chat.connection_state(), ConnectionState::Connecting);
        assert_eq!(chat.next_update().await, Some(SocketNotice::Opened));
        assert_eq!(chat.connection_state(), ConnectionState::Connecting);

        connector.push_event(InboundEvent::AuthSuccess);
        chat.next_update().await;
        assert_eq!(chat.connection_state(), ConnectionState::Connected);
        assert_eq!(chat.events(), &[InboundEvent::AuthSuccess]);
    }

    #[tokio::test]
    async fn test_send_is_optimistic() {
        let connector = MockConnector::new();
        let mut chat = client(&connector);

        // Not connected: the message is kept, the command is dropped.
        chat.send("offline");
        assert_eq!(chat.messages().len(), 1);
        assert!(connector.sent_commands().is_empty());

        chat.connect();
        chat.next_update().await;
        chat.send("online");
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(
            connector.sent_commands().last(),
            Some(&OutboundCommand::SendMessage {
                content: "online".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_clear_chat_keeps_connection_and_events() {
        let connector = MockConnector::new();
        let mut chat = client(&connector);
        chat.connect();
        chat.next_update().await;
        connector.push_event(InboundEvent::AuthSuccess);
        connector.push_event(InboundEvent::SessionCreated(SessionCreated {
            session_id: "s1".to_string(),
        }));
        connector.push_event(InboundEvent::ContentDelta(ContentDelta {
            text: "partial".to_string(),
        }));
        for _ in 0..3 {
            chat.next_update().await;
        }
        assert_eq!(chat.session_id(), Some("s1"));

        chat.clear_chat();
        assert!(chat.session_id().is_none());
        assert_eq!(chat.current_message(), "");
        assert!(!chat.is_streaming());
        assert_eq!(chat.connection_state(), ConnectionState::Connected);
        assert_eq!(chat.events().len(), 3);

        chat.clear_events();
        assert!(chat.events().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_is_final() {
        let connector = MockConnector::new();
        let mut chat = client(&connector);
        chat.connect();
        chat.next_update().await;

        chat.disconnect();
        assert_eq!(chat.connection_state(), ConnectionState::Disconnected);
        assert!(matches!(
            chat.next_update().await,
            Some(SocketNotice::Closed { clean: true, .. })
        ));
        assert_eq!(chat.next_update().await, None);
        assert_eq!(chat.connection_state(), ConnectionState::Disconnected);
    }
}
