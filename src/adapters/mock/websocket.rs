//! Scriptable mock connector for testing.
//!
//! [`MockConnector`] hands out in-process transports whose lifecycle is
//! driven by the test: inject server events, drop the connection, refuse
//! connects, and inspect every command that was written.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::warn;

use crate::traits::{
    Connector, Endpoint, SocketState, Transport, TransportError, TransportEvent,
    TransportEventKind,
};
use crate::websocket::messages::{InboundEvent, OutboundCommand};

/// Mock connector. Clones share the same script and recorded traffic.
///
/// By default every connect succeeds immediately: the transport records the
/// `auth` command and reports `Opened`.
///
/// # Example
///
/// ```ignore
/// use fomo::adapters::mock::MockConnector;
///
/// let connector = MockConnector::new();
/// let mut socket = ReconnectingSocket::new(connector.clone(), endpoint, policy);
/// socket.connect();
///
/// connector.push_event(InboundEvent::AuthSuccess);
/// connector.drop_connection();
/// assert_eq!(connector.connection_count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockConnector {
    inner: Arc<Mutex<MockState>>,
}

struct MockState {
    auto_open: bool,
    refuse_remaining: usize,
    links: Vec<Arc<MockLink>>,
    sent: Vec<OutboundCommand>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            auto_open: true,
            refuse_remaining: 0,
            links: Vec::new(),
            sent: Vec::new(),
        }
    }
}

/// One simulated physical connection.
struct MockLink {
    generation: u64,
    endpoint: Endpoint,
    state: Mutex<SocketState>,
    events: mpsc::Sender<TransportEvent>,
}

impl MockLink {
    fn state(&self) -> SocketState {
        *lock(&self.state)
    }

    fn set_state(&self, state: SocketState) {
        *lock(&self.state) = state;
    }

    fn emit(&self, kind: TransportEventKind) {
        if let Err(e) = self.events.try_send(TransportEvent::new(self.generation, kind)) {
            warn!("Mock transport could not deliver event: {}", e);
        }
    }

    /// Move to `Closed` and report it, unless already closed.
    fn shut(&self, clean: bool) -> bool {
        let previous = std::mem::replace(&mut *lock(&self.state), SocketState::Closed);
        if previous == SocketState::Closed {
            return false;
        }
        self.emit(TransportEventKind::Closed { clean });
        true
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave new connections in `Connecting` until [`MockConnector::accept`].
    pub fn manual_open(self) -> Self {
        lock(&self.inner).auto_open = false;
        self
    }

    /// Make the next `count` connects fail with an unclean close.
    pub fn refuse_next(&self, count: usize) {
        lock(&self.inner).refuse_remaining = count;
    }

    fn current(&self) -> Option<Arc<MockLink>> {
        lock(&self.inner).links.last().cloned()
    }

    /// Open the most recent connection if it is still connecting.
    pub fn accept(&self) -> bool {
        let Some(link) = self.current() else {
            return false;
        };
        if link.state() != SocketState::Connecting {
            return false;
        }
        self.open_link(&link);
        true
    }

    fn open_link(&self, link: &MockLink) {
        link.set_state(SocketState::Open);
        lock(&self.inner).sent.push(OutboundCommand::Auth {
            api_key: link.endpoint.api_key.clone(),
        });
        link.emit(TransportEventKind::Opened);
    }

    /// Deliver a server event on the current connection.
    pub fn push_event(&self, event: InboundEvent) {
        match self.current() {
            Some(link) if link.state() == SocketState::Open => {
                link.emit(TransportEventKind::Frame(event))
            }
            _ => warn!("Mock connection not open, dropping {} event", event.event_type()),
        }
    }

    /// Deliver a raw text frame; malformed frames are dropped like a real
    /// transport would.
    pub fn push_frame(&self, text: &str) {
        match InboundEvent::from_frame(text) {
            Ok(event) => self.push_event(event),
            Err(e) => warn!("Failed to parse WebSocket message: {}", e),
        }
    }

    /// Report a socket error on the current connection. The connection stays
    /// up until it is dropped or closed.
    pub fn fail(&self, message: &str) {
        if let Some(link) = self.current() {
            link.emit(TransportEventKind::Error(message.to_string()));
        }
    }

    /// Simulate an abnormal close of the current connection.
    pub fn drop_connection(&self) -> bool {
        self.current().is_some_and(|link| link.shut(false))
    }

    /// Simulate the server completing a close handshake.
    pub fn close_cleanly(&self) -> bool {
        self.current().is_some_and(|link| link.shut(true))
    }

    /// Number of physical connections opened so far, refused ones included.
    pub fn connection_count(&self) -> usize {
        lock(&self.inner).links.len()
    }

    /// URL the most recent connection was opened against.
    pub fn last_url(&self) -> Option<String> {
        self.current().map(|link| link.endpoint.url())
    }

    /// Ready state of the most recent connection.
    pub fn current_state(&self) -> Option<SocketState> {
        self.current().map(|link| link.state())
    }

    /// Every command written across all connections, `auth` included.
    pub fn sent_commands(&self) -> Vec<OutboundCommand> {
        lock(&self.inner).sent.clone()
    }

    pub fn clear_sent(&self) {
        lock(&self.inner).sent.clear();
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    fn open(
        &self,
        endpoint: &Endpoint,
        generation: u64,
        events: mpsc::Sender<TransportEvent>,
    ) -> MockTransport {
        let link = Arc::new(MockLink {
            generation,
            endpoint: endpoint.clone(),
            state: Mutex::new(SocketState::Connecting),
            events,
        });

        let (refuse, auto_open) = {
            let mut inner = lock(&self.inner);
            inner.links.push(link.clone());
            let refuse = inner.refuse_remaining > 0;
            if refuse {
                inner.refuse_remaining -= 1;
            }
            (refuse, inner.auto_open)
        };

        if refuse {
            link.set_state(SocketState::Closed);
            link.emit(TransportEventKind::Error("connection refused".to_string()));
            link.emit(TransportEventKind::Closed { clean: false });
        } else if auto_open {
            self.open_link(&link);
        }

        MockTransport {
            link,
            connector: self.clone(),
        }
    }
}

/// Transport handed out by [`MockConnector`].
pub struct MockTransport {
    link: Arc<MockLink>,
    connector: MockConnector,
}

impl Transport for MockTransport {
    fn write(&self, command: OutboundCommand) -> Result<(), TransportError> {
        if self.link.state() != SocketState::Open {
            return Err(TransportError::NotOpen(self.link.state().as_str()));
        }
        lock(&self.connector.inner).sent.push(command);
        Ok(())
    }

    fn state(&self) -> SocketState {
        self.link.state()
    }

    fn close(&self) {
        // A locally requested close always reports clean.
        self.link.shut(true);
    }
}
