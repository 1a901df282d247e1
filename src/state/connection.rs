//! Connection state projection.
//!
//! [`ConnectionStateProjector`] reduces socket notices and local actions to
//! the four-state indicator shown to users. Only `auth.success` enters
//! `Connected`; a physical open alone is not enough.

use tokio::sync::watch;
use tracing::debug;

use crate::websocket::messages::InboundEvent;
use crate::websocket::{CloseDecision, SocketNotice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    Connecting,
    Connected,
    #[default]
    Disconnected,
    Error,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Error => "error",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publishes [`ConnectionState`] through a watch channel.
#[derive(Debug)]
pub struct ConnectionStateProjector {
    state_tx: watch::Sender<ConnectionState>,
}

impl Default for ConnectionStateProjector {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStateProjector {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self { state_tx }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// A connect or manual reconnect was issued.
    pub fn connecting(&self) {
        self.set(ConnectionState::Connecting);
    }

    /// The owner closed the socket on purpose.
    pub fn closed_locally(&self) {
        self.set(ConnectionState::Disconnected);
    }

    /// Fold one socket notice.
    pub fn observe(&self, notice: &SocketNotice) {
        let next = match notice {
            SocketNotice::Event(InboundEvent::AuthSuccess) => Some(ConnectionState::Connected),
            SocketNotice::Event(InboundEvent::Error(_)) => Some(ConnectionState::Error),
            SocketNotice::Event(_) => None,
            SocketNotice::Reconnecting { .. } => Some(ConnectionState::Connecting),
            SocketNotice::Closed { decision, .. } => Some(match decision {
                CloseDecision::Scheduled { .. } => ConnectionState::Connecting,
                CloseDecision::Disabled | CloseDecision::CleanClose => {
                    ConnectionState::Disconnected
                }
                CloseDecision::Exhausted => ConnectionState::Error,
            }),
            // Socket errors while retries remain are reported as reconnecting
            // by the close that follows.
            SocketNotice::Opened | SocketNotice::Reconnected | SocketNotice::Error(_) => None,
        };
        if let Some(state) = next {
            self.set(state);
        }
    }

    fn set(&self, state: ConnectionState) {
        let changed = self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            debug!("Connection state -> {}", state);
        }
    }
}
