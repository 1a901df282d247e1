//! Transport socket trait abstraction.
//!
//! A [`Transport`] is one physical connection to the session server. A
//! [`Connector`] creates them. The reconnecting wrapper owns exactly one live
//! transport at a time and asks its connector for a fresh one on reconnect,
//! which lets tests swap the network for a scripted mock.
//!
//! Transports report their lifecycle through a shared
//! `mpsc::Sender<TransportEvent>`. Every event is stamped with the
//! generation the transport was opened with so the owner can discard events
//! from connections it has already replaced.

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::websocket::messages::{InboundEvent, OutboundCommand};

/// Where and as whom to connect.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Base WebSocket URL, e.g. `ws://localhost:3002/api/v1/ws`
    pub base_url: String,
    pub project_id: String,
    /// Opaque credential sent in the `auth` command
    pub api_key: String,
}

impl Endpoint {
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            project_id: project_id.into(),
            api_key: api_key.into(),
        }
    }

    /// Connection URL scoped to the project.
    pub fn url(&self) -> String {
        format!(
            "{}?projectId={}",
            self.base_url,
            urlencoding::encode(&self.project_id)
        )
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

/// Ready state of a physical socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Connecting,
    Open,
    Closing,
    Closed,
}

impl SocketState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocketState::Connecting => "connecting",
            SocketState::Open => "open",
            SocketState::Closing => "closing",
            SocketState::Closed => "closed",
        }
    }
}

/// Lifecycle report from a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportEvent {
    pub generation: u64,
    pub kind: TransportEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEventKind {
    /// Physical socket opened and the `auth` command was written
    Opened,
    /// A well-formed inbound event
    Frame(InboundEvent),
    /// Socket-level failure; a `Closed` always follows
    Error(String),
    /// Socket is gone. `clean` is false unless a close handshake completed
    /// or the close was requested locally.
    Closed { clean: bool },
}

impl TransportEvent {
    pub fn new(generation: u64, kind: TransportEventKind) -> Self {
        Self { generation, kind }
    }
}

/// Failure to hand a command to the socket writer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("socket is not open (state: {0})")]
    NotOpen(&'static str),
    #[error("outbound queue is full")]
    QueueFull,
    #[error("socket writer has shut down")]
    WriterGone,
}

/// One physical connection to the session server.
pub trait Transport: Send {
    /// Queue a command for writing. Implementations may assume the socket
    /// is open; [`Transport::send`] checks first.
    fn write(&self, command: OutboundCommand) -> Result<(), TransportError>;

    /// Ready state mirrored from the underlying socket.
    fn state(&self) -> SocketState;

    /// Start a graceful shutdown. No sends succeed afterwards.
    fn close(&self);

    /// Fire-and-forget send: writes only when the socket is open, otherwise
    /// logs and drops the command.
    fn send(&self, command: OutboundCommand) {
        let state = self.state();
        if state != SocketState::Open {
            warn!(
                "WebSocket not open ({}), dropping {} command",
                state.as_str(),
                command.command_type()
            );
            return;
        }

        let command_type = command.command_type();
        match self.write(command) {
            Ok(()) => debug!("Queued {} command", command_type),
            Err(e) => warn!("Failed to send {} command: {}", command_type, e),
        }
    }
}

/// Factory for transports.
pub trait Connector: Send {
    type Transport: Transport;

    /// Start opening a connection. Must return immediately; progress is
    /// reported through `events` tagged with `generation`.
    fn open(
        &self,
        endpoint: &Endpoint,
        generation: u64,
        events: mpsc::Sender<TransportEvent>,
    ) -> Self::Transport;
}
