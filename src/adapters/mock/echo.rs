//! Offline echo server used by mock mode.
//!
//! [`EchoConnector`] answers commands locally so the chat client can run
//! without a backend: authentication succeeds at once, sessions get a fresh
//! id, and every message is echoed back as one delta plus a completion.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::models::Usage;
use crate::traits::{
    Connector, Endpoint, SocketState, Transport, TransportError, TransportEvent,
    TransportEventKind,
};
use crate::websocket::messages::{
    ContentDelta, InboundEvent, MessageComplete, OutboundCommand, SessionCreated,
};

/// Delay before a mocked assistant reply.
pub const DEFAULT_RESPONSE_DELAY: Duration = Duration::from_millis(1000);

/// Connector for the offline echo server. Must be used inside a tokio runtime.
#[derive(Debug, Clone)]
pub struct EchoConnector {
    response_delay: Duration,
}

impl EchoConnector {
    pub fn new() -> Self {
        Self {
            response_delay: DEFAULT_RESPONSE_DELAY,
        }
    }

    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = delay;
        self
    }
}

impl Default for EchoConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for EchoConnector {
    type Transport = EchoTransport;

    fn open(
        &self,
        endpoint: &Endpoint,
        generation: u64,
        events: mpsc::Sender<TransportEvent>,
    ) -> EchoTransport {
        debug!("Mock mode: opening echo connection for {}", endpoint.project_id);
        let transport = EchoTransport {
            generation,
            state: Arc::new(Mutex::new(SocketState::Open)),
            events,
            response_delay: self.response_delay,
        };
        transport.emit(TransportEventKind::Opened);
        transport.emit(TransportEventKind::Frame(InboundEvent::AuthSuccess));
        transport
    }
}

pub struct EchoTransport {
    generation: u64,
    state: Arc<Mutex<SocketState>>,
    events: mpsc::Sender<TransportEvent>,
    response_delay: Duration,
}

impl EchoTransport {
    fn emit(&self, kind: TransportEventKind) {
        if let Err(e) = self.events.try_send(TransportEvent::new(self.generation, kind)) {
            debug!("Echo transport could not deliver event: {}", e);
        }
    }

    fn reply_to(&self, content: String) {
        let events = self.events.clone();
        let generation = self.generation;
        let state = self.state.clone();
        let delay = self.response_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if *state.lock().unwrap_or_else(|p| p.into_inner()) != SocketState::Open {
                return;
            }
            let reply = [
                InboundEvent::ContentDelta(ContentDelta {
                    text: format!("[Mock Response] You said: {}", content),
                }),
                InboundEvent::MessageComplete(MessageComplete {
                    message_id: uuid::Uuid::new_v4().to_string(),
                    usage: Usage::new(10, 10, 0.001),
                    trace_id: None,
                }),
            ];
            for event in reply {
                let event = TransportEvent::new(generation, TransportEventKind::Frame(event));
                if events.send(event).await.is_err() {
                    break;
                }
            }
        });
    }
}

impl Transport for EchoTransport {
    fn write(&self, command: OutboundCommand) -> Result<(), TransportError> {
        match command {
            OutboundCommand::Auth { .. } => {
                self.emit(TransportEventKind::Frame(InboundEvent::AuthSuccess));
            }
            OutboundCommand::CreateSession { .. } => {
                self.emit(TransportEventKind::Frame(InboundEvent::SessionCreated(
                    SessionCreated {
                        session_id: uuid::Uuid::new_v4().to_string(),
                    },
                )));
            }
            OutboundCommand::SendMessage { content } => self.reply_to(content),
            OutboundCommand::DecideApproval { approval_id, .. } => {
                debug!("Mock mode: approval {} decided", approval_id);
            }
        }
        Ok(())
    }

    fn state(&self) -> SocketState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn close(&self) {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if *state == SocketState::Open {
            *state = SocketState::Closed;
            drop(state);
            self.emit(TransportEventKind::Closed { clean: true });
        }
    }
}
