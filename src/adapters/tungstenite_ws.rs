//! Tungstenite-based transport adapter.
//!
//! Each [`TungsteniteTransport`] owns one spawned task that drives a single
//! physical WebSocket: it connects, writes the `auth` command as the first
//! frame, forwards parsed inbound events, writes queued commands, and
//! reports how the socket ended. It never reconnects; that is the job of
//! [`crate::websocket::ReconnectingSocket`].

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch, Notify};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::traits::{
    Connector, Endpoint, SocketState, Transport, TransportError, TransportEvent,
    TransportEventKind,
};
use crate::websocket::messages::{InboundEvent, OutboundCommand};

/// How long to wait for the server's close acknowledgement.
const CLOSE_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

/// Default capacity of the per-socket outbound queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Opens [`TungsteniteTransport`]s. Must be used inside a tokio runtime.
#[derive(Debug, Clone)]
pub struct TungsteniteConnector {
    queue_capacity: usize,
}

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }
}

impl Default for TungsteniteConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for TungsteniteConnector {
    type Transport = TungsteniteTransport;

    fn open(
        &self,
        endpoint: &Endpoint,
        generation: u64,
        events: mpsc::Sender<TransportEvent>,
    ) -> TungsteniteTransport {
        TungsteniteTransport::spawn(endpoint, generation, events, self.queue_capacity)
    }
}

/// Handle to one physical WebSocket connection.
pub struct TungsteniteTransport {
    generation: u64,
    state: Arc<watch::Sender<SocketState>>,
    outbound_tx: mpsc::Sender<OutboundCommand>,
    shutdown: Arc<Notify>,
}

impl TungsteniteTransport {
    fn spawn(
        endpoint: &Endpoint,
        generation: u64,
        events: mpsc::Sender<TransportEvent>,
        queue_capacity: usize,
    ) -> Self {
        let (state_tx, _) = watch::channel(SocketState::Connecting);
        let state = Arc::new(state_tx);
        let (outbound_tx, outbound_rx) = mpsc::channel(queue_capacity);
        let shutdown = Arc::new(Notify::new());

        let task = SocketTask {
            url: endpoint.url(),
            api_key: endpoint.api_key.clone(),
            generation,
            state: state.clone(),
            events,
            outbound_rx,
            shutdown: shutdown.clone(),
        };
        tokio::spawn(task.run());

        Self {
            generation,
            state,
            outbound_tx,
            shutdown,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Subscribe to ready-state changes.
    pub fn state_receiver(&self) -> watch::Receiver<SocketState> {
        self.state.subscribe()
    }
}

impl Transport for TungsteniteTransport {
    fn write(&self, command: OutboundCommand) -> Result<(), TransportError> {
        self.outbound_tx.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::QueueFull,
            TrySendError::Closed(_) => TransportError::WriterGone,
        })
    }

    fn state(&self) -> SocketState {
        *self.state.borrow()
    }

    fn close(&self) {
        let requested = self.state.send_if_modified(|state| match state {
            SocketState::Connecting | SocketState::Open => {
                *state = SocketState::Closing;
                true
            }
            SocketState::Closing | SocketState::Closed => false,
        });
        if requested {
            debug!("Closing WebSocket (generation {})", self.generation);
            self.shutdown.notify_one();
        }
    }
}

impl Drop for TungsteniteTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// State owned by the background task of one socket.
struct SocketTask {
    url: String,
    api_key: String,
    generation: u64,
    state: Arc<watch::Sender<SocketState>>,
    events: mpsc::Sender<TransportEvent>,
    outbound_rx: mpsc::Receiver<OutboundCommand>,
    shutdown: Arc<Notify>,
}

impl SocketTask {
    async fn emit(&self, kind: TransportEventKind) {
        if self
            .events
            .send(TransportEvent::new(self.generation, kind))
            .await
            .is_err()
        {
            debug!("Transport event receiver dropped (generation {})", self.generation);
        }
    }

    async fn finish(&self, clean: bool) {
        self.state.send_replace(SocketState::Closed);
        self.emit(TransportEventKind::Closed { clean }).await;
    }

    async fn run(mut self) {
        let connected = tokio::select! {
            result = connect_async(self.url.as_str()) => result,
            _ = self.shutdown.notified() => {
                debug!("Close requested while connecting");
                self.finish(true).await;
                return;
            }
        };

        let ws_stream = match connected {
            Ok((ws_stream, _response)) => ws_stream,
            Err(e) => {
                warn!("WebSocket connection to {} failed: {}", self.url, e);
                self.state.send_replace(SocketState::Closed);
                self.emit(TransportEventKind::Error(e.to_string())).await;
                self.emit(TransportEventKind::Closed { clean: false }).await;
                return;
            }
        };

        let (mut ws_sink, mut ws_stream) = ws_stream.split();

        // Authentication is always the first frame on the wire.
        let auth = OutboundCommand::Auth {
            api_key: self.api_key.clone(),
        };
        let auth_frame = match auth.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to encode auth command: {}", e);
                self.emit(TransportEventKind::Error(e.to_string())).await;
                self.finish(false).await;
                return;
            }
        };
        if let Err(e) = ws_sink.send(Message::Text(auth_frame)).await {
            error!("Failed to send auth command: {}", e);
            self.emit(TransportEventKind::Error(e.to_string())).await;
            self.finish(false).await;
            return;
        }

        self.state.send_if_modified(|state| {
            if *state == SocketState::Connecting {
                *state = SocketState::Open;
                true
            } else {
                false
            }
        });
        info!(
            "Connected to WebSocket server at {} (generation {})",
            self.url, self.generation
        );
        self.emit(TransportEventKind::Opened).await;

        let clean = loop {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    self.state.send_replace(SocketState::Closing);
                    if let Err(e) = ws_sink.send(Message::Close(None)).await {
                        debug!("Failed to send close frame: {}", e);
                    }
                    let drained = tokio::time::timeout(CLOSE_HANDSHAKE_TIMEOUT, async {
                        while let Some(Ok(msg)) = ws_stream.next().await {
                            if msg.is_close() {
                                break;
                            }
                        }
                    })
                    .await;
                    if drained.is_err() {
                        debug!("Server did not acknowledge close in time");
                    }
                    break true;
                }
                command = self.outbound_rx.recv() => {
                    let Some(command) = command else {
                        debug!("Outbound queue closed, shutting down socket");
                        let _ = ws_sink.send(Message::Close(None)).await;
                        break true;
                    };
                    match command.to_frame() {
                        Ok(frame) => {
                            debug!("Sending {} command", command.command_type());
                            if let Err(e) = ws_sink.send(Message::Text(frame)).await {
                                error!("Failed to write {} command: {}", command.command_type(), e);
                                self.emit(TransportEventKind::Error(e.to_string())).await;
                                break false;
                            }
                        }
                        Err(e) => warn!("Dropping {} command: {}", command.command_type(), e),
                    }
                }
                frame = ws_stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => match InboundEvent::from_frame(&text) {
                            Ok(event) => {
                                debug!("Received {} event", event.event_type());
                                self.emit(TransportEventKind::Frame(event)).await;
                            }
                            Err(e) => {
                                // Continue without crashing - skip malformed frames
                                warn!("Failed to parse WebSocket message: {}", e);
                            }
                        },
                        Some(Ok(Message::Ping(data))) => {
                            debug!("Received ping, sending pong");
                            let _ = ws_sink.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            info!("Received close frame from server: {:?}", frame);
                            break true;
                        }
                        Some(Ok(_)) => {
                            // Binary, Pong and raw frames carry no events
                        }
                        Some(Err(e)) => {
                            error!("WebSocket error: {}", e);
                            self.emit(TransportEventKind::Error(e.to_string())).await;
                            break false;
                        }
                        None => {
                            info!("WebSocket stream ended without close handshake");
                            break false;
                        }
                    }
                }
            }
        };

        self.finish(clean).await;
        info!(
            "WebSocket closed (generation {}, clean: {})",
            self.generation, clean
        );
    }
}
