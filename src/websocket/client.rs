use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Sleep;
use tracing::{debug, error, info, warn};

use super::messages::{InboundEvent, OutboundCommand};
use crate::traits::{Connector, Endpoint, SocketState, Transport, TransportEvent, TransportEventKind};

/// Default fixed delay between reconnect attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Default maximum number of reconnect attempts.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Default capacity of the transport event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Fixed-backoff reconnect policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RECONNECT_DELAY,
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

/// What the wrapper decided to do after a socket closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// A fresh socket will be opened after the fixed delay
    Scheduled { attempt: u32 },
    /// Reconnection was switched off by `close()`
    Disabled,
    /// The socket closed cleanly; the loop is over until `reconnect()`
    CleanClose,
    /// The attempt budget is spent; the loop is over until `reconnect()`
    Exhausted,
}

impl CloseDecision {
    /// Whether another socket is on its way.
    pub fn will_reconnect(&self) -> bool {
        matches!(self, CloseDecision::Scheduled { .. })
    }
}

/// Everything the wrapper reports to its owner, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum SocketNotice {
    /// Physical socket opened and `auth` was sent
    Opened,
    /// Follows `Opened` once when the open came from a scheduled reconnect
    Reconnected,
    /// A reconnect was scheduled
    Reconnecting { attempt: u32 },
    /// Inbound server event
    Event(InboundEvent),
    /// Socket-level error
    Error(String),
    /// The live socket closed
    Closed { clean: bool, decision: CloseDecision },
}

/// Reconnecting session socket.
///
/// Owns at most one live [`Transport`] at a time and replaces it after an
/// unclean close, waiting a fixed delay between attempts. Drive it with
/// [`ReconnectingSocket::next`]; reconnect timers only fire while it is
/// being polled.
pub struct ReconnectingSocket<C: Connector> {
    connector: C,
    endpoint: Endpoint,
    policy: ReconnectPolicy,
    socket: Option<C::Transport>,
    /// Generation of `socket`; events stamped with any other are stale
    generation: u64,
    attempts: u32,
    should_reconnect: bool,
    /// Set when `socket` was opened by a scheduled reconnect
    reopen_pending: bool,
    /// `socket` has not reported `Closed` yet
    live: bool,
    reconnect_timer: Option<Pin<Box<Sleep>>>,
    events_tx: mpsc::Sender<TransportEvent>,
    events_rx: mpsc::Receiver<TransportEvent>,
    pending: VecDeque<SocketNotice>,
}

impl<C: Connector> ReconnectingSocket<C> {
    pub fn new(connector: C, endpoint: Endpoint, policy: ReconnectPolicy) -> Self {
        Self::with_capacity(connector, endpoint, policy, DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(
        connector: C,
        endpoint: Endpoint,
        policy: ReconnectPolicy,
        capacity: usize,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(capacity.max(1));
        Self {
            connector,
            endpoint,
            policy,
            socket: None,
            generation: 0,
            attempts: 0,
            should_reconnect: false,
            reopen_pending: false,
            live: false,
            reconnect_timer: None,
            events_tx,
            events_rx,
            pending: VecDeque::new(),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    /// Reconnect attempts made since the last `connect()` or `reconnect()`.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_reconnect_scheduled(&self) -> bool {
        self.reconnect_timer.is_some()
    }

    /// Ready state of the held socket; `Closed` when there is none.
    pub fn state(&self) -> SocketState {
        self.socket
            .as_ref()
            .map_or(SocketState::Closed, |socket| socket.state())
    }

    /// Open a socket, replacing any current one, and enable reconnection
    /// with a full attempt budget.
    pub fn connect(&mut self) {
        self.should_reconnect = true;
        self.attempts = 0;
        self.reconnect_timer = None;
        self.open_socket(false);
    }

    /// Open a fresh socket after a manual request. Same as `connect()`.
    pub fn reconnect(&mut self) {
        info!("Manual reconnect requested");
        self.connect();
    }

    /// Close the live socket and stop reconnecting.
    pub fn close(&mut self) {
        self.should_reconnect = false;
        if self.reconnect_timer.take().is_some() {
            debug!("Cancelled pending reconnect");
        }
        if let Some(socket) = &self.socket {
            info!("Closing session socket");
            socket.close();
        }
    }

    fn open_socket(&mut self, reopen: bool) {
        if let Some(old) = self.socket.take() {
            old.close();
        }
        self.generation += 1;
        self.live = true;
        self.reopen_pending = reopen;
        debug!(
            "Opening session socket to {:?} (generation {})",
            self.endpoint, self.generation
        );
        self.socket = Some(
            self.connector
                .open(&self.endpoint, self.generation, self.events_tx.clone()),
        );
    }

    /// Wait for the next notice.
    ///
    /// Returns `None` once nothing more can happen: no socket is live and no
    /// reconnect is scheduled. Call `connect()` or `reconnect()` to resume.
    pub async fn next(&mut self) -> Option<SocketNotice> {
        loop {
            if let Some(notice) = self.pending.pop_front() {
                return Some(notice);
            }
            if !self.live && self.reconnect_timer.is_none() {
                return None;
            }

            let wake = {
                let timer = &mut self.reconnect_timer;
                let events = &mut self.events_rx;
                tokio::select! {
                    event = events.recv() => Wake::Transport(event),
                    _ = wait_for(timer) => Wake::Timer,
                }
            };

            match wake {
                Wake::Transport(Some(event)) => self.handle_event(event),
                Wake::Transport(None) => return None,
                Wake::Timer => self.fire_reconnect(),
            }
        }
    }

    fn handle_event(&mut self, event: TransportEvent) {
        if event.generation != self.generation {
            debug!(
                "Ignoring event from replaced socket (generation {}, current {})",
                event.generation, self.generation
            );
            return;
        }

        match event.kind {
            TransportEventKind::Opened => {
                self.pending.push_back(SocketNotice::Opened);
                if std::mem::take(&mut self.reopen_pending) {
                    info!("Reconnected after {} attempt(s)", self.attempts);
                    self.pending.push_back(SocketNotice::Reconnected);
                }
            }
            TransportEventKind::Frame(event) => {
                self.pending.push_back(SocketNotice::Event(event));
            }
            TransportEventKind::Error(message) => {
                warn!("Session socket error: {}", message);
                self.pending.push_back(SocketNotice::Error(message));
            }
            TransportEventKind::Closed { clean } => {
                self.live = false;
                let decision = self.decide(clean);
                self.pending
                    .push_back(SocketNotice::Closed { clean, decision });
                if let CloseDecision::Scheduled { attempt } = decision {
                    self.pending
                        .push_back(SocketNotice::Reconnecting { attempt });
                }
            }
        }
    }

    fn decide(&mut self, clean: bool) -> CloseDecision {
        if !self.should_reconnect {
            info!("Session socket closed");
            return CloseDecision::Disabled;
        }
        if clean {
            info!("Session socket closed cleanly, not reconnecting");
            self.should_reconnect = false;
            return CloseDecision::CleanClose;
        }
        if self.attempts >= self.policy.max_attempts {
            error!(
                "Failed to reconnect after {} attempts, giving up",
                self.policy.max_attempts
            );
            return CloseDecision::Exhausted;
        }

        self.attempts += 1;
        info!(
            "Reconnection attempt {} of {}, waiting {}ms",
            self.attempts,
            self.policy.max_attempts,
            self.policy.delay.as_millis()
        );
        self.reconnect_timer = Some(Box::pin(tokio::time::sleep(self.policy.delay)));
        CloseDecision::Scheduled {
            attempt: self.attempts,
        }
    }

    fn fire_reconnect(&mut self) {
        self.reconnect_timer = None;
        if !self.should_reconnect {
            return;
        }
        self.open_socket(true);
    }

    /// Send through the held socket; dropped with a warning when there is
    /// none or it is not open.
    pub fn send(&self, command: OutboundCommand) {
        match &self.socket {
            Some(socket) => socket.send(command),
            None => warn!(
                "No session socket, dropping {} command",
                command.command_type()
            ),
        }
    }

    pub fn create_session(
        &self,
        agent_id: Option<String>,
        metadata: Option<HashMap<String, serde_json::Value>>,
    ) {
        self.send(OutboundCommand::CreateSession { agent_id, metadata });
    }

    pub fn send_message(&self, content: impl Into<String>) {
        self.send(OutboundCommand::SendMessage {
            content: content.into(),
        });
    }

    pub fn approve(&self, approval_id: impl Into<String>, note: Option<String>) {
        self.send(OutboundCommand::approve(approval_id, note));
    }

    pub fn deny(&self, approval_id: impl Into<String>, note: Option<String>) {
        self.send(OutboundCommand::deny(approval_id, note));
    }
}

impl<C: Connector> Drop for ReconnectingSocket<C> {
    fn drop(&mut self) {
        self.close();
    }
}

enum Wake {
    Transport(Option<TransportEvent>),
    Timer,
}

async fn wait_for(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
