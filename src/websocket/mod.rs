//! Session socket protocol client.
//!
//! [`messages`] holds the wire types. [`client`] holds the reconnecting
//! wrapper that keeps one live transport open and replaces it after
//! abnormal closes.

pub mod client;
pub mod messages;

pub use client::{
    CloseDecision, ReconnectPolicy, ReconnectingSocket, SocketNotice,
    DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_DELAY,
};
pub use messages::{InboundEvent, OutboundCommand, ServerError, SessionEndReason};
