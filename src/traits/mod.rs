//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`Transport`] / [`Connector`] - one physical session socket and its factory
//! - [`CredentialsProvider`] - API key storage and retrieval

pub mod credentials;
pub mod transport;

pub use credentials::{CredentialsError, CredentialsProvider};
pub use transport::{
    Connector, Endpoint, SocketState, Transport, TransportError, TransportEvent,
    TransportEventKind,
};
