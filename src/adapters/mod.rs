//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`TungsteniteConnector`] - session sockets over tokio-tungstenite
//! - [`FileCredentialsProvider`] - file-based credentials storage
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles and the offline echo server:
//! - [`mock::MockConnector`] - scripted transports for tests
//! - [`mock::EchoConnector`] - local echo used by mock mode
//! - [`mock::InMemoryCredentials`] - in-memory credential storage

pub mod file_credentials;
pub mod mock;
pub mod tungstenite_ws;

pub use file_credentials::FileCredentialsProvider;
pub use mock::{EchoConnector, InMemoryCredentials, MockConnector};
pub use tungstenite_ws::{TungsteniteConnector, TungsteniteTransport};
