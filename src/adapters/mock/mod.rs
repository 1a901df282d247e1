//! Mock implementations for testing and offline use.
//!
//! - [`MockConnector`] - scriptable transports with event injection
//! - [`EchoConnector`] - offline echo server behind `--mock`
//! - [`InMemoryCredentials`] - in-memory credential storage

pub mod credentials;
pub mod echo;
pub mod websocket;

pub use credentials::InMemoryCredentials;
pub use echo::{EchoConnector, EchoTransport};
pub use websocket::{MockConnector, MockTransport};
