//! Common test utilities for integration tests.
//!
//! Fixtures for credentials, endpoints and reconnect policies, plus helpers
//! that drive a [`ChatClient`] over the scriptable mock connector.
//!
//! # Example
//!
//! ```ignore
//! use common::{TestChatBuilder, next_notice};
//!
//! let (mut chat, connector) = TestChatBuilder::new().max_attempts(2).build();
//! chat.connect();
//! assert_eq!(next_notice(&mut chat).await, Some(SocketNotice::Opened));
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::time::Duration;

use fomo::auth::Credentials;
use fomo::chat::ChatClient;
use fomo::traits::{Connector, Endpoint};
use fomo::websocket::{ReconnectPolicy, SocketNotice};

pub const TEST_PROJECT_ID: &str = "proj-123";
pub const TEST_API_KEY: &str = "test-api-key-12345";

/// How long a test waits for a single notice before failing.
pub const NOTICE_TIMEOUT: Duration = Duration::from_secs(2);

/// Creates credentials holding the test API key.
pub fn test_credentials() -> Credentials {
    Credentials::with_api_key(TEST_API_KEY)
}

/// Creates empty credentials (not logged in).
pub fn empty_credentials() -> Credentials {
    Credentials::default()
}

pub fn test_endpoint() -> Endpoint {
    Endpoint::new("ws://mock/api/v1/ws", TEST_PROJECT_ID, TEST_API_KEY)
}

/// Reconnect policy with a short delay so tests stay fast.
pub fn fast_policy(max_attempts: u32) -> ReconnectPolicy {
    ReconnectPolicy {
        delay: Duration::from_millis(10),
        max_attempts,
    }
}

/// Builder for chat clients wired to a [`MockConnector`].
pub struct TestChatBuilder {
    connector: MockConnector,
    policy: ReconnectPolicy,
}

impl Default for TestChatBuilder {
    fn default() -> Self {
        Self {
            connector: MockConnector::new(),
            policy: fast_policy(5),
        }
    }
}

impl TestChatBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.policy.max_attempts = max_attempts;
        self
    }

    /// Builds the client and returns the connector handle that scripts it.
    pub fn build(self) -> (ChatClient<MockConnector>, MockConnector) {
        let chat = ChatClient::new(self.connector.clone(), test_endpoint(), self.policy);
        (chat, self.connector)
    }
}

/// Next notice, or `None` if the socket went idle. Panics after
/// [`NOTICE_TIMEOUT`].
pub async fn next_notice<C: Connector>(chat: &mut ChatClient<C>) -> Option<SocketNotice> {
    tokio::time::timeout(NOTICE_TIMEOUT, chat.next_update())
        .await
        .expect("timed out waiting for a socket notice")
}

/// Drain notices until the socket goes idle.
pub async fn drain<C: Connector>(chat: &mut ChatClient<C>) -> Vec<SocketNotice> {
    let mut notices = Vec::new();
    while let Some(notice) = next_notice(chat).await {
        notices.push(notice);
    }
    notices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_credentials() {
        assert!(test_credentials().has_api_key());
        assert!(!empty_credentials().has_api_key());
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            test_endpoint().url(),
            "ws://mock/api/v1/ws?projectId=proj-123"
        );
    }
}
