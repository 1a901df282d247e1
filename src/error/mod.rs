//! Unified error handling for the fomo client.
//!
//! - **Error Categories**: high-level classification for retry and messaging decisions
//! - **Domain-specific Errors**: Network, Auth and Protocol errors
//! - **Unified Error Type**: `FomoError` consolidates all of them
//! - **Result Type Alias**: `FomoResult<T>`
//!
//! The session protocol client itself never returns these from its event
//! path: transport failures feed the reconnect loop, malformed frames are
//! logged and dropped, and server `error` events surface as connection state.
//! These types are what the REST client, credential store and CLI return.
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout | Yes |
//! | Auth | Missing or rejected API key | No |
//! | Server | 5xx, server `error` events | Yes |
//! | Protocol | Malformed frames or bodies | No |
//! | User | Bad request | No |
//! | System | OS/filesystem errors | No |
//! | Configuration | Invalid settings | No |

mod auth;
mod category;
mod fomo_error;
mod network;
mod protocol;
mod result;

pub use auth::AuthError;
pub use category::ErrorCategory;
pub use fomo_error::FomoError;
pub use network::{classify_reqwest_error, NetworkError};
pub use protocol::ProtocolError;
pub use result::FomoResult;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_error_unification() {
        let errors: Vec<FomoError> = vec![
            NetworkError::Timeout {
                operation: "connect".to_string(),
            }
            .into(),
            AuthError::NotAuthenticated.into(),
            ProtocolError::MalformedFrame {
                message: "eof".to_string(),
                raw: "{".to_string(),
            }
            .into(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into(),
            FomoError::Configuration {
                message: "bad url".to_string(),
            },
        ];

        for err in &errors {
            assert!(!err.error_code().is_empty());
            assert!(!err.user_message().is_empty());
            assert!(!err.recovery_hint().is_empty());
        }

        assert_eq!(errors[0].category(), ErrorCategory::Network);
        assert_eq!(errors[1].category(), ErrorCategory::Auth);
        assert_eq!(errors[2].category(), ErrorCategory::Protocol);
        assert_eq!(errors[3].category(), ErrorCategory::System);
        assert_eq!(errors[4].category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: FomoError = json_err.into();
        assert!(matches!(
            err,
            FomoError::Network(NetworkError::InvalidResponse { .. })
        ));
        assert_eq!(err.category(), ErrorCategory::Protocol);
    }

    #[test]
    fn test_retry_logic() {
        let retryable: Vec<FomoError> = vec![
            NetworkError::ConnectionFailed {
                url: "ws://localhost".to_string(),
                message: "refused".to_string(),
            }
            .into(),
            ProtocolError::Server {
                code: "UNAVAILABLE".to_string(),
                message: "try later".to_string(),
            }
            .into(),
        ];
        for err in retryable {
            assert!(err.is_retryable(), "Expected {:?} to be retryable", err);
        }

        let permanent: Vec<FomoError> = vec![
            AuthError::NotAuthenticated.into(),
            ProtocolError::MalformedFrame {
                message: "eof".to_string(),
                raw: String::new(),
            }
            .into(),
        ];
        for err in permanent {
            assert!(!err.is_retryable(), "Expected {:?} to not be retryable", err);
        }
    }
}
