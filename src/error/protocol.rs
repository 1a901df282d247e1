//! Session protocol error types.

use std::fmt;

/// Errors at the session protocol level.
#[derive(Debug, Clone)]
pub enum ProtocolError {
    /// An inbound frame was not a valid event.
    MalformedFrame { message: String, raw: String },

    /// An outbound command could not be serialized.
    Serialize { message: String },

    /// The server sent an `error` event.
    Server { code: String, message: String },
}

impl ProtocolError {
    pub fn user_message(&self) -> String {
        match self {
            ProtocolError::MalformedFrame { .. } => {
                "Received an unreadable message from the server.".to_string()
            }
            ProtocolError::Serialize { .. } => "Could not encode the request.".to_string(),
            ProtocolError::Server { message, .. } => format!("Server error: {}", message),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ProtocolError::MalformedFrame { .. } => "E_PROTO_FRAME",
            ProtocolError::Serialize { .. } => "E_PROTO_ENCODE",
            ProtocolError::Server { .. } => "E_PROTO_SERVER",
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::MalformedFrame { message, raw } => {
                // Frames can be large; keep the log line bounded.
                let preview: String = raw.chars().take(200).collect();
                write!(f, "Malformed frame ({}): {}", message, preview)
            }
            ProtocolError::Serialize { message } => write!(f, "Serialize error: {}", message),
            ProtocolError::Server { code, message } => {
                write!(f, "Server error [{}]: {}", code, message)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_frame_display_is_truncated() {
        let err = ProtocolError::MalformedFrame {
            message: "expected value".to_string(),
            raw: "x".repeat(1000),
        };
        let text = err.to_string();
        assert!(text.starts_with("Malformed frame (expected value): "));
        assert!(text.len() < 300);
    }

    #[test]
    fn test_server_error_display() {
        let err = ProtocolError::Server {
            code: "BUDGET_EXCEEDED".to_string(),
            message: "Daily budget exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "Server error [BUDGET_EXCEEDED]: Daily budget exceeded");
        assert_eq!(err.error_code(), "E_PROTO_SERVER");
    }
}
