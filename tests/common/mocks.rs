//! Mock implementations and wire fixtures for tests.
//!
//! Re-exports the mock adapters from `fomo::adapters::mock` and provides
//! JSON text frames as the session server would send them.

pub use fomo::adapters::mock::{EchoConnector, InMemoryCredentials, MockConnector};
pub use fomo::traits::{CredentialsProvider, SocketState};

use serde_json::json;

pub fn auth_success_frame() -> String {
    json!({"type": "auth.success"}).to_string()
}

pub fn session_created_frame(session_id: &str) -> String {
    json!({"type": "session.created", "sessionId": session_id}).to_string()
}

pub fn delta_frame(text: &str) -> String {
    json!({"type": "message.content_delta", "text": text}).to_string()
}

pub fn tool_start_frame(id: &str, tool: &str) -> String {
    json!({
        "type": "message.tool_start",
        "toolCallId": id,
        "tool": tool,
        "input": {"path": "/tmp"}
    })
    .to_string()
}

pub fn tool_complete_frame(id: &str, success: bool) -> String {
    json!({
        "type": "message.tool_complete",
        "toolCallId": id,
        "success": success,
        "output": {"ok": success},
        "durationMs": 12
    })
    .to_string()
}

pub fn approval_frame(approval_id: &str, tool: &str) -> String {
    json!({
        "type": "message.approval_required",
        "approvalId": approval_id,
        "tool": tool,
        "action": {"command": "rm -rf build"}
    })
    .to_string()
}

pub fn complete_frame(
    message_id: &str,
    input_tokens: u64,
    output_tokens: u64,
    cost_usd: f64,
    trace_id: Option<&str>,
) -> String {
    let mut frame = json!({
        "type": "message.complete",
        "messageId": message_id,
        "usage": {
            "inputTokens": input_tokens,
            "outputTokens": output_tokens,
            "costUsd": cost_usd
        }
    });
    if let Some(trace_id) = trace_id {
        frame["traceId"] = json!(trace_id);
    }
    frame.to_string()
}

pub fn error_frame(code: &str, message: &str) -> String {
    json!({"type": "error", "code": code, "message": message}).to_string()
}
