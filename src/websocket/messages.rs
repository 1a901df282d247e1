use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ProtocolError;
use crate::models::Usage;

/// Events received from the session server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum InboundEvent {
    #[serde(rename = "session.created")]
    SessionCreated(SessionCreated),
    /// Incremental fragment of assistant text
    #[serde(rename = "message.content_delta")]
    ContentDelta(ContentDelta),
    #[serde(rename = "message.tool_start")]
    ToolStart(ToolStart),
    #[serde(rename = "message.tool_complete")]
    ToolComplete(ToolComplete),
    /// Agent is paused until a human approves or denies an action
    #[serde(rename = "message.approval_required")]
    ApprovalRequired(ApprovalRequired),
    /// Assistant turn finished
    #[serde(rename = "message.complete")]
    MessageComplete(MessageComplete),
    #[serde(rename = "session.cost_alert")]
    CostAlert(CostAlert),
    #[serde(rename = "session.ended")]
    SessionEnded(SessionEnded),
    /// Server accepted the `auth` command
    #[serde(rename = "auth.success")]
    AuthSuccess,
    #[serde(rename = "error")]
    Error(ServerError),
}

impl InboundEvent {
    /// Parse a text frame into an event.
    pub fn from_frame(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedFrame {
            message: e.to_string(),
            raw: text.to_string(),
        })
    }

    /// Wire tag of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            InboundEvent::SessionCreated(_) => "session.created",
            InboundEvent::ContentDelta(_) => "message.content_delta",
            InboundEvent::ToolStart(_) => "message.tool_start",
            InboundEvent::ToolComplete(_) => "message.tool_complete",
            InboundEvent::ApprovalRequired(_) => "message.approval_required",
            InboundEvent::MessageComplete(_) => "message.complete",
            InboundEvent::CostAlert(_) => "session.cost_alert",
            InboundEvent::SessionEnded(_) => "session.ended",
            InboundEvent::AuthSuccess => "auth.success",
            InboundEvent::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContentDelta {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolStart {
    pub tool_call_id: String,
    pub tool: String,
    #[serde(default)]
    pub input: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolComplete {
    pub tool_call_id: String,
    pub success: bool,
    #[serde(default)]
    pub output: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequired {
    pub approval_id: String,
    pub tool: String,
    #[serde(default)]
    pub action: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageComplete {
    pub message_id: String,
    #[serde(default)]
    pub usage: Usage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostAlert {
    pub current_spend: f64,
    pub budget: f64,
    pub percent: f64,
}

/// Why the server ended a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionEndReason {
    Completed,
    Error,
    Timeout,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEnded {
    pub session_id: String,
    pub reason: SessionEndReason,
}

/// Protocol-level error reported by the server
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerError {
    pub code: String,
    pub message: String,
}

impl From<ServerError> for ProtocolError {
    fn from(err: ServerError) -> Self {
        ProtocolError::Server {
            code: err.code,
            message: err.message,
        }
    }
}

/// Commands sent to the session server.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum OutboundCommand {
    /// First frame on every physical connection
    #[serde(rename = "auth", rename_all = "camelCase")]
    Auth { api_key: String },
    #[serde(rename = "session.create", rename_all = "camelCase")]
    CreateSession {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<HashMap<String, serde_json::Value>>,
    },
    #[serde(rename = "message.send")]
    SendMessage { content: String },
    #[serde(rename = "approval.decide", rename_all = "camelCase")]
    DecideApproval {
        approval_id: String,
        approved: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl OutboundCommand {
    pub fn approve(approval_id: impl Into<String>, note: Option<String>) -> Self {
        OutboundCommand::DecideApproval {
            approval_id: approval_id.into(),
            approved: true,
            note,
        }
    }

    pub fn deny(approval_id: impl Into<String>, note: Option<String>) -> Self {
        OutboundCommand::DecideApproval {
            approval_id: approval_id.into(),
            approved: false,
            note,
        }
    }

    /// Wire tag of this command.
    pub fn command_type(&self) -> &'static str {
        match self {
            OutboundCommand::Auth { .. } => "auth",
            OutboundCommand::CreateSession { .. } => "session.create",
            OutboundCommand::SendMessage { .. } => "message.send",
            OutboundCommand::DecideApproval { .. } => "approval.decide",
        }
    }

    /// Serialize to the JSON text frame.
    pub fn to_frame(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Serialize {
            message: e.to_string(),
        })
    }
}

// The auth command carries the API key; keep it out of debug logs.
impl std::fmt::Debug for OutboundCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutboundCommand::Auth { .. } => f
                .debug_struct("Auth")
                .field("api_key", &"<redacted>")
                .finish(),
            OutboundCommand::CreateSession { agent_id, metadata } => f
                .debug_struct("CreateSession")
                .field("agent_id", agent_id)
                .field("metadata", metadata)
                .finish(),
            OutboundCommand::SendMessage { content } => f
                .debug_struct("SendMessage")
                .field("content", content)
                .finish(),
            OutboundCommand::DecideApproval {
                approval_id,
                approved,
                note,
            } => f
                .debug_struct("DecideApproval")
                .field("approval_id", approval_id)
                .field("approved", approved)
                .field("note", note)
                .finish(),
        }
    }
}
