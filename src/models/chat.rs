//! Conversation model folded from the session event stream.
//!
//! These are the types the presentation layer reads: completed messages,
//! the tool calls made during an assistant turn, the approval gate raised
//! during that turn, and the running token/cost totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A completed chat message.
///
/// User messages are appended optimistically when sent. Assistant messages
/// only appear once the server reports `message.complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Server-issued id for assistant turns, locally generated for user messages
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Tool calls in the order they were started
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalRequest>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a user message with a fresh id and the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            approval: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant message from a finished turn.
    pub fn assistant(
        id: impl Into<String>,
        content: String,
        tool_calls: Vec<ToolCall>,
        approval: Option<ApprovalRequest>,
    ) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            content,
            tool_calls,
            approval,
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Lifecycle of a tool call within an assistant turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStatus {
    /// Started, no result yet
    #[default]
    Pending,
    Success,
    Error,
}

/// A single tool invocation reported by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub id: String,
    /// Tool name
    pub tool: String,
    pub input: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    pub status: ToolCallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ToolCall {
    /// Create a pending tool call.
    pub fn pending(id: impl Into<String>, tool: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            tool: tool.into(),
            input,
            output: None,
            status: ToolCallStatus::Pending,
            duration_ms: None,
        }
    }

    /// Attach the result of the call.
    pub fn complete(&mut self, success: bool, output: serde_json::Value, duration_ms: Option<u64>) {
        self.output = Some(output);
        self.status = if success {
            ToolCallStatus::Success
        } else {
            ToolCallStatus::Error
        };
        self.duration_ms = duration_ms;
    }

    pub fn is_pending(&self) -> bool {
        self.status == ToolCallStatus::Pending
    }
}

/// Human decision state of an approval gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Denied,
}

/// An approval gate raised by the agent before a side-effecting tool action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub id: String,
    pub tool: String,
    /// Opaque description of the action awaiting approval
    pub action: serde_json::Value,
    pub status: ApprovalStatus,
}

impl ApprovalRequest {
    pub fn pending(id: impl Into<String>, tool: impl Into<String>, action: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            tool: tool.into(),
            action,
            status: ApprovalStatus::Pending,
        }
    }
}

/// Token and cost totals.
///
/// Doubles as the per-turn usage delta carried by `message.complete`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cost_usd: f64,
}

impl Usage {
    pub fn new(input_tokens: u64, output_tokens: u64, cost_usd: f64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            cost_usd,
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    pub fn is_zero(&self) -> bool {
        self.input_tokens == 0 && self.output_tokens == 0 && self.cost_usd == 0.0
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
        self.cost_usd += rhs.cost_usd;
    }
}
