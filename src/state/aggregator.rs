//! Session event aggregation
//!
//! [`SessionAggregator`] folds inbound session events and locally sent user
//! messages into an ordered conversation. Deltas, tool calls and the pending
//! approval of the turn in progress are buffered until `message.complete`
//! turns them into one assistant message.

use tracing::debug;

use crate::models::{ApprovalRequest, ChatMessage, ToolCall, Usage};
use crate::websocket::messages::InboundEvent;

#[derive(Debug, Clone, Default)]
pub struct SessionAggregator {
    session_id: Option<String>,
    messages: Vec<ChatMessage>,
    /// Streamed text of the assistant turn in progress
    current_message: String,
    /// Tool calls of the turn in progress, in start order
    tool_calls: Vec<ToolCall>,
    /// Single approval slot; a later request replaces an earlier one
    pending_approval: Option<ApprovalRequest>,
    usage: Usage,
    is_streaming: bool,
}

impl SessionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one inbound event.
    ///
    /// Returns `true` if the conversation state changed. Cost alerts, session
    /// ends, auth and error events are left to observers.
    pub fn apply(&mut self, event: &InboundEvent) -> bool {
        match event {
            InboundEvent::SessionCreated(created) => {
                debug!("Session created: {}", created.session_id);
                self.session_id = Some(created.session_id.clone());
                true
            }
            InboundEvent::ContentDelta(delta) => {
                self.current_message.push_str(&delta.text);
                self.is_streaming = true;
                true
            }
            InboundEvent::ToolStart(start) => {
                let call = ToolCall::pending(&start.tool_call_id, &start.tool, start.input.clone());
                match self.tool_call_mut(&start.tool_call_id) {
                    Some(existing) => *existing = call,
                    None => self.tool_calls.push(call),
                }
                true
            }
            InboundEvent::ToolComplete(complete) => {
                match self.tool_call_mut(&complete.tool_call_id) {
                    Some(call) => {
                        call.complete(complete.success, complete.output.clone(), complete.duration_ms);
                        true
                    }
                    None => {
                        debug!(
                            "Ignoring completion for unknown tool call {}",
                            complete.tool_call_id
                        );
                        false
                    }
                }
            }
            InboundEvent::ApprovalRequired(required) => {
                if let Some(previous) = &self.pending_approval {
                    debug!(
                        "Approval {} replaces pending approval {}",
                        required.approval_id, previous.id
                    );
                }
                self.pending_approval = Some(ApprovalRequest::pending(
                    &required.approval_id,
                    &required.tool,
                    required.action.clone(),
                ));
                true
            }
            InboundEvent::MessageComplete(complete) => {
                let message = ChatMessage::assistant(
                    &complete.message_id,
                    std::mem::take(&mut self.current_message),
                    std::mem::take(&mut self.tool_calls),
                    self.pending_approval.take(),
                );
                self.messages.push(message);
                self.usage += complete.usage;
                self.is_streaming = false;
                true
            }
            InboundEvent::CostAlert(_)
            | InboundEvent::SessionEnded(_)
            | InboundEvent::AuthSuccess
            | InboundEvent::Error(_) => false,
        }
    }

    fn tool_call_mut(&mut self, id: &str) -> Option<&mut ToolCall> {
        self.tool_calls.iter_mut().find(|call| call.id == id)
    }

    /// Append a locally authored user message.
    pub fn push_user_message(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.messages.push(ChatMessage::user(content));
        &self.messages[self.messages.len() - 1]
    }

    /// Forget the conversation, the turn in progress, usage and session id.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn current_message(&self) -> &str {
        &self.current_message
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.tool_calls
    }

    pub fn pending_tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.tool_calls.iter().filter(|call| call.is_pending())
    }

    pub fn pending_approval(&self) -> Option<&ApprovalRequest> {
        self.pending_approval.as_ref()
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }

    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }
}
