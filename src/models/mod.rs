//! Data models shared by the session client, the REST client and the CLI.

pub mod chat;
pub mod resources;

pub use chat::{ApprovalRequest, ApprovalStatus, ChatMessage, Role, ToolCall, ToolCallStatus, Usage};
pub use resources::{
    Approval, ApprovalDecision, ApprovalState, CostAlert, CostAlertKind, DashboardOverview,
    Paginated, Session, SessionStatus, TraceEvent, TraceEventType, UsagePeriod, UsageRecord,
    UsageSummary,
};
