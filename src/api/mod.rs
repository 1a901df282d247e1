//! REST API client.
//!
//! - `client` - [`ApiClient`], request plumbing and error decoding
//! - `sessions`, `approvals`, `costs` - typed endpoints

pub mod approvals;
pub mod client;
pub mod costs;
pub mod sessions;

pub use approvals::ApprovalListParams;
pub use client::ApiClient;
pub use costs::UsageParams;
pub use sessions::SessionListParams;
