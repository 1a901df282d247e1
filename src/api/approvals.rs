//! Approval endpoints.

use super::client::{segment, ApiClient};
use crate::error::FomoResult;
use crate::models::{Approval, ApprovalDecision, ApprovalState, Paginated};

/// Filters for [`ApiClient::list_approvals`].
#[derive(Debug, Clone, Default)]
pub struct ApprovalListParams {
    pub project_id: Option<String>,
    pub agent_id: Option<String>,
    pub status: Option<ApprovalState>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ApprovalListParams {
    pub fn pending() -> Self {
        Self {
            status: Some(ApprovalState::Pending),
            ..Self::default()
        }
    }

    pub fn for_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(project_id) = &self.project_id {
            query.push(("projectId", project_id.clone()));
        }
        if let Some(agent_id) = &self.agent_id {
            query.push(("agentId", agent_id.clone()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset", offset.to_string()));
        }
        query
    }
}

impl ApiClient {
    pub async fn list_approvals(&self, params: &ApprovalListParams) -> FomoResult<Paginated<Approval>> {
        self.get_with_query("/approvals", &params.query()).await
    }

    pub async fn get_approval(&self, approval_id: &str) -> FomoResult<Approval> {
        self.get(&format!("/approvals/{}", segment(approval_id))).await
    }

    pub async fn decide_approval(
        &self,
        approval_id: &str,
        decision: &ApprovalDecision,
    ) -> FomoResult<Approval> {
        let path = format!("/approvals/{}/decide", segment(approval_id));
        self.post(&path, Some(decision)).await
    }

    pub async fn approve(&self, approval_id: &str, note: Option<String>) -> FomoResult<Approval> {
        self.decide_approval(approval_id, &ApprovalDecision { approved: true, note })
            .await
    }

    pub async fn deny(&self, approval_id: &str, note: Option<String>) -> FomoResult<Approval> {
        self.decide_approval(approval_id, &ApprovalDecision { approved: false, note })
            .await
    }

    /// Number of pending approvals, read from a one-item page.
    pub async fn pending_approvals_count(&self) -> FomoResult<u64> {
        let params = ApprovalListParams {
            limit: Some(1),
            ..ApprovalListParams::pending()
        };
        Ok(self.list_approvals(&params).await?.total)
    }
}
