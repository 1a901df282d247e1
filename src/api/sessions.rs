//! Session endpoints.

use std::collections::HashMap;

use serde::Serialize;

use super::client::{segment, ApiClient};
use crate::error::FomoResult;
use crate::models::{Paginated, Session, SessionStatus, TraceEvent};

/// Filters for [`ApiClient::list_sessions`].
#[derive(Debug, Clone, Default)]
pub struct SessionListParams {
    pub agent_id: Option<String>,
    pub status: Option<SessionStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SessionListParams {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<HashMap<String, serde_json::Value>>,
}

impl ApiClient {
    pub async fn list_sessions(
        &self,
        project_id: &str,
        params: &SessionListParams,
    ) -> FomoResult<Paginated<Session>> {
        let path = format!("/projects/{}/sessions", segment(project_id));
        self.get_with_query(&path, &params.query()).await
    }

    pub async fn get_session(&self, project_id: &str, session_id: &str) -> FomoResult<Session> {
        self.get(&format!(
            "/projects/{}/sessions/{}",
            segment(project_id),
            segment(session_id)
        ))
        .await
    }

    pub async fn session_traces(
        &self,
        project_id: &str,
        session_id: &str,
        limit: Option<u32>,
    ) -> FomoResult<Vec<TraceEvent>> {
        let path = format!(
            "/projects/{}/sessions/{}/traces",
            segment(project_id),
            segment(session_id)
        );
        let query: Vec<(&str, String)> = limit
            .map(|limit| vec![("limit", limit.to_string())])
            .unwrap_or_default();
        self.get_with_query(&path, &query).await
    }

    pub async fn terminate_session(&self, project_id: &str, session_id: &str) -> FomoResult<Session> {
        let path = format!(
            "/projects/{}/sessions/{}/terminate",
            segment(project_id),
            segment(session_id)
        );
        self.post::<Session, ()>(&path, None).await
    }

    pub async fn create_session(
        &self,
        project_id: &str,
        agent_id: Option<String>,
        metadata: Option<HashMap<String, serde_json::Value>>,
    ) -> FomoResult<Session> {
        let path = format!("/projects/{}/sessions", segment(project_id));
        let body = CreateSessionBody { agent_id, metadata };
        self.post(&path, Some(&body)).await
    }
}
