//! Cost and usage endpoints.

use std::collections::HashMap;

use super::client::{segment, ApiClient};
use crate::error::FomoResult;
use crate::models::{CostAlert, DashboardOverview, UsagePeriod, UsageRecord, UsageSummary};

/// Filters for [`ApiClient::project_usage`]. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default)]
pub struct UsageParams {
    pub period: Option<UsagePeriod>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub agent_id: Option<String>,
}

impl UsageParams {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(period) = self.period {
            query.push(("period", period.as_str().to_string()));
        }
        if let Some(start) = &self.start_date {
            query.push(("startDate", start.clone()));
        }
        if let Some(end) = &self.end_date {
            query.push(("endDate", end.clone()));
        }
        if let Some(agent_id) = &self.agent_id {
            query.push(("agentId", agent_id.clone()));
        }
        query
    }
}

impl ApiClient {
    pub async fn project_usage(
        &self,
        project_id: &str,
        params: &UsageParams,
    ) -> FomoResult<UsageSummary> {
        let path = format!("/projects/{}/usage", segment(project_id));
        self.get_with_query(&path, &params.query()).await
    }

    /// Usage records keyed by agent id.
    pub async fn project_usage_by_agent(
        &self,
        project_id: &str,
        period: Option<UsagePeriod>,
    ) -> FomoResult<HashMap<String, Vec<UsageRecord>>> {
        let path = format!("/projects/{}/usage/by-agent", segment(project_id));
        let query: Vec<(&str, String)> = period
            .map(|p| vec![("period", p.as_str().to_string())])
            .unwrap_or_default();
        self.get_with_query(&path, &query).await
    }

    pub async fn dashboard_overview(&self) -> FomoResult<DashboardOverview> {
        self.get("/dashboard/overview").await
    }

    pub async fn cost_alerts(&self, project_id: Option<&str>) -> FomoResult<Vec<CostAlert>> {
        let query: Vec<(&str, String)> = project_id
            .map(|id| vec![("projectId", id.to_string())])
            .unwrap_or_default();
        self.get_with_query("/cost-alerts", &query).await
    }

    pub async fn acknowledge_cost_alert(&self, alert_id: &str) -> FomoResult<CostAlert> {
        let path = format!("/cost-alerts/{}/acknowledge", segment(alert_id));
        self.post::<CostAlert, ()>(&path, None).await
    }
}
