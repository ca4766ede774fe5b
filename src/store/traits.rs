//! `PlanStore` trait: async interface for plan persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::planner::AssessmentPlan;

/// Listing entry for a stored plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub plan_id: Uuid,
    pub scope: String,
    pub assessment_type: String,
    pub created_at: DateTime<Utc>,
    pub total_resources: usize,
    pub waves: usize,
}

impl From<&AssessmentPlan> for PlanSummary {
    fn from(plan: &AssessmentPlan) -> Self {
        Self {
            plan_id: plan.plan_id,
            scope: plan.scope.clone(),
            assessment_type: plan.assessment_type.clone(),
            created_at: plan.created_at,
            total_resources: plan.total_resources,
            waves: plan.waves.len(),
        }
    }
}

/// Backend-agnostic plan store.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Insert or replace a plan, keyed by its id.
    async fn save_plan(&self, plan: &AssessmentPlan) -> Result<(), StoreError>;

    /// Get a plan by id.
    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<AssessmentPlan>, StoreError>;

    /// Plans for `scope`, newest first.
    async fn list_plans(&self, scope: &str) -> Result<Vec<PlanSummary>, StoreError>;

    /// Get a plan by id, failing with `NotFound` when absent.
    async fn require_plan(&self, plan_id: Uuid) -> Result<AssessmentPlan, StoreError> {
        self.get_plan(plan_id)
            .await?
            .ok_or(StoreError::NotFound(plan_id))
    }
}
