//! In-memory `PlanStore`.
//!
//! Plans are kept as serialized JSON documents, the same shape a document
//! database would hold.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::planner::AssessmentPlan;
use crate::store::traits::{PlanStore, PlanSummary};

#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    documents: RwLock<HashMap<Uuid, String>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn decode(raw: &str) -> Result<AssessmentPlan, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn save_plan(&self, plan: &AssessmentPlan) -> Result<(), StoreError> {
        let raw =
            serde_json::to_string(plan).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.documents.write().await.insert(plan.plan_id, raw);
        debug!(plan_id = %plan.plan_id, scope = %plan.scope, "Plan saved");
        Ok(())
    }

    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<AssessmentPlan>, StoreError> {
        self.documents
            .read()
            .await
            .get(&plan_id)
            .map(|raw| decode(raw))
            .transpose()
    }

    async fn list_plans(&self, scope: &str) -> Result<Vec<PlanSummary>, StoreError> {
        let documents = self.documents.read().await;
        let mut summaries = Vec::new();
        for raw in documents.values() {
            let plan = decode(raw)?;
            if plan.scope == scope {
                summaries.push(PlanSummary::from(&plan));
            }
        }
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlannerConfig;
    use crate::planner::{AssessmentPlanner, PlanAssembler, WaveScheduler};
    use crate::resource::Resource;
    use std::collections::BTreeMap;

    fn plan(scope: &str) -> AssessmentPlan {
        let resources = vec![Resource::new("vm1", "Microsoft.Compute/virtualMachines")];
        let schedule = WaveScheduler.schedule(&BTreeMap::new());
        PlanAssembler::new(60).assemble(scope, "full", &resources, schedule)
    }

    #[tokio::test]
    async fn save_then_get() {
        let store = InMemoryPlanStore::new();
        let plan = plan("/subscriptions/a");
        store.save_plan(&plan).await.unwrap();

        let loaded = store.get_plan(plan.plan_id).await.unwrap().unwrap();
        assert_eq!(loaded, plan);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn missing_plan() {
        let store = InMemoryPlanStore::new();
        let id = Uuid::new_v4();
        assert!(store.get_plan(id).await.unwrap().is_none());
        let err = store.require_plan(id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn list_filters_by_scope() {
        let store = InMemoryPlanStore::new();
        let first = plan("/subscriptions/a");
        let other = plan("/subscriptions/b");
        let second = plan("/subscriptions/a");
        for p in [&first, &other, &second] {
            store.save_plan(p).await.unwrap();
        }

        let listed = store.list_plans("/subscriptions/a").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
        assert!(listed.iter().all(|s| s.scope == "/subscriptions/a"));
    }

    #[tokio::test]
    async fn stored_plans_read_back_identical() {
        let types = [
            "Microsoft.Compute/virtualMachines",
            "Microsoft.KeyVault/vaults",
            "Microsoft.Storage/storageAccounts",
            "Microsoft.Web/serverFarms",
            "Microsoft.Compute/disks",
            "Microsoft.Logic/workflows",
            "Microsoft.ContainerService/managedClusters",
            "Microsoft.EventGrid/topics",
            "Contoso.Custom/widget",
        ];
        let planner = AssessmentPlanner::from_config(&PlannerConfig::default()).unwrap();
        let store = InMemoryPlanStore::new();

        // Every non-empty mix of the types above, so efficiencies hit many ratios.
        for mask in 1u32..(1 << types.len()) {
            let resources: Vec<Resource> = types
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(bit, resource_type)| Resource::new(format!("r{bit}"), *resource_type))
                .collect();
            let plan = planner
                .plan_for_resources("/subscriptions/a", "full", &resources)
                .unwrap();
            store.save_plan(&plan).await.unwrap();

            let loaded = store.require_plan(plan.plan_id).await.unwrap();
            assert_eq!(
                loaded.parallelization_efficiency.to_bits(),
                plan.parallelization_efficiency.to_bits(),
                "mask {mask:#b}"
            );
            assert_eq!(loaded, plan, "mask {mask:#b}");
        }
    }

    #[tokio::test]
    async fn saving_again_replaces() {
        let store = InMemoryPlanStore::new();
        let mut plan = plan("/subscriptions/a");
        store.save_plan(&plan).await.unwrap();
        plan.assessment_type = "security".into();
        store.save_plan(&plan).await.unwrap();

        assert_eq!(store.len().await, 1);
        let loaded = store.require_plan(plan.plan_id).await.unwrap();
        assert_eq!(loaded.assessment_type, "security");
    }
}
