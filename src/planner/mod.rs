//! Assessment planning pipeline.
//!
//! ```text
//! resources ─► DependencyGraphBuilder ─► ResourceGraph
//!     │                                      │
//!     └──────────► AgentAssigner ◄───────────┘
//!                      │
//!                      ▼
//!                WaveScheduler ─► PlanAssembler ─► AssessmentPlan ─► PlanStore
//! ```
//!
//! `AssessmentPlanner` wires the stages together with discovery and storage.

pub mod assigner;
pub mod graph;
pub mod plan;
pub mod scheduler;

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::catalog::{Catalogs, CorrelationRule};
use crate::config::PlannerConfig;
use crate::discovery::ResourceDiscovery;
use crate::error::{CatalogError, DiscoveryError, PlanError, Result, StoreError};
use crate::resource::Resource;
use crate::store::{PlanStore, PlanSummary};

pub use assigner::AgentAssigner;
pub use graph::{DependencyGraphBuilder, ExtractionRule, NodeRef, PropertyPath, ResourceGraph};
pub use plan::{AssessmentPlan, ExecutionWave, PlanAssembler, WorkerAssignment};
pub use scheduler::{REGULAR_WAVES, Schedule, WaveScheduler};

/// Plan-creation façade over the pipeline stages.
pub struct AssessmentPlanner {
    catalogs: Catalogs,
    graph_builder: DependencyGraphBuilder,
    assigner: AgentAssigner,
    scheduler: WaveScheduler,
    assembler: PlanAssembler,
    discovery: Option<Arc<dyn ResourceDiscovery>>,
    store: Option<Arc<dyn PlanStore>>,
}

impl AssessmentPlanner {
    pub fn new(config: &PlannerConfig, catalogs: Catalogs) -> Self {
        Self {
            catalogs,
            graph_builder: DependencyGraphBuilder::with_default_rules(),
            assigner: AgentAssigner::new(),
            scheduler: WaveScheduler,
            assembler: PlanAssembler::new(config.correlation_seconds()),
            discovery: None,
            store: None,
        }
    }

    /// Load the catalogs named by `config` and build a planner over them.
    pub fn from_config(config: &PlannerConfig) -> std::result::Result<Self, CatalogError> {
        Ok(Self::new(config, Catalogs::load(config)?))
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn ResourceDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn PlanStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_graph_builder(mut self, graph_builder: DependencyGraphBuilder) -> Self {
        self.graph_builder = graph_builder;
        self
    }

    pub fn with_assigner(mut self, assigner: AgentAssigner) -> Self {
        self.assigner = assigner;
        self
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn graph(&self, resources: &[Resource]) -> ResourceGraph {
        self.graph_builder.build(resources)
    }

    /// Run the pipeline over an already-discovered batch.
    ///
    /// An empty batch yields a plan with no waves and no correlation step.
    pub fn plan_for_resources(
        &self,
        scope: &str,
        assessment_type: &str,
        resources: &[Resource],
    ) -> std::result::Result<AssessmentPlan, PlanError> {
        if resources.is_empty() {
            info!(scope = %scope, "No resources discovered, returning empty plan");
        }

        let graph = self.graph_builder.build(resources);
        let assignments = self.assigner.assign(resources, &graph);
        let schedule = self.scheduler.schedule(&assignments);
        let mut plan = self
            .assembler
            .assemble(scope, assessment_type, resources, schedule);
        self.assembler
            .add_correlation_step(&mut plan, &self.catalogs.rules)?;
        Ok(plan)
    }

    /// Discover the scope, plan it, and persist the plan when a store is set.
    pub async fn create_assessment_plan(
        &self,
        scope: &str,
        assessment_type: &str,
    ) -> Result<AssessmentPlan> {
        let discovery = self
            .discovery
            .as_ref()
            .ok_or_else(|| DiscoveryError::Unavailable("no discovery source configured".into()))?;
        let resources = discovery.discover(scope).await?;
        let plan = self.plan_for_resources(scope, assessment_type, &resources)?;

        if let Some(store) = &self.store {
            store.save_plan(&plan).await?;
        }
        Ok(plan)
    }

    pub async fn get_plan(&self, plan_id: Uuid) -> Result<AssessmentPlan> {
        Ok(self.store()?.require_plan(plan_id).await?)
    }

    pub async fn list_plans(&self, scope: &str) -> Result<Vec<PlanSummary>> {
        Ok(self.store()?.list_plans(scope).await?)
    }

    /// Shortest category chain between two resource types.
    pub fn find_relationship_chain(&self, start: &str, end: &str) -> Vec<String> {
        self.catalogs.relationships.find_chain(start, end)
    }

    /// Rules worth evaluating for a set of resource types.
    pub fn applicable_rules<I, S>(&self, resource_types: I) -> Vec<&CorrelationRule>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.catalogs
            .rules
            .candidate_rules_for_resource_types(resource_types)
    }

    fn store(&self) -> std::result::Result<&Arc<dyn PlanStore>, StoreError> {
        self.store
            .as_ref()
            .ok_or_else(|| StoreError::Backend("no plan store configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::StaticDiscovery;
    use crate::error::Error;
    use crate::store::InMemoryPlanStore;
    use crate::workers::WorkerType;

    fn planner() -> AssessmentPlanner {
        let config = PlannerConfig::default();
        AssessmentPlanner::from_config(&config).unwrap()
    }

    #[test]
    fn vm_and_key_vault_share_first_wave() {
        let resources = vec![
            Resource::new("vm1", "Microsoft.Compute/virtualMachines"),
            Resource::new("kv1", "Microsoft.KeyVault/vaults"),
        ];
        let plan = planner().plan_for_resources("sub", "full", &resources).unwrap();

        let first = plan.wave(1).unwrap();
        assert_eq!(first.assignments.len(), 2);
        assert_eq!(first.estimated_time_seconds, 40);
        assert!(plan.waves[1..4].iter().all(ExecutionWave::is_empty));

        let correlation = plan.waves.last().unwrap();
        assert!(correlation.is_correlation());
        assert_eq!(correlation.wave_index, 5);
        let cross = &correlation.assignments[&WorkerType::CrossResourceAnalysis];
        assert_eq!(
            cross.dependencies.iter().copied().collect::<Vec<_>>(),
            vec![WorkerType::VmAssessment, WorkerType::KeyVaultAssessment]
        );
        assert_eq!(plan.estimated_total_time_seconds, 40 + 60);
        assert!(plan.correlation_step_added);
    }

    #[test]
    fn empty_batch_gives_empty_plan() {
        let plan = planner().plan_for_resources("sub", "full", &[]).unwrap();
        assert!(plan.is_empty());
        assert!(!plan.correlation_step_added);
        assert_eq!(plan.total_resources, 0);
    }

    #[test]
    fn configured_correlation_time_is_used() {
        let config = PlannerConfig {
            correlation_analysis_time: std::time::Duration::from_secs(90),
            ..Default::default()
        };
        let planner = AssessmentPlanner::from_config(&config).unwrap();
        let resources = vec![Resource::new("vm1", "Microsoft.Compute/virtualMachines")];
        let plan = planner.plan_for_resources("sub", "full", &resources).unwrap();
        assert_eq!(plan.waves.last().unwrap().estimated_time_seconds, 90);
    }

    #[tokio::test]
    async fn create_discovers_and_stores() {
        let store = Arc::new(InMemoryPlanStore::new());
        let discovery = Arc::new(StaticDiscovery::new(vec![Resource::new(
            "w1",
            "Contoso.Custom/widget",
        )]));
        let planner = planner().with_discovery(discovery).with_store(store.clone());

        let plan = planner.create_assessment_plan("sub", "full").await.unwrap();
        assert_eq!(plan.wave_of(WorkerType::GenericResourceAssessment), Some(3));

        let loaded = planner.get_plan(plan.plan_id).await.unwrap();
        assert_eq!(loaded.plan_id, plan.plan_id);
        assert_eq!(planner.list_plans("sub").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_without_discovery_fails() {
        let err = planner()
            .create_assessment_plan("sub", "full")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Discovery(DiscoveryError::Unavailable(_))));
    }

    #[test]
    fn relationship_queries_pass_through() {
        let planner = planner();
        let chain =
            planner.find_relationship_chain("Microsoft.Web/sites", "Microsoft.Web/sites");
        assert_eq!(chain, vec!["Microsoft.Web/sites"]);
        let rules = planner.applicable_rules(["Microsoft.Compute/virtualMachines"]);
        assert!(!rules.is_empty());
    }
}
