//! Plan data model and assembly.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::CorrelationRuleBook;
use crate::error::PlanError;
use crate::planner::scheduler::Schedule;
use crate::resource::Resource;
use crate::workers::WorkerType;

/// Resources routed to one worker type, plus what it needs to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerAssignment {
    pub worker_type: WorkerType,
    pub resources: Vec<String>,
    pub priority: u8,
    /// Max of the per-resource base times; the resources run as one parallel unit.
    pub estimated_time_seconds: u32,
    /// Other worker types whose resources this one depends on.
    pub dependencies: BTreeSet<WorkerType>,
    /// Instance ids referenced by this assignment's resources, including
    /// ones outside the current batch.
    pub resource_dependencies: BTreeSet<String>,
    pub checks: Vec<String>,
}

impl WorkerAssignment {
    /// An empty assignment carrying the worker type's static priority and checks.
    pub fn new(worker_type: WorkerType) -> Self {
        let caps = worker_type.capabilities();
        Self {
            worker_type,
            resources: Vec::new(),
            priority: caps.priority,
            estimated_time_seconds: 0,
            dependencies: BTreeSet::new(),
            resource_dependencies: BTreeSet::new(),
            checks: caps.checks.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty() || !self.resource_dependencies.is_empty()
    }
}

/// Assignments that run concurrently; waves run one after another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionWave {
    /// Scheduling order, starting at 1.
    pub wave_index: u32,
    pub assignments: BTreeMap<WorkerType, WorkerAssignment>,
    pub estimated_time_seconds: u32,
}

impl ExecutionWave {
    pub fn new(wave_index: u32, assignments: BTreeMap<WorkerType, WorkerAssignment>) -> Self {
        let estimated_time_seconds = assignments
            .values()
            .map(|a| a.estimated_time_seconds)
            .max()
            .unwrap_or(0);
        Self {
            wave_index,
            assignments,
            estimated_time_seconds,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn is_correlation(&self) -> bool {
        self.assignments
            .contains_key(&WorkerType::CrossResourceAnalysis)
    }
}

/// A complete, executable assessment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentPlan {
    pub plan_id: Uuid,
    pub scope: String,
    pub assessment_type: String,
    pub created_at: DateTime<Utc>,
    pub waves: Vec<ExecutionWave>,
    pub total_worker_types: usize,
    pub total_resources: usize,
    /// Resource count per resource type.
    pub resource_type_counts: BTreeMap<String, usize>,
    pub estimated_total_time_seconds: u32,
    pub parallelization_efficiency: f64,
    pub correlation_step_added: bool,
    /// Names of rules worth evaluating in the correlation wave.
    #[serde(default)]
    pub candidate_rules: Vec<String>,
}

impl AssessmentPlan {
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    pub fn wave(&self, wave_index: u32) -> Option<&ExecutionWave> {
        self.waves.iter().find(|w| w.wave_index == wave_index)
    }

    /// Worker types used by the regular waves.
    pub fn worker_types(&self) -> BTreeSet<WorkerType> {
        self.waves
            .iter()
            .filter(|w| !w.is_correlation())
            .flat_map(|w| w.assignments.keys().copied())
            .collect()
    }

    pub fn assignment(&self, worker_type: WorkerType) -> Option<&WorkerAssignment> {
        self.waves
            .iter()
            .find_map(|w| w.assignments.get(&worker_type))
    }

    /// Wave that carries `worker_type`.
    pub fn wave_of(&self, worker_type: WorkerType) -> Option<u32> {
        self.waves
            .iter()
            .find(|w| w.assignments.contains_key(&worker_type))
            .map(|w| w.wave_index)
    }
}

/// Turns a schedule into a plan and appends the correlation wave.
#[derive(Debug, Clone)]
pub struct PlanAssembler {
    correlation_seconds: u32,
}

impl PlanAssembler {
    pub fn new(correlation_seconds: u32) -> Self {
        Self {
            correlation_seconds,
        }
    }

    /// Build the plan. An empty resource batch yields a plan with no waves.
    pub fn assemble(
        &self,
        scope: &str,
        assessment_type: &str,
        resources: &[Resource],
        schedule: Schedule,
    ) -> AssessmentPlan {
        let mut resource_type_counts = BTreeMap::new();
        for resource in resources {
            let key = if resource.resource_type.is_empty() {
                "(unknown)".to_string()
            } else {
                resource.resource_type.clone()
            };
            *resource_type_counts.entry(key).or_insert(0) += 1;
        }

        let (waves, estimated_total_time_seconds, parallelization_efficiency) =
            if resources.is_empty() {
                (Vec::new(), 0, 1.0)
            } else {
                (
                    schedule.waves,
                    schedule.estimated_total_time_seconds,
                    schedule.parallelization_efficiency,
                )
            };

        let total_worker_types = waves.iter().map(|w| w.assignments.len()).sum();
        let total_resources = waves
            .iter()
            .flat_map(|w| w.assignments.values())
            .map(|a| a.resources.len())
            .sum();

        let plan = AssessmentPlan {
            plan_id: Uuid::new_v4(),
            scope: scope.to_string(),
            assessment_type: assessment_type.to_string(),
            created_at: Utc::now(),
            waves,
            total_worker_types,
            total_resources,
            resource_type_counts,
            estimated_total_time_seconds,
            parallelization_efficiency,
            correlation_step_added: false,
            candidate_rules: Vec::new(),
        };

        info!(
            plan_id = %plan.plan_id,
            scope = %plan.scope,
            worker_types = plan.total_worker_types,
            resources = plan.total_resources,
            estimated_secs = plan.estimated_total_time_seconds,
            "Assessment plan assembled"
        );

        plan
    }

    /// Append the trailing cross-resource correlation wave.
    ///
    /// The wave's single assignment depends on every worker type in the plan.
    /// A plan with no waves is left as-is. Calling this twice is rejected and
    /// leaves the plan unchanged.
    pub fn add_correlation_step(
        &self,
        plan: &mut AssessmentPlan,
        rules: &CorrelationRuleBook,
    ) -> Result<(), PlanError> {
        if plan.correlation_step_added {
            warn!(plan_id = %plan.plan_id, "Correlation step already present");
            return Err(PlanError::CorrelationStepAlreadyAdded {
                plan_id: plan.plan_id,
            });
        }
        if plan.is_empty() {
            return Ok(());
        }

        let mut assignment = WorkerAssignment::new(WorkerType::CrossResourceAnalysis);
        assignment.dependencies = plan.worker_types();
        assignment.resources = plan
            .waves
            .iter()
            .flat_map(|w| w.assignments.values())
            .flat_map(|a| a.resources.iter().cloned())
            .collect();
        assignment.estimated_time_seconds = self.correlation_seconds;

        plan.candidate_rules = rules
            .candidate_rules_for_resource_types(plan.resource_type_counts.keys())
            .into_iter()
            .map(|rule| rule.name.clone())
            .collect();

        let wave_index = plan.waves.last().map(|w| w.wave_index + 1).unwrap_or(1);
        let wave = ExecutionWave::new(
            wave_index,
            BTreeMap::from([(WorkerType::CrossResourceAnalysis, assignment)]),
        );
        plan.estimated_total_time_seconds += wave.estimated_time_seconds;
        plan.waves.push(wave);
        plan.correlation_step_added = true;

        info!(
            plan_id = %plan.plan_id,
            wave = wave_index,
            candidate_rules = plan.candidate_rules.len(),
            "Correlation step added"
        );

        Ok(())
    }
}
