//! Wave executor. Runs an assessment plan against a worker runtime.
//!
//! Waves run one after another. Inside a wave every assignment is its own
//! task in a `JoinSet`, bounded by a semaphore, each under its own timeout.
//! The wave is joined in full before the next one starts; a failed, timed
//! out or panicked assignment only fills its own outcome slot.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::Severity;
use crate::config::PlannerConfig;
use crate::error::ExecutionError;
use crate::planner::{AssessmentPlan, ExecutionWave, WorkerAssignment};
use crate::resource::Resource;
use crate::workers::WorkerType;

/// A single issue reported by a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub resource_id: String,
    pub check: String,
    pub severity: Severity,
    pub message: String,
}

/// Input handed to a worker for one assignment.
#[derive(Debug, Clone)]
pub struct WorkerTask {
    pub plan_id: Uuid,
    pub wave_index: u32,
    pub worker_type: WorkerType,
    /// Resolved resources; ids missing from the batch are skipped.
    pub resources: Vec<Resource>,
    pub checks: Vec<String>,
    /// Sub-resource kinds the worker inspects alongside `resources`.
    pub related_resources: &'static [&'static str],
    pub dependencies: BTreeSet<WorkerType>,
}

/// Input for the trailing correlation wave.
#[derive(Debug, Clone)]
pub struct CorrelationRequest {
    pub plan_id: Uuid,
    pub candidate_rules: Vec<String>,
    /// Every finding from the earlier waves, keyed by resource id.
    pub findings: BTreeMap<String, Vec<Finding>>,
}

/// Where assessments actually happen.
#[async_trait]
pub trait WorkerRuntime: Send + Sync {
    async fn assess(&self, task: WorkerTask) -> Result<Vec<Finding>, String>;

    async fn correlate(&self, request: CorrelationRequest) -> Result<Vec<Finding>, String>;
}

/// Result slot of one assignment.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub worker_type: WorkerType,
    pub wave_index: u32,
    pub elapsed: Duration,
    pub result: Result<Vec<Finding>, ExecutionError>,
}

impl WorkerOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn findings(&self) -> &[Finding] {
        self.result.as_deref().unwrap_or_default()
    }
}

/// Everything observed while executing a plan.
#[derive(Debug)]
pub struct ExecutionReport {
    pub plan_id: Uuid,
    pub outcomes: BTreeMap<WorkerType, WorkerOutcome>,
    pub waves_completed: u32,
    /// Set when cancellation stopped the run before its last wave.
    pub cancelled: bool,
}

impl ExecutionReport {
    fn new(plan_id: Uuid) -> Self {
        Self {
            plan_id,
            outcomes: BTreeMap::new(),
            waves_completed: 0,
            cancelled: false,
        }
    }

    pub fn outcome(&self, worker_type: WorkerType) -> Option<&WorkerOutcome> {
        self.outcomes.get(&worker_type)
    }

    pub fn failures(&self) -> impl Iterator<Item = &WorkerOutcome> {
        self.outcomes.values().filter(|o| !o.is_success())
    }

    /// Findings from the regular waves, keyed by resource id.
    pub fn findings_by_resource(&self) -> BTreeMap<String, Vec<Finding>> {
        let mut by_resource: BTreeMap<String, Vec<Finding>> = BTreeMap::new();
        for (worker_type, outcome) in &self.outcomes {
            if *worker_type == WorkerType::CrossResourceAnalysis {
                continue;
            }
            for finding in outcome.findings() {
                by_resource
                    .entry(finding.resource_id.clone())
                    .or_default()
                    .push(finding.clone());
            }
        }
        by_resource
    }

    /// Findings produced by the correlation wave.
    pub fn correlated_findings(&self) -> &[Finding] {
        self.outcome(WorkerType::CrossResourceAnalysis)
            .map(WorkerOutcome::findings)
            .unwrap_or_default()
    }
}

enum Unit {
    Assess(WorkerTask),
    Correlate(CorrelationRequest),
}

type UnitResult = (WorkerType, Duration, Result<Vec<Finding>, ExecutionError>);

/// Runs plans wave by wave.
#[derive(Debug, Clone)]
pub struct WaveExecutor {
    worker_timeout: Duration,
    max_concurrent_workers: usize,
}

impl WaveExecutor {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            worker_timeout: config.worker_timeout,
            max_concurrent_workers: config.max_concurrent_workers.max(1),
        }
    }

    /// Execute every wave of `plan`.
    ///
    /// `cancel` is checked before each wave is launched; a running wave is
    /// always joined in full.
    pub async fn execute(
        &self,
        plan: &AssessmentPlan,
        resources: &[Resource],
        runtime: Arc<dyn WorkerRuntime>,
        cancel: CancellationToken,
    ) -> Result<ExecutionReport, ExecutionError> {
        if plan.is_empty() {
            return Err(ExecutionError::EmptyPlan {
                plan_id: plan.plan_id,
            });
        }

        let by_id: HashMap<&str, &Resource> =
            resources.iter().map(|r| (r.id.as_str(), r)).collect();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_workers));
        let mut report = ExecutionReport::new(plan.plan_id);

        info!(plan_id = %plan.plan_id, waves = plan.waves.len(), "Executing plan");

        for wave in &plan.waves {
            if cancel.is_cancelled() {
                info!(plan_id = %plan.plan_id, wave = wave.wave_index, "Execution cancelled");
                report.cancelled = true;
                break;
            }

            let units = if wave.is_correlation() {
                vec![Unit::Correlate(CorrelationRequest {
                    plan_id: plan.plan_id,
                    candidate_rules: plan.candidate_rules.clone(),
                    findings: report.findings_by_resource(),
                })]
            } else {
                wave.assignments
                    .values()
                    .map(|assignment| Unit::Assess(task_for(plan, wave, assignment, &by_id)))
                    .collect()
            };

            let started = Instant::now();
            for (worker_type, elapsed, result) in
                self.run_wave(units, &runtime, &semaphore).await
            {
                match &result {
                    Ok(findings) => debug!(
                        worker = %worker_type,
                        findings = findings.len(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Worker finished"
                    ),
                    Err(e) => warn!(worker = %worker_type, error = %e, "Worker failed"),
                }
                report.outcomes.insert(
                    worker_type,
                    WorkerOutcome {
                        worker_type,
                        wave_index: wave.wave_index,
                        elapsed,
                        result,
                    },
                );
            }
            report.waves_completed += 1;

            info!(
                wave = wave.wave_index,
                assignments = wave.assignments.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Wave complete"
            );
        }

        Ok(report)
    }

    async fn run_wave(
        &self,
        units: Vec<Unit>,
        runtime: &Arc<dyn WorkerRuntime>,
        semaphore: &Arc<Semaphore>,
    ) -> Vec<UnitResult> {
        let mut set = JoinSet::new();
        let mut owners = HashMap::new();

        for unit in units {
            let worker_type = match &unit {
                Unit::Assess(task) => task.worker_type,
                Unit::Correlate(_) => WorkerType::CrossResourceAnalysis,
            };
            let runtime = Arc::clone(runtime);
            let semaphore = Arc::clone(semaphore);
            let timeout = self.worker_timeout;

            let handle = set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        let error = ExecutionError::WorkerFailed {
                            worker: worker_type.to_string(),
                            reason: e.to_string(),
                        };
                        return (worker_type, Duration::ZERO, Err(error));
                    }
                };

                let started = Instant::now();
                let run = async move {
                    match unit {
                        Unit::Assess(task) => runtime.assess(task).await,
                        Unit::Correlate(request) => runtime.correlate(request).await,
                    }
                };
                let result = match tokio::time::timeout(timeout, run).await {
                    Ok(Ok(findings)) => Ok(findings),
                    Ok(Err(reason)) => Err(ExecutionError::WorkerFailed {
                        worker: worker_type.to_string(),
                        reason,
                    }),
                    Err(_) => Err(ExecutionError::Timeout {
                        worker: worker_type.to_string(),
                        timeout,
                    }),
                };
                (worker_type, started.elapsed(), result)
            });
            owners.insert(handle.id(), worker_type);
        }

        let mut results = Vec::with_capacity(owners.len());
        while let Some(joined) = set.join_next_with_id().await {
            match joined {
                Ok((_, result)) => results.push(result),
                Err(e) => {
                    let Some(worker_type) = owners.get(&e.id()).copied() else {
                        continue;
                    };
                    let error = ExecutionError::WorkerPanicked {
                        worker: worker_type.to_string(),
                        reason: e.to_string(),
                    };
                    results.push((worker_type, Duration::ZERO, Err(error)));
                }
            }
        }
        results
    }
}

fn task_for(
    plan: &AssessmentPlan,
    wave: &ExecutionWave,
    assignment: &WorkerAssignment,
    by_id: &HashMap<&str, &Resource>,
) -> WorkerTask {
    WorkerTask {
        plan_id: plan.plan_id,
        wave_index: wave.wave_index,
        worker_type: assignment.worker_type,
        resources: assignment
            .resources
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).map(|r| (*r).clone()))
            .collect(),
        checks: assignment.checks.clone(),
        related_resources: assignment.worker_type.capabilities().related_resources,
        dependencies: assignment.dependencies.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::AssessmentPlanner;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct StubRuntime {
        fail: Option<WorkerType>,
        hang: Option<WorkerType>,
        panic: Option<WorkerType>,
        seen: Mutex<Vec<WorkerType>>,
        correlations: Mutex<Vec<CorrelationRequest>>,
    }

    #[async_trait]
    impl WorkerRuntime for StubRuntime {
        async fn assess(&self, task: WorkerTask) -> Result<Vec<Finding>, String> {
            self.seen.lock().unwrap().push(task.worker_type);
            if self.panic == Some(task.worker_type) {
                panic!("worker blew up");
            }
            if self.hang == Some(task.worker_type) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            if self.fail == Some(task.worker_type) {
                return Err("api unavailable".into());
            }
            Ok(task
                .resources
                .iter()
                .map(|r| Finding {
                    resource_id: r.id.clone(),
                    check: task.checks[0].clone(),
                    severity: Severity::Medium,
                    message: format!("{} checked", r.id),
                })
                .collect())
        }

        async fn correlate(&self, request: CorrelationRequest) -> Result<Vec<Finding>, String> {
            let total = request.findings.values().map(Vec::len).sum::<usize>();
            self.correlations.lock().unwrap().push(request);
            Ok(vec![Finding {
                resource_id: "*".into(),
                check: "cross_resource_correlation".into(),
                severity: Severity::High,
                message: format!("{total} findings correlated"),
            }])
        }
    }

    fn resources() -> Vec<Resource> {
        vec![
            Resource::new("vm1", "Microsoft.Compute/virtualMachines"),
            Resource::new("kv1", "Microsoft.KeyVault/vaults"),
            Resource::new("fn1", "Microsoft.Web/sites").with_kind("functionapp"),
            Resource::new("w1", "Contoso.Custom/widget"),
        ]
    }

    fn plan(resources: &[Resource]) -> AssessmentPlan {
        AssessmentPlanner::from_config(&PlannerConfig::default())
            .unwrap()
            .plan_for_resources("sub", "full", resources)
            .unwrap()
    }

    fn executor(timeout: Duration) -> WaveExecutor {
        WaveExecutor::new(&PlannerConfig {
            worker_timeout: timeout,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn runs_every_wave_and_feeds_correlation() {
        let resources = resources();
        let plan = plan(&resources);
        let runtime = Arc::new(StubRuntime::default());

        let report = executor(Duration::from_secs(5))
            .execute(&plan, &resources, runtime.clone(), CancellationToken::new())
            .await
            .unwrap();

        assert!(!report.cancelled);
        assert_eq!(report.waves_completed as usize, plan.waves.len());
        assert_eq!(report.failures().count(), 0);
        assert_eq!(report.findings_by_resource().len(), 4);

        let correlations = runtime.correlations.lock().unwrap();
        assert_eq!(correlations.len(), 1);
        assert_eq!(correlations[0].findings.len(), 4);
        assert_eq!(correlations[0].candidate_rules, plan.candidate_rules);
        assert_eq!(report.correlated_findings()[0].message, "4 findings correlated");
    }

    #[tokio::test]
    async fn failure_does_not_cancel_siblings() {
        let resources = resources();
        let plan = plan(&resources);
        let runtime = Arc::new(StubRuntime {
            fail: Some(WorkerType::VmAssessment),
            ..Default::default()
        });

        let report = executor(Duration::from_secs(5))
            .execute(&plan, &resources, runtime, CancellationToken::new())
            .await
            .unwrap();

        let vm = report.outcome(WorkerType::VmAssessment).unwrap();
        assert!(matches!(vm.result, Err(ExecutionError::WorkerFailed { .. })));
        assert!(report.outcome(WorkerType::KeyVaultAssessment).unwrap().is_success());
        assert!(report.outcome(WorkerType::CrossResourceAnalysis).unwrap().is_success());
        assert_eq!(report.failures().count(), 1);
    }

    #[tokio::test]
    async fn timeout_and_panic_fill_their_own_slots() {
        let resources = resources();
        let plan = plan(&resources);
        let runtime = Arc::new(StubRuntime {
            hang: Some(WorkerType::KeyVaultAssessment),
            panic: Some(WorkerType::GenericResourceAssessment),
            ..Default::default()
        });

        let report = executor(Duration::from_millis(50))
            .execute(&plan, &resources, runtime, CancellationToken::new())
            .await
            .unwrap();

        let kv = report.outcome(WorkerType::KeyVaultAssessment).unwrap();
        assert!(matches!(kv.result, Err(ExecutionError::Timeout { .. })));
        let generic = report.outcome(WorkerType::GenericResourceAssessment).unwrap();
        assert!(matches!(generic.result, Err(ExecutionError::WorkerPanicked { .. })));
        assert!(report.outcome(WorkerType::VmAssessment).unwrap().is_success());
        assert_eq!(report.waves_completed as usize, plan.waves.len());
    }

    #[tokio::test]
    async fn cancellation_is_checked_before_each_wave() {
        let resources = resources();
        let plan = plan(&resources);
        let runtime = Arc::new(StubRuntime::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = executor(Duration::from_secs(5))
            .execute(&plan, &resources, runtime.clone(), cancel)
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.waves_completed, 0);
        assert!(report.outcomes.is_empty());
        assert!(runtime.seen.lock().unwrap().is_empty());
    }

    /// Records when each worker ran and how many were active at once.
    #[derive(Default)]
    struct TimingRuntime {
        slow: Option<WorkerType>,
        active: AtomicUsize,
        peak: AtomicUsize,
        spans: Mutex<HashMap<WorkerType, (Instant, Instant)>>,
        related: Mutex<HashMap<WorkerType, usize>>,
    }

    impl TimingRuntime {
        async fn record(&self, worker_type: WorkerType) {
            let started = Instant::now();
            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now_active, Ordering::SeqCst);
            let pause = if self.slow == Some(worker_type) { 300 } else { 100 };
            tokio::time::sleep(Duration::from_millis(pause)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.spans
                .lock()
                .unwrap()
                .insert(worker_type, (started, Instant::now()));
        }

        fn span(&self, worker_type: WorkerType) -> (Instant, Instant) {
            self.spans.lock().unwrap()[&worker_type]
        }
    }

    #[async_trait]
    impl WorkerRuntime for TimingRuntime {
        async fn assess(&self, task: WorkerTask) -> Result<Vec<Finding>, String> {
            self.related
                .lock()
                .unwrap()
                .insert(task.worker_type, task.related_resources.len());
            self.record(task.worker_type).await;
            Ok(Vec::new())
        }

        async fn correlate(&self, _request: CorrelationRequest) -> Result<Vec<Finding>, String> {
            self.record(WorkerType::CrossResourceAnalysis).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn wave_members_overlap_and_next_wave_waits_for_slowest() {
        let resources = vec![
            Resource::new("vm1", "Microsoft.Compute/virtualMachines"),
            Resource::new("kv1", "Microsoft.KeyVault/vaults"),
            Resource::new("sa1", "Microsoft.Storage/storageAccounts"),
            Resource::new("fn1", "Microsoft.Web/sites").with_kind("functionapp"),
            Resource::new("w1", "Contoso.Custom/widget"),
        ];
        let plan = plan(&resources);
        let first: Vec<WorkerType> = plan.waves[0].assignments.keys().copied().collect();
        assert_eq!(first.len(), 3);
        assert!(first.contains(&WorkerType::VmAssessment));
        let later: Vec<WorkerType> = plan.waves[2..4]
            .iter()
            .flat_map(|w| w.assignments.keys().copied())
            .collect();
        assert!(later.contains(&WorkerType::FunctionsAssessment));
        assert!(later.contains(&WorkerType::GenericResourceAssessment));

        let runtime = Arc::new(TimingRuntime {
            slow: Some(WorkerType::VmAssessment),
            ..Default::default()
        });
        let report = executor(Duration::from_secs(5))
            .execute(&plan, &resources, runtime.clone(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.failures().count(), 0);

        // All three wave-1 workers were in flight together.
        assert!(runtime.peak.load(Ordering::SeqCst) >= 3);
        let (vm_start, vm_finish) = runtime.span(WorkerType::VmAssessment);
        for worker in first.iter().filter(|w| **w != WorkerType::VmAssessment) {
            let (start, finish) = runtime.span(*worker);
            assert!(start < vm_finish, "{worker} did not overlap the slow worker");
            assert!(finish < vm_finish);
            assert!(vm_start < finish);
        }

        let wave_one_done = first.iter().map(|w| runtime.span(*w).1).max().unwrap();
        for worker in &later {
            let (start, _) = runtime.span(*worker);
            assert!(start >= wave_one_done, "{worker} started before wave 1 finished");
            assert!(start >= vm_finish);
        }
        let last_regular = later.iter().map(|w| runtime.span(*w).1).max().unwrap();
        let (correlation_start, _) = runtime.span(WorkerType::CrossResourceAnalysis);
        assert!(correlation_start >= last_regular);

        let related = runtime.related.lock().unwrap();
        assert!(related[&WorkerType::VmAssessment] > 0);
    }

    #[tokio::test]
    async fn empty_plan_is_rejected() {
        let plan = plan(&[]);
        let err = executor(Duration::from_secs(5))
            .execute(&plan, &[], Arc::new(StubRuntime::default()), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::EmptyPlan { .. }));
    }
}
