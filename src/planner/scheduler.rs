//! Wave scheduling for worker assignments.
//!
//! Assignments are bucketed into four fixed waves:
//!
//! 1. priority 1, no dependencies
//! 2. priority 1, with dependencies
//! 3. lower priority, no dependencies
//! 4. lower priority, with dependencies
//!
//! Every priority other than 1 (including the generic fallback's) lands in
//! the lower-priority waves, so no assignment is ever left unscheduled.

use std::collections::BTreeMap;

use tracing::debug;

use crate::planner::plan::{ExecutionWave, WorkerAssignment};
use crate::workers::WorkerType;

/// Number of regular (non-correlation) waves.
pub const REGULAR_WAVES: usize = 4;

/// Output of [`WaveScheduler::schedule`].
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub waves: Vec<ExecutionWave>,
    /// Sum of wave times: waves run sequentially.
    pub estimated_total_time_seconds: u32,
    pub parallelization_efficiency: f64,
}

/// Stateless wave scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveScheduler;

impl WaveScheduler {
    pub fn schedule(&self, assignments: &BTreeMap<WorkerType, WorkerAssignment>) -> Schedule {
        let mut buckets: [BTreeMap<WorkerType, WorkerAssignment>; REGULAR_WAVES] =
            Default::default();

        for (worker_type, assignment) in assignments {
            buckets[bucket_of(assignment)].insert(*worker_type, assignment.clone());
        }

        let waves: Vec<ExecutionWave> = buckets
            .into_iter()
            .zip(1u32..)
            .map(|(bucket, wave_index)| ExecutionWave::new(wave_index, bucket))
            .collect();

        let estimated_total_time_seconds = waves.iter().map(|w| w.estimated_time_seconds).sum();
        let parallelization_efficiency = Self::parallelization_efficiency(assignments);

        debug!(
            assignments = assignments.len(),
            total_secs = estimated_total_time_seconds,
            efficiency = parallelization_efficiency,
            "Waves scheduled"
        );

        Schedule {
            waves,
            estimated_total_time_seconds,
            parallelization_efficiency,
        }
    }

    /// Fraction of sequential time saved by running same-priority work concurrently.
    ///
    /// `1 - Σ(max time per priority) / Σ(all times)`, or `1.0` when there is
    /// nothing to run.
    ///
    /// Keyed on the priority value, not the wave tier: priorities 2 and 3
    /// share waves 3 and 4 but each contributes its own sequential term, so
    /// the figure is a lower bound on what the wave layout can save.
    pub fn parallelization_efficiency(
        assignments: &BTreeMap<WorkerType, WorkerAssignment>,
    ) -> f64 {
        let sequential: u64 = assignments
            .values()
            .map(|a| u64::from(a.estimated_time_seconds))
            .sum();
        if sequential == 0 {
            return 1.0;
        }

        let mut per_priority: BTreeMap<u8, u32> = BTreeMap::new();
        for assignment in assignments.values() {
            let slot = per_priority.entry(assignment.priority).or_insert(0);
            *slot = (*slot).max(assignment.estimated_time_seconds);
        }
        let parallel: u64 = per_priority.values().map(|&t| u64::from(t)).sum();

        (1.0 - parallel as f64 / sequential as f64).clamp(0.0, 1.0)
    }
}

fn bucket_of(assignment: &WorkerAssignment) -> usize {
    let lower_priority = usize::from(assignment.priority != 1);
    let has_deps = usize::from(assignment.has_dependencies());
    lower_priority * 2 + has_deps
}
