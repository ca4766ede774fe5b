//! Plain-text rendering of assessment plans.

use std::fmt::Write;

use crate::planner::AssessmentPlan;

/// Resource summary followed by a wave-by-wave breakdown.
pub fn render_summary(plan: &AssessmentPlan) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_summary(&mut out, plan);
    out
}

fn write_summary(out: &mut String, plan: &AssessmentPlan) -> std::fmt::Result {
    writeln!(out, "Assessment plan {}", plan.plan_id)?;
    writeln!(out, "  Scope: {}", plan.scope)?;
    writeln!(out, "  Type: {}", plan.assessment_type)?;
    writeln!(out, "  Created: {}", plan.created_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out)?;

    if plan.is_empty() {
        writeln!(out, "No resources discovered; nothing to assess.")?;
        return Ok(());
    }

    writeln!(out, "Resources ({} total):", plan.total_resources)?;
    let mut counts: Vec<(&String, &usize)> = plan.resource_type_counts.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (resource_type, count) in counts {
        writeln!(out, "  {count:>4}  {resource_type}")?;
    }
    writeln!(out)?;

    writeln!(out, "Execution waves:")?;
    for wave in &plan.waves {
        if wave.is_empty() {
            writeln!(out, "  Wave {}: (empty)", wave.wave_index)?;
            continue;
        }
        let label = if wave.is_correlation() {
            " correlation"
        } else {
            ""
        };
        writeln!(
            out,
            "  Wave {}{label}: {} worker(s), ~{}s",
            wave.wave_index,
            wave.assignments.len(),
            wave.estimated_time_seconds
        )?;
        for assignment in wave.assignments.values() {
            let family = assignment
                .worker_type
                .family()
                .map(|family| format!(" [{}]", family.as_str()))
                .unwrap_or_default();
            writeln!(
                out,
                "    - {}{family} ({} resource(s), p{}, ~{}s)",
                assignment.worker_type,
                assignment.resources.len(),
                assignment.priority,
                assignment.estimated_time_seconds
            )?;
        }
    }
    writeln!(out)?;

    writeln!(
        out,
        "Estimated total time: {} ({}s)",
        format_duration(plan.estimated_total_time_seconds),
        plan.estimated_total_time_seconds
    )?;
    writeln!(
        out,
        "Parallelization efficiency: {:.1}%",
        plan.parallelization_efficiency * 100.0
    )?;
    if !plan.candidate_rules.is_empty() {
        writeln!(out, "Candidate correlation rules: {}", plan.candidate_rules.len())?;
    }
    Ok(())
}

fn format_duration(seconds: u32) -> String {
    match (seconds / 60, seconds % 60) {
        (0, s) => format!("{s}s"),
        (m, 0) => format!("{m}m"),
        (m, s) => format!("{m}m {s}s"),
    }
}
