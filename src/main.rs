use std::sync::Arc;

use anyhow::Context;

use assessment_planner::config::PlannerConfig;
use assessment_planner::discovery::JsonFileDiscovery;
use assessment_planner::planner::AssessmentPlanner;
use assessment_planner::report;
use assessment_planner::store::{InMemoryPlanStore, PlanStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let resources_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PLANNER_RESOURCES_PATH").ok())
        .unwrap_or_else(|| {
            eprintln!("Error: no resource snapshot given");
            eprintln!("  assessment-planner <resources.json>");
            eprintln!("  or export PLANNER_RESOURCES_PATH=./resources.json");
            std::process::exit(1);
        });

    let scope = std::env::var("PLANNER_SCOPE").unwrap_or_else(|_| "default".to_string());
    let assessment_type =
        std::env::var("PLANNER_ASSESSMENT_TYPE").unwrap_or_else(|_| "full".to_string());
    let json_output =
        std::env::var("PLANNER_OUTPUT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let config = PlannerConfig::from_env().context("invalid PLANNER_* configuration")?;

    eprintln!("Assessment Planner v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Snapshot: {}", resources_path);
    eprintln!("   Scope: {}", scope);

    let store = Arc::new(InMemoryPlanStore::new());
    let planner = AssessmentPlanner::from_config(&config)
        .context("failed to load static catalogs")?
        .with_discovery(Arc::new(JsonFileDiscovery::new(&resources_path)))
        .with_store(store.clone());

    let plan = planner
        .create_assessment_plan(&scope, &assessment_type)
        .await
        .context("failed to create assessment plan")?;

    // Read back what was stored, so the printed plan is the persisted one
    let plan = store.require_plan(plan.plan_id).await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", report::render_summary(&plan));
    }

    Ok(())
}
