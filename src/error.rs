//! Error types for the assessment planner.

use std::time::Duration;

use uuid::Uuid;

/// Top-level error type for the planner.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures loading the static relationship catalog or correlation rule book.
///
/// Always fatal: nothing downstream runs against a partially loaded catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read {what} from {path}: {source}")]
    Read {
        what: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate category in relationship catalog: {0}")]
    DuplicateCategory(String),

    #[error("Duplicate correlation rule: {0}")]
    DuplicateRule(String),

    #[error("Invalid correlation rule {name}: {reason}")]
    InvalidRule { name: String, reason: String },
}

/// Plan assembly contract violations.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Correlation step already added to plan {plan_id}")]
    CorrelationStepAlreadyAdded { plan_id: Uuid },
}

/// Resource discovery failures.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Discovery source unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid discovery response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Plan persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Plan {0} not found")]
    NotFound(Uuid),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Failures of the wave executor itself (not of individual workers).
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Plan {plan_id} has no waves to execute")]
    EmptyPlan { plan_id: Uuid },

    #[error("Worker {worker} timed out after {timeout:?}")]
    Timeout { worker: String, timeout: Duration },

    #[error("Worker {worker} failed: {reason}")]
    WorkerFailed { worker: String, reason: String },

    #[error("Worker {worker} panicked: {reason}")]
    WorkerPanicked { worker: String, reason: String },
}

/// Tool-surface dispatch errors.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool {name} not found")]
    NotFound { name: String },

    #[error("Invalid parameters for tool {name}: {reason}")]
    InvalidParameters { name: String, reason: String },

    #[error("Tool {name} execution failed: {reason}")]
    ExecutionFailed { name: String, reason: String },
}

/// Result type alias for the planner.
pub type Result<T> = std::result::Result<T, Error>;
