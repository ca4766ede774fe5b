//! Assessment Planner: dependency-aware, wave-ordered assessment plans for
//! discovered cloud infrastructure.

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod planner;
pub mod report;
pub mod resource;
pub mod store;
pub mod tools;
pub mod workers;

pub use error::{Error, Result};
pub use planner::{AssessmentPlan, AssessmentPlanner};
pub use resource::Resource;
pub use workers::WorkerType;
