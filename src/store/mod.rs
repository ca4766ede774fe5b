//! Plan persistence.

pub mod memory;
pub mod traits;

pub use memory::InMemoryPlanStore;
pub use traits::{PlanStore, PlanSummary};
