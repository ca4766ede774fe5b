//! Static knowledge bases shared by every planning run.
//!
//! - `relationships`: category dependency/impact catalog with chain search
//! - `rules`: multi-condition correlation rules indexed by severity and category
//!
//! Both are loaded once at startup and shared read-only through `Arc`.

pub mod relationships;
pub mod rules;

use std::sync::Arc;

use tracing::info;

use crate::config::PlannerConfig;
use crate::error::CatalogError;

pub use relationships::{CategoryEdge, RelationshipCatalog};
pub use rules::{Condition, CorrelationRule, CorrelationRuleBook, Severity};

/// The loaded static tables.
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub relationships: Arc<RelationshipCatalog>,
    pub rules: Arc<CorrelationRuleBook>,
}

impl Catalogs {
    /// Load both tables, from the configured paths or the embedded defaults.
    pub fn load(config: &PlannerConfig) -> Result<Self, CatalogError> {
        let relationships = match &config.relationships_path {
            Some(path) => RelationshipCatalog::from_path(path)?,
            None => RelationshipCatalog::embedded()?,
        };
        let rules = match &config.rules_path {
            Some(path) => CorrelationRuleBook::from_path(path)?,
            None => CorrelationRuleBook::embedded()?,
        };

        info!(
            categories = relationships.categories().count(),
            rules = rules.len(),
            "Static catalogs loaded"
        );

        Ok(Self {
            relationships: Arc::new(relationships),
            rules: Arc::new(rules),
        })
    }

    /// Load the embedded tables.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::load(&PlannerConfig::default())
    }
}
