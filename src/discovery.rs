//! Resource discovery sources.
//!
//! The planner only consumes discovery output. `JsonFileDiscovery` reads a
//! snapshot exported from the discovery service; `StaticDiscovery` serves a
//! fixed batch.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::error::DiscoveryError;
use crate::resource::Resource;

/// A source of discovered resources for a scope.
#[async_trait]
pub trait ResourceDiscovery: Send + Sync {
    async fn discover(&self, scope: &str) -> Result<Vec<Resource>, DiscoveryError>;
}

/// Reads a single-scope snapshot from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileDiscovery {
    path: PathBuf,
}

impl JsonFileDiscovery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse a snapshot document: a bare resource array, or the
    /// discovery-service `{ "data": [...] }` envelope.
    pub fn parse(raw: &str) -> Result<Vec<Resource>, DiscoveryError> {
        let records = match serde_json::from_str::<Value>(raw)? {
            Value::Array(records) => records,
            Value::Object(mut envelope) => match envelope.remove("data") {
                Some(Value::Array(records)) => records,
                Some(other) => {
                    return Err(DiscoveryError::InvalidResponse(format!(
                        "expected data to be an array, got {}",
                        kind_of(&other)
                    )));
                }
                None => {
                    return Err(DiscoveryError::InvalidResponse(
                        "object response has no data array".into(),
                    ));
                }
            },
            other => {
                return Err(DiscoveryError::InvalidResponse(format!(
                    "expected a resource array or an object with a data array, got {}",
                    kind_of(&other)
                )));
            }
        };

        records
            .into_iter()
            .enumerate()
            .map(|(pos, record)| {
                serde_json::from_value(record).map_err(|e| {
                    DiscoveryError::InvalidResponse(format!("resource #{pos}: {e}"))
                })
            })
            .collect()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl ResourceDiscovery for JsonFileDiscovery {
    async fn discover(&self, scope: &str) -> Result<Vec<Resource>, DiscoveryError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DiscoveryError::Unavailable(format!(
                    "snapshot {} not found",
                    self.path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        let resources = Self::parse(&raw)?;
        info!(
            scope = %scope,
            path = %self.path.display(),
            resources = resources.len(),
            "Resources discovered"
        );
        Ok(resources)
    }
}

/// Serves the same resources for every scope.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    resources: Vec<Resource>,
}

impl StaticDiscovery {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl ResourceDiscovery for StaticDiscovery {
    async fn discover(&self, _scope: &str) -> Result<Vec<Resource>, DiscoveryError> {
        Ok(self.resources.clone())
    }
}
