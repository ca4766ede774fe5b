//! Tool surface exposed to an agent framework.
//!
//! The tool list is declared statically in [`TOOLS`]; [`ToolSurface::dispatch`]
//! routes a tool call by name to the planner.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{Error, ToolError};
use crate::planner::AssessmentPlanner;

/// Declaration of one callable tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema for the tool's parameters.
    pub parameters: fn() -> Value,
}

pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "create_assessment_plan",
        description: "Discover the resources in a scope and build a wave-ordered assessment \
                      plan for them. The plan is stored and can be fetched later by id.",
        parameters: create_assessment_plan_schema,
    },
    ToolSpec {
        name: "get_plan",
        description: "Fetch a previously created assessment plan by id.",
        parameters: get_plan_schema,
    },
    ToolSpec {
        name: "find_relationship_chain",
        description: "Find the shortest chain of dependency or impact relationships linking \
                      two resource types. Returns an empty chain when they are unrelated.",
        parameters: find_relationship_chain_schema,
    },
    ToolSpec {
        name: "applicable_rules",
        description: "List the correlation rules worth evaluating for a set of resource types.",
        parameters: applicable_rules_schema,
    },
];

fn create_assessment_plan_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "scope": {
                "type": "string",
                "description": "Subscription or resource group scope to assess"
            },
            "assessment_type": {
                "type": "string",
                "description": "Kind of assessment (default: full)"
            }
        },
        "required": ["scope"]
    })
}

fn get_plan_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "plan_id": { "type": "string", "description": "Plan UUID" }
        },
        "required": ["plan_id"]
    })
}

fn find_relationship_chain_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "start": { "type": "string", "description": "Starting resource type" },
            "end": { "type": "string", "description": "Target resource type" }
        },
        "required": ["start", "end"]
    })
}

fn applicable_rules_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "resource_types": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Resource types present in the environment"
            }
        },
        "required": ["resource_types"]
    })
}

/// Look up a tool declaration by name.
pub fn spec(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|tool| tool.name == name)
}

/// Extract a required string parameter.
fn require_str<'a>(tool: &str, params: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidParameters {
            name: tool.to_string(),
            reason: format!("missing '{key}' parameter"),
        })
}

fn to_value<T: Serialize>(tool: &str, value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::ExecutionFailed {
        name: tool.to_string(),
        reason: e.to_string(),
    })
}

fn failed(tool: &str, error: Error) -> ToolError {
    ToolError::ExecutionFailed {
        name: tool.to_string(),
        reason: error.to_string(),
    }
}

/// Dispatches tool calls to an [`AssessmentPlanner`].
#[derive(Clone)]
pub struct ToolSurface {
    planner: Arc<AssessmentPlanner>,
}

impl ToolSurface {
    pub fn new(planner: Arc<AssessmentPlanner>) -> Self {
        Self { planner }
    }

    pub fn tools(&self) -> &'static [ToolSpec] {
        TOOLS
    }

    /// Run the tool `name` with JSON `params`, returning its JSON result.
    pub async fn dispatch(&self, name: &str, params: Value) -> Result<Value, ToolError> {
        let Some(tool) = spec(name) else {
            return Err(ToolError::NotFound {
                name: name.to_string(),
            });
        };
        tracing::debug!(tool = tool.name, "Dispatching tool call");

        match tool.name {
            "create_assessment_plan" => {
                let scope = require_str(name, &params, "scope")?;
                let assessment_type = params
                    .get("assessment_type")
                    .and_then(Value::as_str)
                    .unwrap_or("full");
                let plan = self
                    .planner
                    .create_assessment_plan(scope, assessment_type)
                    .await
                    .map_err(|e| failed(name, e))?;
                to_value(name, &plan)
            }
            "get_plan" => {
                let raw = require_str(name, &params, "plan_id")?;
                let plan_id = Uuid::parse_str(raw).map_err(|e| ToolError::InvalidParameters {
                    name: name.to_string(),
                    reason: format!("invalid plan_id: {e}"),
                })?;
                let plan = self
                    .planner
                    .get_plan(plan_id)
                    .await
                    .map_err(|e| failed(name, e))?;
                to_value(name, &plan)
            }
            "find_relationship_chain" => {
                let start = require_str(name, &params, "start")?;
                let end = require_str(name, &params, "end")?;
                let chain = self.planner.find_relationship_chain(start, end);
                Ok(json!({ "found": !chain.is_empty(), "chain": chain }))
            }
            "applicable_rules" => {
                let resource_types: Vec<String> = params
                    .get("resource_types")
                    .cloned()
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(|e| ToolError::InvalidParameters {
                        name: name.to_string(),
                        reason: e.to_string(),
                    })?
                    .ok_or_else(|| ToolError::InvalidParameters {
                        name: name.to_string(),
                        reason: "missing 'resource_types' parameter".to_string(),
                    })?;
                let rules = self.planner.applicable_rules(&resource_types);
                to_value(name, &rules)
            }
            other => Err(ToolError::NotFound {
                name: other.to_string(),
            }),
        }
    }
}
