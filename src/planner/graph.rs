//! Resource-instance dependency graph.
//!
//! Nodes live in an arena and refer to each other by index, so the
//! two-way links never form ownership cycles. An edge whose target is not part
//! of the current batch is kept as [`NodeRef::External`] on the source node
//! and has no reverse edge.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::resource::Resource;

/// Target of a dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeRef {
    /// Another node in this graph.
    Local(usize),
    /// A resource id that is not being assessed in this run.
    External(String),
}

/// Graph vertex for one resource instance.
#[derive(Debug, Clone)]
pub struct ResourceNode {
    pub id: String,
    pub resource_type: String,
    pub depends_on: BTreeSet<NodeRef>,
    pub depended_by: BTreeSet<usize>,
}

/// Pulls referenced resource ids out of a resource's properties.
pub trait ExtractionRule: Send + Sync {
    /// Resource type this rule applies to.
    fn category(&self) -> &str;

    /// Short label for logs.
    fn name(&self) -> &str;

    fn extract(&self, resource: &Resource) -> Vec<String>;
}

/// One step in a [`PropertyPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(&'static str),
    /// Fan out over every element of an array.
    Each,
}

/// Extraction rule following a fixed path of keys and array fan-outs.
#[derive(Debug, Clone)]
pub struct PropertyPath {
    category: String,
    name: String,
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    /// Build from a dotted path, where `[]` fans out over an array:
    /// `"networkProfile.networkInterfaces.[].id"`.
    pub fn new(category: &str, name: &str, path: &'static str) -> Self {
        let segments = path
            .split('.')
            .map(|segment| match segment {
                "[]" => PathSegment::Each,
                key => PathSegment::Key(key),
            })
            .collect();
        Self {
            category: category.to_string(),
            name: name.to_string(),
            segments,
        }
    }
}

fn collect_strings(value: &serde_json::Value, segments: &[PathSegment], out: &mut Vec<String>) {
    match segments.split_first() {
        None => {
            if let Some(s) = value.as_str().filter(|s| !s.is_empty()) {
                out.push(s.to_string());
            }
        }
        Some((PathSegment::Key(key), rest)) => {
            if let Some(next) = value.get(*key) {
                collect_strings(next, rest, out);
            }
        }
        Some((PathSegment::Each, rest)) => {
            if let Some(items) = value.as_array() {
                for item in items {
                    collect_strings(item, rest, out);
                }
            }
        }
    }
}

impl ExtractionRule for PropertyPath {
    fn category(&self) -> &str {
        &self.category
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, resource: &Resource) -> Vec<String> {
        let mut out = Vec::new();
        collect_strings(&resource.properties, &self.segments, &mut out);
        out
    }
}

/// Builds a [`ResourceGraph`] from a batch of resources.
pub struct DependencyGraphBuilder {
    /// Lowercased resource type → rules for it.
    rules: HashMap<String, Vec<Box<dyn ExtractionRule>>>,
}

impl DependencyGraphBuilder {
    /// A builder with no extraction rules; every resource becomes an isolated node.
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// A builder carrying the known property patterns for common resource types.
    pub fn with_default_rules() -> Self {
        let mut builder = Self::new();
        builder.register(PropertyPath::new(
            "Microsoft.Web/sites",
            "app_service_plan",
            "serverFarmId",
        ));
        builder.register(PropertyPath::new(
            "Microsoft.Compute/virtualMachines",
            "network_interfaces",
            "networkProfile.networkInterfaces.[].id",
        ));
        builder.register(PropertyPath::new(
            "Microsoft.Compute/virtualMachines",
            "os_disk",
            "storageProfile.osDisk.managedDisk.id",
        ));
        builder.register(PropertyPath::new(
            "Microsoft.Compute/virtualMachines",
            "data_disks",
            "storageProfile.dataDisks.[].managedDisk.id",
        ));
        builder.register(PropertyPath::new(
            "Microsoft.Network/networkInterfaces",
            "subnets",
            "ipConfigurations.[].properties.subnet.id",
        ));
        builder.register(PropertyPath::new(
            "Microsoft.Network/networkInterfaces",
            "network_security_group",
            "networkSecurityGroup.id",
        ));
        builder
    }

    /// Add an extraction rule for its category.
    pub fn register(&mut self, rule: impl ExtractionRule + 'static) {
        self.rules
            .entry(rule.category().to_ascii_lowercase())
            .or_default()
            .push(Box::new(rule));
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn build(&self, resources: &[Resource]) -> ResourceGraph {
        let mut graph = ResourceGraph::default();
        let mut unique = Vec::with_capacity(resources.len());

        for resource in resources {
            let key = resource.id.to_ascii_lowercase();
            if graph.index.contains_key(&key) {
                debug!(resource = %resource.id, "Duplicate resource id in batch, keeping first");
                continue;
            }
            graph.index.insert(key, graph.nodes.len());
            graph.nodes.push(ResourceNode {
                id: resource.id.clone(),
                resource_type: resource.resource_type.clone(),
                depends_on: BTreeSet::new(),
                depended_by: BTreeSet::new(),
            });
            unique.push(resource);
        }

        for resource in unique {
            let Some(rules) = self.rules.get(&resource.resource_type.to_ascii_lowercase()) else {
                continue;
            };
            let Some(source) = graph.position(&resource.id) else {
                continue;
            };
            for rule in rules {
                for target in rule.extract(resource) {
                    graph.add_edge(source, &target);
                    debug!(
                        resource = %resource.id,
                        rule = rule.name(),
                        target = %target,
                        "Recorded dependency"
                    );
                }
            }
        }

        graph
    }
}

impl Default for DependencyGraphBuilder {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

/// Read-only resource-instance dependency graph.
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    nodes: Vec<ResourceNode>,
    /// Lowercased id → arena position.
    index: HashMap<String, usize>,
}

impl ResourceGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&ResourceNode> {
        self.position(id).map(|pos| &self.nodes[pos])
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.index.get(&id.to_ascii_lowercase()).copied()
    }

    /// Resolve a referenced id to a node, falling back from a subnet id to
    /// its parent virtual network.
    fn resolve(&self, id: &str) -> Option<usize> {
        self.position(id).or_else(|| {
            let lower = id.to_ascii_lowercase();
            let (parent, _) = lower.split_once("/subnets/")?;
            self.index.get(parent).copied()
        })
    }

    fn add_edge(&mut self, source: usize, target: &str) {
        match self.resolve(target) {
            Some(pos) if pos == source => {}
            Some(pos) => {
                self.nodes[source].depends_on.insert(NodeRef::Local(pos));
                self.nodes[pos].depended_by.insert(source);
            }
            None => {
                self.nodes[source]
                    .depends_on
                    .insert(NodeRef::External(target.to_string()));
            }
        }
    }

    /// Ids `id` depends on, in-batch and external. Empty for unknown ids.
    pub fn dependencies_of(&self, id: &str) -> BTreeSet<String> {
        let Some(node) = self.node(id) else {
            return BTreeSet::new();
        };
        node.depends_on
            .iter()
            .map(|dep| match dep {
                NodeRef::Local(pos) => self.nodes[*pos].id.clone(),
                NodeRef::External(id) => id.clone(),
            })
            .collect()
    }

    /// In-batch ids that depend on `id`.
    pub fn dependents_of(&self, id: &str) -> BTreeSet<String> {
        self.node(id)
            .map(|node| {
                node.depended_by
                    .iter()
                    .map(|pos| self.nodes[*pos].id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Referenced ids that are not part of this batch.
    pub fn external_dependencies_of(&self, id: &str) -> BTreeSet<String> {
        self.node(id)
            .map(|node| {
                node.depends_on
                    .iter()
                    .filter_map(|dep| match dep {
                        NodeRef::External(id) => Some(id.clone()),
                        NodeRef::Local(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `id` refers to a resource of this batch.
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// The batch resource a referenced id resolves to (subnets map to their VNet).
    pub fn resolve_id(&self, id: &str) -> Option<&str> {
        self.resolve(id).map(|pos| self.nodes[pos].id.as_str())
    }
}
