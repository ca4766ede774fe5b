//! Resource → worker-type assignment.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::planner::graph::ResourceGraph;
use crate::planner::plan::WorkerAssignment;
use crate::resource::Resource;
use crate::workers::WorkerType;

/// Static resource type → worker type table.
const CATEGORY_WORKERS: &[(&str, WorkerType)] = &[
    // Core infrastructure
    ("Microsoft.Compute/virtualMachines", WorkerType::VmAssessment),
    ("Microsoft.Compute/virtualMachineScaleSets", WorkerType::VmAssessment),
    ("Microsoft.ContainerService/managedClusters", WorkerType::AksAssessment),
    ("Microsoft.Web/sites", WorkerType::AppServiceAssessment),
    ("Microsoft.Web/serverFarms", WorkerType::AppServiceAssessment),
    ("Microsoft.ContainerInstance/containerGroups", WorkerType::ContainerInstancesAssessment),
    ("Microsoft.Storage/storageAccounts", WorkerType::StorageAssessment),
    ("Microsoft.Compute/disks", WorkerType::ManagedDisksAssessment),
    ("Microsoft.Storage/storageAccounts/fileServices/shares", WorkerType::FileSharesAssessment),
    ("Microsoft.Network/virtualNetworks", WorkerType::VnetAssessment),
    ("Microsoft.Network/networkSecurityGroups", WorkerType::NsgAssessment),
    ("Microsoft.Network/loadBalancers", WorkerType::LoadBalancerAssessment),
    ("Microsoft.Network/applicationGateways", WorkerType::AppGatewayAssessment),
    ("Microsoft.Network/azureFirewalls", WorkerType::FirewallAssessment),
    ("Microsoft.Sql/servers", WorkerType::SqlAssessment),
    ("Microsoft.DocumentDB/databaseAccounts", WorkerType::CosmosDbAssessment),
    // Developer & DevOps
    ("Microsoft.DevOps/pipelines", WorkerType::DevopsAssessment),
    ("Microsoft.ApiManagement/service", WorkerType::ApiManagementAssessment),
    ("Microsoft.ContainerRegistry/registries", WorkerType::ContainerRegistryAssessment),
    ("Microsoft.Logic/workflows", WorkerType::LogicAppsAssessment),
    ("Microsoft.ServiceBus/namespaces", WorkerType::ServiceBusAssessment),
    ("Microsoft.EventGrid/topics", WorkerType::EventGridAssessment),
    ("Microsoft.EventGrid/domains", WorkerType::EventGridAssessment),
    // Data & analytics
    ("Microsoft.Synapse/workspaces", WorkerType::SynapseAssessment),
    ("Microsoft.DataFactory/factories", WorkerType::DataFactoryAssessment),
    ("Microsoft.Databricks/workspaces", WorkerType::DatabricksAssessment),
    ("Microsoft.HDInsight/clusters", WorkerType::HdInsightAssessment),
    ("Microsoft.EventHub/namespaces", WorkerType::EventHubsAssessment),
    ("Microsoft.StreamAnalytics/streamingjobs", WorkerType::StreamAnalyticsAssessment),
    ("Microsoft.Devices/IotHubs", WorkerType::IotHubAssessment),
    ("Microsoft.DataLakeStore/accounts", WorkerType::DataLakeAssessment),
    ("Microsoft.DataLakeAnalytics/accounts", WorkerType::DataLakeAssessment),
    ("Microsoft.Kusto/clusters", WorkerType::DataExplorerAssessment),
    // Security & identity
    ("Microsoft.AAD/domainServices", WorkerType::AzureAdAssessment),
    ("Microsoft.AzureActiveDirectory/b2cDirectories", WorkerType::B2cAssessment),
    ("Microsoft.ManagedIdentity/userAssignedIdentities", WorkerType::ManagedIdentityAssessment),
    ("Microsoft.KeyVault/vaults", WorkerType::KeyVaultAssessment),
    ("Microsoft.Security/pricings", WorkerType::DefenderAssessment),
    ("Microsoft.Security/securityStandards", WorkerType::DefenderAssessment),
    ("Microsoft.SecurityInsights/alertRules", WorkerType::SentinelAssessment),
    ("Microsoft.Network/ddosProtectionPlans", WorkerType::DdosProtectionAssessment),
    ("Microsoft.Authorization/policyDefinitions", WorkerType::PolicyAssessment),
    // Monitoring & management
    ("Microsoft.OperationalInsights/workspaces", WorkerType::LogAnalyticsAssessment),
    ("Microsoft.Insights/components", WorkerType::AppInsightsAssessment),
    ("Microsoft.Insights/metricAlerts", WorkerType::MonitorAssessment),
    ("Microsoft.Insights/actionGroups", WorkerType::MonitorAssessment),
    ("Microsoft.Automation/automationAccounts", WorkerType::AutomationAssessment),
    ("Microsoft.CostManagement/exports", WorkerType::CostManagementAssessment),
    ("Microsoft.CostManagement/budgets", WorkerType::CostManagementAssessment),
    // AI & cognitive
    ("Microsoft.MachineLearningServices/workspaces", WorkerType::MachineLearningAssessment),
    ("Microsoft.CognitiveServices/accounts", WorkerType::CognitiveServicesAssessment),
    ("Microsoft.BotService/botServices", WorkerType::BotServiceAssessment),
    ("Microsoft.Search/searchServices", WorkerType::CognitiveSearchAssessment),
];

type Predicate = Box<dyn Fn(&Resource) -> bool + Send + Sync>;

/// Override consulted before the static table.
struct SpecialCase {
    name: &'static str,
    resource_type: String,
    predicate: Predicate,
    worker_type: WorkerType,
}

/// Routes resources to worker types and aggregates per-type assignments.
pub struct AgentAssigner {
    /// Lowercased resource type → worker type.
    table: HashMap<String, WorkerType>,
    special_cases: Vec<SpecialCase>,
}

impl AgentAssigner {
    /// Assigner with the full category table and the built-in special cases.
    pub fn new() -> Self {
        let table = CATEGORY_WORKERS
            .iter()
            .map(|(category, worker_type)| (category.to_ascii_lowercase(), *worker_type))
            .collect();

        Self {
            table,
            special_cases: Vec::new(),
        }
        // Function apps are web sites with kind "functionapp[,linux...]".
        .with_special_case(
            "function_app",
            "Microsoft.Web/sites",
            WorkerType::FunctionsAssessment,
            |resource| resource.kind_lower().starts_with("functionapp"),
        )
        .with_special_case(
            "form_recognizer",
            "Microsoft.CognitiveServices/accounts",
            WorkerType::FormRecognizerAssessment,
            |resource| resource.kind_lower() == "formrecognizer",
        )
    }

    /// Register an override for `resource_type`, checked in registration order.
    pub fn with_special_case<F>(
        mut self,
        name: &'static str,
        resource_type: &str,
        worker_type: WorkerType,
        predicate: F,
    ) -> Self
    where
        F: Fn(&Resource) -> bool + Send + Sync + 'static,
    {
        self.special_cases.push(SpecialCase {
            name,
            resource_type: resource_type.to_ascii_lowercase(),
            predicate: Box::new(predicate),
            worker_type,
        });
        self
    }

    /// Worker type for a single resource: special case, then table, then fallback.
    pub fn worker_for(&self, resource: &Resource) -> WorkerType {
        let resource_type = resource.resource_type.to_ascii_lowercase();

        if let Some(case) = self
            .special_cases
            .iter()
            .find(|case| case.resource_type == resource_type && (case.predicate)(resource))
        {
            debug!(resource = %resource.id, special_case = case.name, "Special-case routing");
            return case.worker_type;
        }

        match self.table.get(&resource_type) {
            Some(worker_type) => *worker_type,
            None => {
                warn!(
                    resource = %resource.id,
                    resource_type = %resource.resource_type,
                    "No specific worker for resource type, using generic assessment"
                );
                WorkerType::GenericResourceAssessment
            }
        }
    }

    pub fn assign(
        &self,
        resources: &[Resource],
        graph: &ResourceGraph,
    ) -> BTreeMap<WorkerType, WorkerAssignment> {
        let mut assignments: BTreeMap<WorkerType, WorkerAssignment> = BTreeMap::new();
        let mut owners: HashMap<String, WorkerType> = HashMap::with_capacity(resources.len());

        for resource in resources {
            let worker_type = self.worker_for(resource);
            let assignment = assignments
                .entry(worker_type)
                .or_insert_with(|| WorkerAssignment::new(worker_type));

            assignment.resources.push(resource.id.clone());
            assignment.estimated_time_seconds = assignment
                .estimated_time_seconds
                .max(worker_type.execution_time_seconds());
            assignment
                .resource_dependencies
                .extend(graph.dependencies_of(&resource.id));

            owners
                .entry(resource.id.to_ascii_lowercase())
                .or_insert(worker_type);
        }

        // Lift instance edges to worker-type edges once every owner is known.
        for (worker_type, assignment) in assignments.iter_mut() {
            for dependency in &assignment.resource_dependencies {
                let owner = graph
                    .resolve_id(dependency)
                    .and_then(|id| owners.get(&id.to_ascii_lowercase()));
                if let Some(owner) = owner.filter(|owner| *owner != worker_type) {
                    assignment.dependencies.insert(*owner);
                }
            }
        }

        debug!(
            resources = resources.len(),
            worker_types = assignments.len(),
            "Resources assigned"
        );

        assignments
    }
}

impl Default for AgentAssigner {
    fn default() -> Self {
        Self::new()
    }
}
