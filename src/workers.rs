//! Assessment worker types and their capability table.
//!
//! `WorkerType` is a closed set. Scheduling inputs (priority, base execution
//! time, checks) come from [`WorkerType::capabilities`], which is plain const
//! data and never recomputed per planning run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Grouping of worker types by the area of infrastructure they cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerFamily {
    CoreInfrastructure,
    DeveloperDevops,
    DataAnalytics,
    SecurityIdentity,
    MonitoringManagement,
    AiCognitive,
}

impl WorkerFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CoreInfrastructure => "core_infrastructure",
            Self::DeveloperDevops => "developer_devops",
            Self::DataAnalytics => "data_analytics",
            Self::SecurityIdentity => "security_identity",
            Self::MonitoringManagement => "monitoring_management",
            Self::AiCognitive => "ai_cognitive",
        }
    }
}

/// Static scheduling and check metadata for one worker type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// 1 is scheduled first; anything greater runs in the secondary waves.
    pub priority: u8,
    /// Time one logical unit of this worker needs, regardless of resource count.
    pub execution_time_seconds: u32,
    pub checks: &'static [&'static str],
    /// Sub-resources the worker inspects alongside its primary resources.
    pub related_resources: &'static [&'static str],
}

const fn caps(
    priority: u8,
    execution_time_seconds: u32,
    checks: &'static [&'static str],
    related_resources: &'static [&'static str],
) -> Capabilities {
    Capabilities {
        priority,
        execution_time_seconds,
        checks,
        related_resources,
    }
}

/// Priority of the generic fallback worker; lower than every real worker type.
pub const GENERIC_PRIORITY: u8 = 3;

/// Specialized assessment worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkerType {
    // Core infrastructure
    #[serde(rename = "VM_Assessment_Agent")]
    VmAssessment,
    #[serde(rename = "AKS_Assessment_Agent")]
    AksAssessment,
    #[serde(rename = "App_Service_Assessment_Agent")]
    AppServiceAssessment,
    #[serde(rename = "Functions_Assessment_Agent")]
    FunctionsAssessment,
    #[serde(rename = "Container_Instances_Assessment_Agent")]
    ContainerInstancesAssessment,
    #[serde(rename = "Storage_Assessment_Agent")]
    StorageAssessment,
    #[serde(rename = "Managed_Disks_Assessment_Agent")]
    ManagedDisksAssessment,
    #[serde(rename = "File_Shares_Assessment_Agent")]
    FileSharesAssessment,
    #[serde(rename = "VNet_Assessment_Agent")]
    VnetAssessment,
    #[serde(rename = "NSG_Assessment_Agent")]
    NsgAssessment,
    #[serde(rename = "Load_Balancer_Assessment_Agent")]
    LoadBalancerAssessment,
    #[serde(rename = "App_Gateway_Assessment_Agent")]
    AppGatewayAssessment,
    #[serde(rename = "Firewall_Assessment_Agent")]
    FirewallAssessment,
    #[serde(rename = "SQL_Assessment_Agent")]
    SqlAssessment,
    #[serde(rename = "Cosmos_DB_Assessment_Agent")]
    CosmosDbAssessment,

    // Developer & DevOps
    #[serde(rename = "DevOps_Assessment_Agent")]
    DevopsAssessment,
    #[serde(rename = "API_Management_Assessment_Agent")]
    ApiManagementAssessment,
    #[serde(rename = "Container_Registry_Assessment_Agent")]
    ContainerRegistryAssessment,
    #[serde(rename = "Logic_Apps_Assessment_Agent")]
    LogicAppsAssessment,
    #[serde(rename = "Service_Bus_Assessment_Agent")]
    ServiceBusAssessment,
    #[serde(rename = "Event_Grid_Assessment_Agent")]
    EventGridAssessment,
    #[serde(rename = "Git_Repos_Assessment_Agent")]
    GitReposAssessment,
    #[serde(rename = "Artifacts_Assessment_Agent")]
    ArtifactsAssessment,

    // Data & analytics
    #[serde(rename = "Synapse_Assessment_Agent")]
    SynapseAssessment,
    #[serde(rename = "Data_Factory_Assessment_Agent")]
    DataFactoryAssessment,
    #[serde(rename = "Databricks_Assessment_Agent")]
    DatabricksAssessment,
    #[serde(rename = "HDInsight_Assessment_Agent")]
    HdInsightAssessment,
    #[serde(rename = "Event_Hubs_Assessment_Agent")]
    EventHubsAssessment,
    #[serde(rename = "Stream_Analytics_Assessment_Agent")]
    StreamAnalyticsAssessment,
    #[serde(rename = "IoT_Hub_Assessment_Agent")]
    IotHubAssessment,
    #[serde(rename = "Data_Lake_Assessment_Agent")]
    DataLakeAssessment,
    #[serde(rename = "Blob_Analytics_Assessment_Agent")]
    BlobAnalyticsAssessment,
    #[serde(rename = "Data_Explorer_Assessment_Agent")]
    DataExplorerAssessment,

    // Security & identity
    #[serde(rename = "Azure_AD_Assessment_Agent")]
    AzureAdAssessment,
    #[serde(rename = "B2C_Assessment_Agent")]
    B2cAssessment,
    #[serde(rename = "Managed_Identity_Assessment_Agent")]
    ManagedIdentityAssessment,
    #[serde(rename = "Key_Vault_Assessment_Agent")]
    KeyVaultAssessment,
    #[serde(rename = "Defender_Assessment_Agent")]
    DefenderAssessment,
    #[serde(rename = "Sentinel_Assessment_Agent")]
    SentinelAssessment,
    #[serde(rename = "DDoS_Protection_Assessment_Agent")]
    DdosProtectionAssessment,
    #[serde(rename = "Policy_Assessment_Agent")]
    PolicyAssessment,

    // Monitoring & management
    #[serde(rename = "Log_Analytics_Assessment_Agent")]
    LogAnalyticsAssessment,
    #[serde(rename = "App_Insights_Assessment_Agent")]
    AppInsightsAssessment,
    #[serde(rename = "Monitor_Assessment_Agent")]
    MonitorAssessment,
    #[serde(rename = "Automation_Assessment_Agent")]
    AutomationAssessment,
    #[serde(rename = "Update_Management_Assessment_Agent")]
    UpdateManagementAssessment,
    #[serde(rename = "Cost_Management_Assessment_Agent")]
    CostManagementAssessment,

    // AI & cognitive
    #[serde(rename = "Machine_Learning_Assessment_Agent")]
    MachineLearningAssessment,
    #[serde(rename = "Cognitive_Services_Assessment_Agent")]
    CognitiveServicesAssessment,
    #[serde(rename = "Bot_Service_Assessment_Agent")]
    BotServiceAssessment,
    #[serde(rename = "Cognitive_Search_Assessment_Agent")]
    CognitiveSearchAssessment,
    #[serde(rename = "Form_Recognizer_Assessment_Agent")]
    FormRecognizerAssessment,

    /// Fallback for resource types with no specialized worker.
    #[serde(rename = "Generic_Resource_Assessment_Agent")]
    GenericResourceAssessment,
    /// Synthetic worker of the trailing correlation wave.
    #[serde(rename = "Cross_Resource_Analysis")]
    CrossResourceAnalysis,
}

impl WorkerType {
    /// Every worker type, in declaration order.
    pub const ALL: &'static [WorkerType] = &[
        Self::VmAssessment,
        Self::AksAssessment,
        Self::AppServiceAssessment,
        Self::FunctionsAssessment,
        Self::ContainerInstancesAssessment,
        Self::StorageAssessment,
        Self::ManagedDisksAssessment,
        Self::FileSharesAssessment,
        Self::VnetAssessment,
        Self::NsgAssessment,
        Self::LoadBalancerAssessment,
        Self::AppGatewayAssessment,
        Self::FirewallAssessment,
        Self::SqlAssessment,
        Self::CosmosDbAssessment,
        Self::DevopsAssessment,
        Self::ApiManagementAssessment,
        Self::ContainerRegistryAssessment,
        Self::LogicAppsAssessment,
        Self::ServiceBusAssessment,
        Self::EventGridAssessment,
        Self::GitReposAssessment,
        Self::ArtifactsAssessment,
        Self::SynapseAssessment,
        Self::DataFactoryAssessment,
        Self::DatabricksAssessment,
        Self::HdInsightAssessment,
        Self::EventHubsAssessment,
        Self::StreamAnalyticsAssessment,
        Self::IotHubAssessment,
        Self::DataLakeAssessment,
        Self::BlobAnalyticsAssessment,
        Self::DataExplorerAssessment,
        Self::AzureAdAssessment,
        Self::B2cAssessment,
        Self::ManagedIdentityAssessment,
        Self::KeyVaultAssessment,
        Self::DefenderAssessment,
        Self::SentinelAssessment,
        Self::DdosProtectionAssessment,
        Self::PolicyAssessment,
        Self::LogAnalyticsAssessment,
        Self::AppInsightsAssessment,
        Self::MonitorAssessment,
        Self::AutomationAssessment,
        Self::UpdateManagementAssessment,
        Self::CostManagementAssessment,
        Self::MachineLearningAssessment,
        Self::CognitiveServicesAssessment,
        Self::BotServiceAssessment,
        Self::CognitiveSearchAssessment,
        Self::FormRecognizerAssessment,
        Self::GenericResourceAssessment,
        Self::CrossResourceAnalysis,
    ];

    /// Scheduling and check metadata for this worker type.
    pub const fn capabilities(self) -> Capabilities {
        use WorkerType::*;

        match self {
            VmAssessment => caps(
                1,
                30,
                &["security", "performance", "cost", "availability"],
                &["disks", "nics", "nsg"],
            ),
            AksAssessment => caps(
                1,
                120,
                &["security", "scalability", "networking", "cost"],
                &["acr", "keyvault", "log_analytics"],
            ),
            AppServiceAssessment => caps(
                1,
                45,
                &["security", "performance", "cost", "scalability"],
                &["storage", "database", "app_insights"],
            ),
            FunctionsAssessment => caps(
                2,
                40,
                &["security", "performance", "cost", "scalability"],
                &["storage", "app_insights", "service_bus"],
            ),
            ContainerInstancesAssessment => caps(
                2,
                60,
                &["security", "performance", "cost", "availability"],
                &["acr", "vnet", "nsg"],
            ),
            StorageAssessment => caps(
                1,
                30,
                &["security", "performance", "cost", "availability"],
                &["blobs", "files", "queues"],
            ),
            ManagedDisksAssessment => caps(
                2,
                20,
                &["performance", "cost", "availability", "redundancy"],
                &["vms", "snapshots"],
            ),
            FileSharesAssessment => caps(
                2,
                25,
                &["security", "performance", "cost", "sharing"],
                &["storage_accounts", "vnet"],
            ),
            VnetAssessment => caps(
                1,
                40,
                &["security", "networking", "cost", "connectivity"],
                &["subnets", "nsg", "load_balancers"],
            ),
            NsgAssessment => caps(
                1,
                30,
                &["security", "compliance", "networking"],
                &["vnets", "vms", "subnets"],
            ),
            LoadBalancerAssessment => caps(
                1,
                50,
                &["performance", "availability", "cost", "scalability"],
                &["backends", "health_probes"],
            ),
            AppGatewayAssessment => caps(
                1,
                60,
                &["security", "performance", "cost", "waf"],
                &["backends", "ssl", "vnet"],
            ),
            FirewallAssessment => caps(
                1,
                70,
                &["security", "networking", "cost", "rules"],
                &["vnet", "policies", "logs"],
            ),
            SqlAssessment => caps(
                1,
                50,
                &["security", "performance", "cost", "backup"],
                &["databases", "firewalls", "vnet"],
            ),
            CosmosDbAssessment => caps(
                1,
                55,
                &["security", "performance", "cost", "scalability"],
                &["containers", "throughput", "backups"],
            ),

            DevopsAssessment => caps(
                2,
                60,
                &["compliance", "performance", "cost", "integration"],
                &["repos", "artifacts", "builds"],
            ),
            ApiManagementAssessment => caps(
                1,
                70,
                &["security", "performance", "cost", "api_versioning"],
                &["gateways", "backends", "policies"],
            ),
            ContainerRegistryAssessment => caps(
                1,
                50,
                &["security", "compliance", "cost", "vulnerability_scans"],
                &["images", "repositories", "tasks"],
            ),
            LogicAppsAssessment => caps(
                2,
                40,
                &["performance", "cost", "integration", "error_handling"],
                &["connectors", "runs", "triggers"],
            ),
            ServiceBusAssessment => caps(
                1,
                45,
                &["security", "performance", "cost", "messaging"],
                &["queues", "topics", "subscriptions"],
            ),
            EventGridAssessment => caps(
                2,
                50,
                &["performance", "cost", "event_delivery", "reliability"],
                &["subscriptions", "domains", "topics"],
            ),
            GitReposAssessment => caps(
                2,
                30,
                &["security", "compliance", "branching", "code_quality"],
                &["pipelines", "pulls", "branches"],
            ),
            ArtifactsAssessment => caps(
                2,
                35,
                &["compliance", "versioning", "cost", "dependencies"],
                &["feeds", "packages", "pipelines"],
            ),

            SynapseAssessment => caps(
                1,
                90,
                &["security", "performance", "cost", "data_integration"],
                &["pools", "pipelines", "datasets"],
            ),
            DataFactoryAssessment => caps(
                1,
                80,
                &["compliance", "performance", "cost", "pipelines"],
                &["datasets", "linked_services", "triggers"],
            ),
            DatabricksAssessment => caps(
                1,
                100,
                &["security", "cost", "scalability", "clusters"],
                &["jobs", "notebooks", "clusters"],
            ),
            HdInsightAssessment => caps(
                2,
                120,
                &["performance", "cost", "availability", "hadoop_components"],
                &["nodes", "storage", "jobs"],
            ),
            EventHubsAssessment => caps(
                1,
                60,
                &["security", "performance", "cost", "throughput"],
                &["clusters", "namespaces", "hubs"],
            ),
            StreamAnalyticsAssessment => caps(
                2,
                70,
                &["performance", "cost", "streaming", "error_handling"],
                &["inputs", "outputs", "queries"],
            ),
            IotHubAssessment => caps(
                1,
                80,
                &["security", "scalability", "cost", "device_management"],
                &["devices", "endpoints", "routes"],
            ),
            DataLakeAssessment => caps(
                2,
                90,
                &["security", "performance", "cost", "data_ingestion"],
                &["stores", "jobs", "catalogs"],
            ),
            BlobAnalyticsAssessment => caps(
                2,
                40,
                &["performance", "cost", "analytics", "logging"],
                &["blobs", "diagnostics", "metrics"],
            ),
            DataExplorerAssessment => caps(
                1,
                75,
                &["security", "performance", "cost", "querying"],
                &["databases", "tables", "clusters"],
            ),

            AzureAdAssessment => caps(
                1,
                50,
                &["security", "compliance", "identity", "access"],
                &["users", "groups", "domains"],
            ),
            B2cAssessment => caps(
                1,
                60,
                &["security", "identity", "authentication", "user_flows"],
                &["tenants", "policies", "apps"],
            ),
            ManagedIdentityAssessment => caps(
                2,
                30,
                &["security", "compliance", "access_control"],
                &["roles", "assignments", "principals"],
            ),
            KeyVaultAssessment => caps(
                1,
                40,
                &["security", "compliance", "secrets_management", "encryption"],
                &["keys", "secrets", "certificates"],
            ),
            DefenderAssessment => caps(
                1,
                90,
                &["security", "threat_protection", "compliance", "alerts"],
                &["subscriptions", "resources", "recommendations"],
            ),
            SentinelAssessment => caps(
                1,
                100,
                &["security", "incident_response", "analytics", "hunting"],
                &["workspaces", "rules", "incidents"],
            ),
            DdosProtectionAssessment => caps(
                1,
                70,
                &["security", "network_protection", "cost", "mitigation"],
                &["vnets", "public_ips", "logs"],
            ),
            PolicyAssessment => caps(
                1,
                50,
                &["compliance", "governance", "auditing", "enforcement"],
                &["assignments", "definitions", "scopes"],
            ),

            LogAnalyticsAssessment => caps(
                1,
                60,
                &["performance", "cost", "querying", "data_ingestion"],
                &["solutions", "saved_searches", "agents"],
            ),
            AppInsightsAssessment => caps(
                1,
                50,
                &["performance", "availability", "user_analytics", "alerts"],
                &["metrics", "logs", "dependencies"],
            ),
            MonitorAssessment => caps(
                1,
                40,
                &["monitoring", "alerting", "diagnostics", "metrics"],
                &["resources", "logs", "alerts"],
            ),
            AutomationAssessment => caps(
                2,
                70,
                &["automation", "compliance", "runbooks", "schedules"],
                &["runbooks", "variables", "modules"],
            ),
            UpdateManagementAssessment => caps(
                1,
                80,
                &["compliance", "patching", "security", "updates"],
                &["machines", "schedules", "deployments"],
            ),
            CostManagementAssessment => caps(
                2,
                50,
                &["cost", "budgeting", "forecasting", "optimization"],
                &["scopes", "queries", "views"],
            ),

            MachineLearningAssessment => caps(
                1,
                90,
                &["security", "performance", "cost", "model_training"],
                &["experiments", "models", "endpoints"],
            ),
            CognitiveServicesAssessment => caps(
                1,
                60,
                &["security", "compliance", "cost", "api_usage"],
                &["keys", "endpoints", "models"],
            ),
            BotServiceAssessment => caps(
                2,
                50,
                &["performance", "cost", "integration", "channels"],
                &["channels", "dialogs", "endpoints"],
            ),
            CognitiveSearchAssessment => caps(
                1,
                70,
                &["performance", "cost", "indexing", "querying"],
                &["indexes", "skillsets", "data_sources"],
            ),
            FormRecognizerAssessment => caps(
                2,
                60,
                &["security", "accuracy", "cost", "document_processing"],
                &["models", "endpoints", "datasets"],
            ),

            GenericResourceAssessment => caps(
                GENERIC_PRIORITY,
                30,
                &["basic_security", "basic_cost", "basic_compliance"],
                &[],
            ),
            CrossResourceAnalysis => caps(
                GENERIC_PRIORITY,
                crate::config::CORRELATION_ANALYSIS_SECONDS,
                &["cross_resource_correlation"],
                &[],
            ),
        }
    }

    pub const fn priority(self) -> u8 {
        self.capabilities().priority
    }

    pub const fn execution_time_seconds(self) -> u32 {
        self.capabilities().execution_time_seconds
    }

    /// The infrastructure family, or `None` for the fallback and correlation workers.
    pub fn family(self) -> Option<WorkerFamily> {
        use WorkerType::*;

        let family = match self {
            VmAssessment | AksAssessment | AppServiceAssessment | FunctionsAssessment
            | ContainerInstancesAssessment | StorageAssessment | ManagedDisksAssessment
            | FileSharesAssessment | VnetAssessment | NsgAssessment | LoadBalancerAssessment
            | AppGatewayAssessment | FirewallAssessment | SqlAssessment | CosmosDbAssessment => {
                WorkerFamily::CoreInfrastructure
            }
            DevopsAssessment | ApiManagementAssessment | ContainerRegistryAssessment
            | LogicAppsAssessment | ServiceBusAssessment | EventGridAssessment
            | GitReposAssessment | ArtifactsAssessment => WorkerFamily::DeveloperDevops,
            SynapseAssessment | DataFactoryAssessment | DatabricksAssessment
            | HdInsightAssessment | EventHubsAssessment | StreamAnalyticsAssessment
            | IotHubAssessment | DataLakeAssessment | BlobAnalyticsAssessment
            | DataExplorerAssessment => WorkerFamily::DataAnalytics,
            AzureAdAssessment | B2cAssessment | ManagedIdentityAssessment | KeyVaultAssessment
            | DefenderAssessment | SentinelAssessment | DdosProtectionAssessment
            | PolicyAssessment => WorkerFamily::SecurityIdentity,
            LogAnalyticsAssessment | AppInsightsAssessment | MonitorAssessment
            | AutomationAssessment | UpdateManagementAssessment | CostManagementAssessment => {
                WorkerFamily::MonitoringManagement
            }
            MachineLearningAssessment | CognitiveServicesAssessment | BotServiceAssessment
            | CognitiveSearchAssessment | FormRecognizerAssessment => WorkerFamily::AiCognitive,
            GenericResourceAssessment | CrossResourceAnalysis => return None,
        };
        Some(family)
    }

    /// Wire identifier, e.g. `VM_Assessment_Agent`.
    pub fn as_str(self) -> &'static str {
        use WorkerType::*;

        match self {
            VmAssessment => "VM_Assessment_Agent",
            AksAssessment => "AKS_Assessment_Agent",
            AppServiceAssessment => "App_Service_Assessment_Agent",
            FunctionsAssessment => "Functions_Assessment_Agent",
            ContainerInstancesAssessment => "Container_Instances_Assessment_Agent",
            StorageAssessment => "Storage_Assessment_Agent",
            ManagedDisksAssessment => "Managed_Disks_Assessment_Agent",
            FileSharesAssessment => "File_Shares_Assessment_Agent",
            VnetAssessment => "VNet_Assessment_Agent",
            NsgAssessment => "NSG_Assessment_Agent",
            LoadBalancerAssessment => "Load_Balancer_Assessment_Agent",
            AppGatewayAssessment => "App_Gateway_Assessment_Agent",
            FirewallAssessment => "Firewall_Assessment_Agent",
            SqlAssessment => "SQL_Assessment_Agent",
            CosmosDbAssessment => "Cosmos_DB_Assessment_Agent",
            DevopsAssessment => "DevOps_Assessment_Agent",
            ApiManagementAssessment => "API_Management_Assessment_Agent",
            ContainerRegistryAssessment => "Container_Registry_Assessment_Agent",
            LogicAppsAssessment => "Logic_Apps_Assessment_Agent",
            ServiceBusAssessment => "Service_Bus_Assessment_Agent",
            EventGridAssessment => "Event_Grid_Assessment_Agent",
            GitReposAssessment => "Git_Repos_Assessment_Agent",
            ArtifactsAssessment => "Artifacts_Assessment_Agent",
            SynapseAssessment => "Synapse_Assessment_Agent",
            DataFactoryAssessment => "Data_Factory_Assessment_Agent",
            DatabricksAssessment => "Databricks_Assessment_Agent",
            HdInsightAssessment => "HDInsight_Assessment_Agent",
            EventHubsAssessment => "Event_Hubs_Assessment_Agent",
            StreamAnalyticsAssessment => "Stream_Analytics_Assessment_Agent",
            IotHubAssessment => "IoT_Hub_Assessment_Agent",
            DataLakeAssessment => "Data_Lake_Assessment_Agent",
            BlobAnalyticsAssessment => "Blob_Analytics_Assessment_Agent",
            DataExplorerAssessment => "Data_Explorer_Assessment_Agent",
            AzureAdAssessment => "Azure_AD_Assessment_Agent",
            B2cAssessment => "B2C_Assessment_Agent",
            ManagedIdentityAssessment => "Managed_Identity_Assessment_Agent",
            KeyVaultAssessment => "Key_Vault_Assessment_Agent",
            DefenderAssessment => "Defender_Assessment_Agent",
            SentinelAssessment => "Sentinel_Assessment_Agent",
            DdosProtectionAssessment => "DDoS_Protection_Assessment_Agent",
            PolicyAssessment => "Policy_Assessment_Agent",
            LogAnalyticsAssessment => "Log_Analytics_Assessment_Agent",
            AppInsightsAssessment => "App_Insights_Assessment_Agent",
            MonitorAssessment => "Monitor_Assessment_Agent",
            AutomationAssessment => "Automation_Assessment_Agent",
            UpdateManagementAssessment => "Update_Management_Assessment_Agent",
            CostManagementAssessment => "Cost_Management_Assessment_Agent",
            MachineLearningAssessment => "Machine_Learning_Assessment_Agent",
            CognitiveServicesAssessment => "Cognitive_Services_Assessment_Agent",
            BotServiceAssessment => "Bot_Service_Assessment_Agent",
            CognitiveSearchAssessment => "Cognitive_Search_Assessment_Agent",
            FormRecognizerAssessment => "Form_Recognizer_Assessment_Agent",
            GenericResourceAssessment => "Generic_Resource_Assessment_Agent",
            CrossResourceAnalysis => "Cross_Resource_Analysis",
        }
    }
}

impl fmt::Display for WorkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|wt| wt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown worker type: {s}"))
    }
}
