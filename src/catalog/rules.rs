//! Cross-resource correlation rule book.
//!
//! Each rule is a conjunction of `(category, predicate)` conditions. Rule
//! categories are short aliases (`vm`, `sql_database`); the alias table maps
//! concrete resource types onto them.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CatalogError;

const EMBEDDED_RULES: &str = include_str!("data/correlation_rules.json");

/// Severity of a correlation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `(category, predicate)` pair of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub category: String,
    pub predicate: String,
}

/// A named multi-condition rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRule {
    pub name: String,
    pub conditions: Vec<Condition>,
    #[serde(default = "default_severity")]
    pub severity: Severity,
    pub recommendation: String,
    pub estimated_effort_hours: f64,
    /// 1 (negligible) to 10 (critical exposure).
    pub risk_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_savings_estimate: Option<f64>,
}

fn default_severity() -> Severity {
    Severity::Medium
}

impl CorrelationRule {
    /// Distinct condition categories, in condition order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for condition in &self.conditions {
            if !seen.contains(&condition.category.as_str()) {
                seen.push(condition.category.as_str());
            }
        }
        seen
    }

    pub fn references(&self, category: &str) -> bool {
        self.conditions.iter().any(|c| c.category == category)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidRule {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("empty name"));
        }
        if self.conditions.is_empty() {
            return Err(invalid("no conditions"));
        }
        if !(1..=10).contains(&self.risk_score) {
            return Err(invalid("risk_score must be within 1..=10"));
        }
        if self.estimated_effort_hours < 0.0 {
            return Err(invalid("negative effort estimate"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    aliases: BTreeMap<String, String>,
    rules: Vec<CorrelationRule>,
}

/// Read-only rule book with severity and category indexes.
#[derive(Debug)]
pub struct CorrelationRuleBook {
    rules: Vec<CorrelationRule>,
    by_severity: HashMap<Severity, Vec<usize>>,
    /// Condition category → rule positions, ascending.
    by_category: HashMap<String, Vec<usize>>,
    /// Lowercased resource type → rule category alias.
    aliases: HashMap<String, String>,
}

impl CorrelationRuleBook {
    /// Load the rule book compiled into the binary.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json_str(EMBEDDED_RULES)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            what: "correlation rule book",
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let file: RuleFile = serde_json::from_str(raw).map_err(|source| CatalogError::Parse {
            what: "correlation rule book",
            source,
        })?;
        Self::new(file.rules, file.aliases)
    }

    /// Validate the rules and build both indexes.
    pub fn new(
        rules: Vec<CorrelationRule>,
        aliases: BTreeMap<String, String>,
    ) -> Result<Self, CatalogError> {
        let mut names = HashSet::new();
        let mut by_severity: HashMap<Severity, Vec<usize>> = HashMap::new();
        let mut by_category: HashMap<String, Vec<usize>> = HashMap::new();

        for (pos, rule) in rules.iter().enumerate() {
            rule.validate()?;
            if !names.insert(rule.name.as_str()) {
                return Err(CatalogError::DuplicateRule(rule.name.clone()));
            }
            by_severity.entry(rule.severity).or_default().push(pos);
            for category in rule.categories() {
                by_category.entry(category.to_string()).or_default().push(pos);
            }
        }

        let aliases = aliases
            .into_iter()
            .map(|(resource_type, alias)| (resource_type.to_ascii_lowercase(), alias))
            .collect();

        debug!(
            rules = rules.len(),
            categories = by_category.len(),
            "Correlation rule book loaded"
        );

        Ok(Self {
            rules,
            by_severity,
            by_category,
            aliases,
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[CorrelationRule] {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&CorrelationRule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn rules_by_severity(&self, severity: Severity) -> Vec<&CorrelationRule> {
        self.by_severity
            .get(&severity)
            .map(|positions| positions.iter().map(|&pos| &self.rules[pos]).collect())
            .unwrap_or_default()
    }

    /// Rule category alias for a resource type, if one is registered.
    pub fn alias_for(&self, resource_type: &str) -> Option<&str> {
        self.aliases
            .get(&resource_type.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Every rule that mentions at least one of `categories` in any condition.
    ///
    /// This is a coarse filter: a candidate only means the rule is worth
    /// evaluating, not that its conjunction holds. Results are in rule
    /// declaration order with no duplicates.
    pub fn candidate_rules<I, S>(&self, categories: I) -> Vec<&CorrelationRule>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positions: Vec<usize> = categories
            .into_iter()
            .filter_map(|category| self.by_category.get(category.as_ref()))
            .flatten()
            .copied()
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions.into_iter().map(|pos| &self.rules[pos]).collect()
    }

    /// Like [`candidate_rules`](Self::candidate_rules), for concrete resource types.
    ///
    /// Each type is translated through the alias table; inputs that are
    /// already aliases match as-is.
    pub fn candidate_rules_for_resource_types<I, S>(
        &self,
        resource_types: I,
    ) -> Vec<&CorrelationRule>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut categories = Vec::new();
        for resource_type in resource_types {
            let resource_type = resource_type.as_ref();
            if let Some(alias) = self.alias_for(resource_type) {
                categories.push(alias.to_string());
            }
            categories.push(resource_type.to_string());
        }
        self.candidate_rules(categories)
    }

    /// Sum of the monthly savings estimates of `rules`.
    pub fn total_monthly_savings(rules: &[&CorrelationRule]) -> f64 {
        rules
            .iter()
            .filter_map(|rule| rule.monthly_savings_estimate)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, severity: Severity, categories: &[&str]) -> CorrelationRule {
        CorrelationRule {
            name: name.to_string(),
            conditions: categories
                .iter()
                .map(|c| Condition {
                    category: c.to_string(),
                    predicate: "p".to_string(),
                })
                .collect(),
            severity,
            recommendation: "fix it".to_string(),
            estimated_effort_hours: 1.0,
            risk_score: 5,
            monthly_savings_estimate: None,
        }
    }

    #[test]
    fn embedded_rule_book_loads() {
        let book = CorrelationRuleBook::embedded().unwrap();
        assert!(book.len() >= 20);
        assert!(book.get("insecure_database_connection").is_some());
        let critical = book.rules_by_severity(Severity::Critical);
        assert!(!critical.is_empty());
        assert!(critical.iter().all(|r| r.severity == Severity::Critical));
    }

    #[test]
    fn severity_index_partitions_rules() {
        let book = CorrelationRuleBook::embedded().unwrap();
        let total: usize = Severity::ALL
            .iter()
            .map(|&s| book.rules_by_severity(s).len())
            .sum();
        assert_eq!(total, book.len());
    }

    #[test]
    fn candidates_are_union_without_duplicates() {
        let book = CorrelationRuleBook::new(
            vec![
                rule("a", Severity::High, &["vm", "nsg"]),
                rule("b", Severity::Low, &["sql_database"]),
                rule("c", Severity::Medium, &["vm", "vm", "key_vault"]),
            ],
            BTreeMap::new(),
        )
        .unwrap();
        let names: Vec<&str> = book
            .candidate_rules(["vm", "nsg", "key_vault"])
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(book.candidate_rules(["unknown"]).is_empty());
        assert!(book.candidate_rules(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn resource_types_are_aliased() {
        let book = CorrelationRuleBook::embedded().unwrap();
        assert_eq!(book.alias_for("microsoft.compute/virtualmachines"), Some("vm"));
        let candidates =
            book.candidate_rules_for_resource_types(["Microsoft.Compute/virtualMachines"]);
        assert!(!candidates.is_empty());
        assert!(candidates.iter().all(|r| r.references("vm")));
        assert_eq!(
            candidates.len(),
            book.candidate_rules(["vm"]).len(),
            "aliasing should match querying the alias directly"
        );
    }

    #[test]
    fn candidate_is_not_a_verdict() {
        // A single matching category is enough for candidacy even when
        // the rule has conditions on categories not present at all.
        let book = CorrelationRuleBook::embedded().unwrap();
        let candidates = book.candidate_rules(["redis_cache"]);
        let cascading = candidates
            .iter()
            .find(|r| r.name == "cascading_failure_risk")
            .unwrap();
        assert!(cascading.references("app_service"));
    }

    #[test]
    fn invalid_risk_score_rejected() {
        let mut bad = rule("bad", Severity::Low, &["vm"]);
        bad.risk_score = 11;
        let err = CorrelationRuleBook::new(vec![bad], BTreeMap::new()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRule { .. }));
    }

    #[test]
    fn duplicate_rule_rejected() {
        let err = CorrelationRuleBook::new(
            vec![rule("x", Severity::Low, &["vm"]), rule("x", Severity::High, &["nsg"])],
            BTreeMap::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateRule(_)));
    }

    #[test]
    fn savings_sum_ignores_missing_estimates() {
        let book = CorrelationRuleBook::embedded().unwrap();
        let cost_rules: Vec<&CorrelationRule> = book
            .rules()
            .iter()
            .filter(|r| r.name == "redundant_backup_costs" || r.name == "single_point_of_failure")
            .collect();
        assert_eq!(CorrelationRuleBook::total_monthly_savings(&cost_rules), 200.0);
    }
}
