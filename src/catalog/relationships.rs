//! Category-level relationship knowledge base.
//!
//! Maps a resource category to the categories it depends on and the ones it
//! impacts. Category lookups are case-insensitive (resource type names are),
//! but results always carry the spelling from the catalog file.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CatalogError;

const EMBEDDED_RELATIONSHIPS: &str = include_str!("data/relationships.json");

/// Static edge list for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEdge {
    pub category: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub impacts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RelationshipFile {
    categories: Vec<CategoryEdge>,
    #[serde(default)]
    patterns: BTreeMap<String, Vec<Vec<String>>>,
}

/// Read-only category relationship catalog.
#[derive(Debug)]
pub struct RelationshipCatalog {
    edges: Vec<CategoryEdge>,
    /// Lowercased category → position in `edges`.
    index: HashMap<String, usize>,
    /// Lowercased category → categories whose `impacts` list it.
    impacted_by: HashMap<String, Vec<String>>,
    /// Lowercased category → categories whose `depends_on` list it.
    depended_on_by: HashMap<String, Vec<String>>,
    /// Named multi-hop flows (`data_flow`, `security_chain`, `network_flow`).
    patterns: BTreeMap<String, Vec<Vec<String>>>,
}

impl RelationshipCatalog {
    /// Load the catalog compiled into the binary.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json_str(EMBEDDED_RELATIONSHIPS)
    }

    /// Load a catalog from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            what: "relationship catalog",
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let file: RelationshipFile =
            serde_json::from_str(raw).map_err(|source| CatalogError::Parse {
                what: "relationship catalog",
                source,
            })?;
        Self::from_edges(file.categories, file.patterns)
    }

    /// Build the catalog and its reverse indexes from an edge list.
    pub fn from_edges(
        edges: Vec<CategoryEdge>,
        patterns: BTreeMap<String, Vec<Vec<String>>>,
    ) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(edges.len());
        for (pos, edge) in edges.iter().enumerate() {
            if index.insert(edge.category.to_ascii_lowercase(), pos).is_some() {
                return Err(CatalogError::DuplicateCategory(edge.category.clone()));
            }
        }

        let impacted_by = invert(&edges, |edge| &edge.impacts);
        let depended_on_by = invert(&edges, |edge| &edge.depends_on);

        debug!(
            categories = edges.len(),
            patterns = patterns.len(),
            "Relationship catalog loaded"
        );

        Ok(Self {
            edges,
            index,
            impacted_by,
            depended_on_by,
            patterns,
        })
    }

    fn edge(&self, category: &str) -> Option<&CategoryEdge> {
        self.index
            .get(&category.to_ascii_lowercase())
            .map(|&pos| &self.edges[pos])
    }

    /// Whether the catalog declares an edge list for `category`.
    pub fn contains(&self, category: &str) -> bool {
        self.edge(category).is_some()
    }

    /// Categories with a declared edge list, in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.edges.iter().map(|edge| edge.category.as_str())
    }

    pub fn dependencies(&self, category: &str) -> &[String] {
        self.edge(category)
            .map(|edge| edge.depends_on.as_slice())
            .unwrap_or_default()
    }

    pub fn impacts(&self, category: &str) -> &[String] {
        self.edge(category)
            .map(|edge| edge.impacts.as_slice())
            .unwrap_or_default()
    }

    /// Categories that list `category` among their impacts.
    pub fn impacted_by(&self, category: &str) -> &[String] {
        self.impacted_by
            .get(&category.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Categories that list `category` among their dependencies.
    pub fn depended_on_by(&self, category: &str) -> &[String] {
        self.depended_on_by
            .get(&category.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Named relationship patterns of one kind, e.g. `data_flow`.
    pub fn relationship_patterns(&self, kind: &str) -> &[Vec<String>] {
        self.patterns
            .get(kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Shortest chain of categories linking `start` to `end`.
    ///
    /// Breadth-first over both edge kinds in either direction. Forward edges
    /// (`dependencies` then `impacts`) are expanded before reverse ones, so
    /// among equally short paths the one following declared edges wins.
    /// Returns an empty vector when the two are not connected.
    pub fn find_chain(&self, start: &str, end: &str) -> Vec<String> {
        let end_key = end.to_ascii_lowercase();
        if start.eq_ignore_ascii_case(end) {
            return vec![start.to_string()];
        }

        let mut visited = HashSet::from([start.to_ascii_lowercase()]);
        let mut queue = VecDeque::from([vec![start.to_string()]]);

        while let Some(path) = queue.pop_front() {
            let Some(current) = path.last() else {
                continue;
            };

            for next in self.neighbours(current) {
                let key = next.to_ascii_lowercase();
                if !visited.insert(key.clone()) {
                    continue;
                }
                let mut next_path = path.clone();
                next_path.push(next.clone());
                if key == end_key {
                    return next_path;
                }
                queue.push_back(next_path);
            }
        }

        Vec::new()
    }

    fn neighbours<'a>(&'a self, category: &str) -> impl Iterator<Item = &'a String> {
        self.dependencies(category)
            .iter()
            .chain(self.impacts(category))
            .chain(self.depended_on_by(category))
            .chain(self.impacted_by(category))
    }
}

/// Reverse an edge list: target → sources in declaration order, without repeats.
fn invert<F>(edges: &[CategoryEdge], targets: F) -> HashMap<String, Vec<String>>
where
    F: Fn(&CategoryEdge) -> &Vec<String>,
{
    let mut reverse: HashMap<String, Vec<String>> = HashMap::new();
    for edge in edges {
        for target in targets(edge) {
            let sources = reverse.entry(target.to_ascii_lowercase()).or_default();
            if !sources.contains(&edge.category) {
                sources.push(edge.category.clone());
            }
        }
    }
    reverse
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(category: &str, depends_on: &[&str], impacts: &[&str]) -> CategoryEdge {
        CategoryEdge {
            category: category.to_string(),
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            impacts: impacts.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn small() -> RelationshipCatalog {
        RelationshipCatalog::from_edges(
            vec![
                edge("app", &["db", "cache"], &["cdn"]),
                edge("db", &["net"], &[]),
                edge("cache", &["net"], &["app"]),
                edge("island", &[], &[]),
            ],
            BTreeMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn embedded_catalog_loads() {
        let catalog = RelationshipCatalog::embedded().unwrap();
        assert!(catalog.contains("Microsoft.Compute/virtualMachines"));
        assert_eq!(
            catalog.dependencies("Microsoft.Compute/virtualMachines")[0],
            "Microsoft.Network/networkInterfaces"
        );
        assert!(!catalog.relationship_patterns("data_flow").is_empty());
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let catalog = RelationshipCatalog::embedded().unwrap();
        assert_eq!(
            catalog.dependencies("microsoft.compute/virtualmachines"),
            catalog.dependencies("Microsoft.Compute/virtualMachines")
        );
    }

    #[test]
    fn impacted_by_inverts_impacts() {
        let catalog = RelationshipCatalog::embedded().unwrap();
        let impactors = catalog.impacted_by("Microsoft.Web/sites");
        assert!(impactors.iter().any(|c| c == "Microsoft.Storage/storageAccounts"));
        assert!(impactors.iter().any(|c| c == "Microsoft.KeyVault/vaults"));
        for source in impactors {
            assert!(catalog.impacts(source).iter().any(|c| c == "Microsoft.Web/sites"));
        }
    }

    #[test]
    fn unknown_category_is_isolated() {
        let catalog = small();
        assert!(catalog.dependencies("Contoso.Custom/widget").is_empty());
        assert!(catalog.impacts("Contoso.Custom/widget").is_empty());
        assert!(catalog.impacted_by("Contoso.Custom/widget").is_empty());
        assert!(catalog.find_chain("Contoso.Custom/widget", "app").is_empty());
    }

    #[test]
    fn chain_to_self_is_single_element() {
        let catalog = small();
        assert_eq!(catalog.find_chain("app", "app"), vec!["app"]);
        assert_eq!(
            catalog.find_chain("Contoso.Custom/widget", "Contoso.Custom/widget"),
            vec!["Contoso.Custom/widget"]
        );
    }

    #[test]
    fn chain_prefers_declaration_order() {
        let catalog = small();
        // app -> db -> net and app -> cache -> net are both two hops; db is declared first.
        assert_eq!(catalog.find_chain("app", "net"), vec!["app", "db", "net"]);
    }

    #[test]
    fn chain_follows_reverse_edges() {
        let catalog = small();
        assert_eq!(catalog.find_chain("net", "app"), vec!["net", "db", "app"]);
        assert_eq!(catalog.find_chain("cdn", "app"), vec!["cdn", "app"]);
    }

    #[test]
    fn chain_existence_is_symmetric() {
        let catalog = RelationshipCatalog::embedded().unwrap();
        let categories: Vec<String> = catalog.categories().map(str::to_string).collect();
        for a in categories.iter().take(8) {
            for b in categories.iter().rev().take(8) {
                let forward = catalog.find_chain(a, b);
                let backward = catalog.find_chain(b, a);
                assert_eq!(forward.is_empty(), backward.is_empty(), "{a} <-> {b}");
                assert_eq!(forward.len(), backward.len());
            }
        }
    }

    #[test]
    fn disconnected_returns_empty() {
        let catalog = small();
        assert!(catalog.find_chain("app", "island").is_empty());
        assert!(catalog.find_chain("island", "app").is_empty());
    }

    #[test]
    fn duplicate_category_rejected() {
        let err = RelationshipCatalog::from_edges(
            vec![edge("A", &[], &[]), edge("a", &[], &[])],
            BTreeMap::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCategory(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = RelationshipCatalog::from_json_str("{\"categories\": 4}").unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }
}
