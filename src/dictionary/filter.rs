//! Definition Filter
//!
//! Prunes the full definition map to the semantically relevant classes. A
//! class is kept when its parent chain (the class itself included) reaches a
//! root anchor, or when the class or any descendant owns a named property
//! set. The attributes bucket does not count as a named set.
//!
//! The parent/child hierarchy is loaded into a petgraph [`DiGraph`] and the
//! descendant closure is aggregated bottom-up in one post-order walk, so the
//! cost stays linear however deep or wide the hierarchy gets.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::DfsPostOrder;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

use super::DefinitionMap;
use crate::config::DictionaryConfig;

/// Keeps anchored classes and classes carrying property sets
#[derive(Debug, Clone)]
pub struct DefinitionFilter {
    root_anchors: Vec<String>,
    attributes_bucket: String,
}

impl DefinitionFilter {
    pub fn new(root_anchors: Vec<String>, attributes_bucket: impl Into<String>) -> Self {
        Self {
            root_anchors,
            attributes_bucket: attributes_bucket.into(),
        }
    }

    pub fn from_config(config: &DictionaryConfig) -> Self {
        Self::new(
            config.filter.root_anchors.clone(),
            config.extraction.attributes_bucket.clone(),
        )
    }

    /// Evaluate the inclusion rule over `classes` once, for repeated lookups
    pub fn inclusion<'m>(&'m self, classes: &'m DefinitionMap) -> Inclusion<'m> {
        let with_sets = Hierarchy::new(classes).closure_with_named_sets(classes, &self.attributes_bucket);
        Inclusion {
            classes,
            root_anchors: &self.root_anchors,
            with_sets,
        }
    }

    /// Sub-map of `classes` satisfying the inclusion rule, in the input order
    pub fn apply(&self, classes: &DefinitionMap) -> DefinitionMap {
        let inclusion = self.inclusion(classes);

        let filtered: DefinitionMap = classes
            .iter()
            .filter(|(code, _)| inclusion.should_include(code))
            .map(|(code, class)| (code.clone(), class.clone()))
            .collect();

        tracing::info!(
            kept = filtered.len(),
            dropped = classes.len() - filtered.len(),
            "definition filter applied"
        );
        filtered
    }
}

/// Inclusion rule bound to one class map, with the descendant closure precomputed
pub struct Inclusion<'m> {
    classes: &'m DefinitionMap,
    root_anchors: &'m [String],
    with_sets: HashSet<&'m str>,
}

impl Inclusion<'_> {
    /// Anchored through the parent chain, or the class or a descendant owns a named set
    pub fn should_include(&self, code: &str) -> bool {
        self.with_sets.contains(code) || self.is_anchored(code)
    }

    fn is_anchored(&self, code: &str) -> bool {
        parent_chain(self.classes, code).any(|link| self.root_anchors.iter().any(|anchor| anchor == link))
    }
}

/// `code` followed by its parent links, stopping at a missing class or a repeat
pub fn parent_chain<'m>(classes: &'m DefinitionMap, code: &'m str) -> impl Iterator<Item = &'m str> + 'm {
    let mut seen: HashSet<&'m str> = HashSet::new();
    let mut next = Some(code);

    std::iter::from_fn(move || {
        let current = next.take()?;
        if !seen.insert(current) {
            return None;
        }
        next = classes.get(current).and_then(|class| class.parent.as_deref());
        Some(current)
    })
}

/// Parent -> child graph over the class codes
struct Hierarchy<'m> {
    graph: DiGraph<&'m str, ()>,
    nodes: HashMap<&'m str, NodeIndex>,
}

impl<'m> Hierarchy<'m> {
    fn new(classes: &'m DefinitionMap) -> Self {
        let mut graph = DiGraph::with_capacity(classes.len(), classes.len());
        let mut nodes = HashMap::with_capacity(classes.len());

        for code in classes.keys() {
            nodes.insert(code.as_str(), graph.add_node(code.as_str()));
        }
        for (code, class) in classes {
            // Parents outside the map have no node; the child stays a root
            if let Some(&parent) = class.parent.as_deref().and_then(|p| nodes.get(p)) {
                graph.add_edge(parent, nodes[code.as_str()], ());
            }
        }

        Self { graph, nodes }
    }

    /// Codes whose class or any descendant owns a set other than `attributes_bucket`
    fn closure_with_named_sets(&self, classes: &'m DefinitionMap, attributes_bucket: &str) -> HashSet<&'m str> {
        let mut memo: HashMap<NodeIndex, bool> = HashMap::with_capacity(self.nodes.len());
        let mut dfs = DfsPostOrder::empty(&self.graph);

        for start in self.graph.node_indices() {
            if memo.contains_key(&start) {
                continue;
            }
            dfs.move_to(start);
            while let Some(node) = dfs.next(&self.graph) {
                let code = self.graph[node];
                let own = classes
                    .get(code)
                    .map(|class| class.has_named_property_sets(attributes_bucket))
                    .unwrap_or(false);
                // Post-order: every child is memoized before its parent
                let inherited = self
                    .graph
                    .neighbors_directed(node, Direction::Outgoing)
                    .any(|child| memo.get(&child).copied().unwrap_or(false));
                memo.insert(node, own || inherited);
            }
        }

        memo.into_iter()
            .filter(|(_, has_sets)| *has_sets)
            .map(|(node, _)| self.graph[node])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{ClassDefinition, PropertySetDefinition};

    fn class(parent: Option<&str>, sets: &[&str]) -> ClassDefinition {
        let mut class = ClassDefinition {
            parent: parent.map(str::to_string),
            ..Default::default()
        };
        for set in sets {
            class
                .property_sets
                .insert(set.to_string(), PropertySetDefinition::default());
        }
        class
    }

    fn filter() -> DefinitionFilter {
        DefinitionFilter::new(vec!["IfcRoot".to_string()], "Attributes")
    }

    #[test]
    fn test_parent_chain_includes_self() {
        let mut classes = DefinitionMap::new();
        classes.insert("IfcRoot".into(), class(None, &[]));
        classes.insert("IfcObject".into(), class(Some("IfcRoot"), &[]));
        let chain: Vec<_> = parent_chain(&classes, "IfcObject").collect();
        assert_eq!(chain, vec!["IfcObject", "IfcRoot"]);
    }

    #[test]
    fn test_parent_chain_stops_on_cycle() {
        let mut classes = DefinitionMap::new();
        classes.insert("A".into(), class(Some("B"), &[]));
        classes.insert("B".into(), class(Some("A"), &[]));
        assert_eq!(parent_chain(&classes, "A").count(), 2);
    }

    #[test]
    fn test_child_with_sets_retains_parent() {
        let mut classes = DefinitionMap::new();
        classes.insert("IfcCurve".into(), class(None, &["Attributes"]));
        classes.insert("IfcLine".into(), class(Some("IfcCurve"), &["Pset_LineCommon"]));
        classes.insert("IfcPoint".into(), class(None, &["Attributes"]));

        let filtered = filter().apply(&classes);
        assert!(filtered.contains_key("IfcCurve"));
        assert!(filtered.contains_key("IfcLine"));
        assert!(!filtered.contains_key("IfcPoint"));
    }

    #[test]
    fn test_anchored_class_without_sets_kept() {
        let mut classes = DefinitionMap::new();
        classes.insert("IfcRoot".into(), class(None, &[]));
        classes.insert("IfcActor".into(), class(Some("IfcRoot"), &[]));
        let f = filter();
        let inclusion = f.inclusion(&classes);
        assert!(inclusion.should_include("IfcActor"));
        assert!(!inclusion.should_include("IfcUnknown"));
        assert_eq!(f.apply(&classes).len(), 2);
    }

    #[test]
    fn test_cyclic_hierarchy_terminates() {
        let mut classes = DefinitionMap::new();
        classes.insert("A".into(), class(Some("B"), &[]));
        classes.insert("B".into(), class(Some("A"), &["Pset_X"]));
        let filtered = filter().apply(&classes);
        assert!(filtered.contains_key("B"));
    }
}
