//! Inheritance Resolution
//!
//! Two hierarchies live in the schema graph:
//! - generalization edges (`meta.generalization`, by id) between defined types
//!   and their primitive roots
//! - declared supertypes (`meta.supertypes`, by name) between entities
//!
//! Both are assumed acyclic upstream. Every walk still carries a visited set,
//! so a malformed graph ends the walk at the first repeated node instead of
//! looping.

use std::collections::{HashSet, VecDeque};

use super::{ItemKind, SchemaIndex, SchemaItem};

/// Answers hierarchy queries over a [`SchemaIndex`]
pub struct InheritanceResolver<'a> {
    index: &'a SchemaIndex,
}

impl<'a> InheritanceResolver<'a> {
    pub fn new(index: &'a SchemaIndex) -> Self {
        Self { index }
    }

    /// Follow generalization edges to the hierarchy root.
    ///
    /// Returns the input when it has no generalization, or when the edge
    /// points at an id missing from the index.
    pub fn root_generalization(&self, item: &'a SchemaItem) -> &'a SchemaItem {
        let mut current = item;
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(current.id.as_str());

        while let Some(general) = current
            .meta
            .generalization
            .as_deref()
            .and_then(|id| self.index.get(id))
        {
            if !visited.insert(general.id.as_str()) {
                tracing::warn!(item = %item.name, at = %general.name, "generalization cycle");
                break;
            }
            current = general;
        }
        current
    }

    /// Transitive supertype names of an item, nearest first.
    ///
    /// Supertypes are resolved by name against entities; a name with no entity
    /// behind it is still reported but not expanded further.
    pub fn ancestors_of(&self, id: &str) -> Vec<&'a str> {
        let Some(start) = self.index.get(id) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&'a str> = start.meta.supertypes.iter().map(String::as_str).collect();

        while let Some(name) = queue.pop_front() {
            if name == start.name || !seen.insert(name) {
                continue;
            }
            result.push(name);
            if let Some(parent) = self.index.find_named(name, &[ItemKind::Entity]) {
                queue.extend(parent.meta.supertypes.iter().map(String::as_str));
            }
        }
        result
    }

    /// Whether `anchor` is among the supertypes of `id`
    pub fn descends_from(&self, id: &str, anchor: &str) -> bool {
        self.ancestors_of(id).iter().any(|name| *name == anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::load_from_str;

    const HIERARCHY: &str = r#"{"items": [
        {"id": "r", "name": "IfcRoot", "kind": "ENTITY"},
        {"id": "o", "name": "IfcObject", "kind": "ENTITY", "meta": {"supertypes": ["IfcRoot"]}},
        {"id": "to", "name": "IfcTypeObject", "kind": "ENTITY", "meta": {"supertypes": ["IfcObject"]}},
        {"id": "pt", "name": "IfcPumpType", "kind": "ENTITY", "meta": {"supertypes": ["IfcTypeObject"]}},
        {"id": "real", "name": "REAL", "kind": "OTHER"},
        {"id": "len", "name": "IfcLengthMeasure", "kind": "TYPE", "meta": {"generalization": "real"}},
        {"id": "pos", "name": "IfcPositiveLengthMeasure", "kind": "TYPE", "meta": {"generalization": "len"}},
        {"id": "c1", "name": "Loop1", "kind": "TYPE", "meta": {"generalization": "c2"}},
        {"id": "c2", "name": "Loop2", "kind": "TYPE", "meta": {"generalization": "c1"}}
    ]}"#;

    #[test]
    fn test_root_generalization() {
        let index = load_from_str(HIERARCHY).unwrap();
        let resolver = InheritanceResolver::new(&index);
        let pos = index.get("pos").unwrap();
        assert_eq!(resolver.root_generalization(pos).name, "REAL");
        let real = index.get("real").unwrap();
        assert_eq!(resolver.root_generalization(real).name, "REAL");
    }

    #[test]
    fn test_root_generalization_cycle_terminates() {
        let index = load_from_str(HIERARCHY).unwrap();
        let resolver = InheritanceResolver::new(&index);
        let c1 = index.get("c1").unwrap();
        assert_eq!(resolver.root_generalization(c1).name, "Loop2");
    }

    #[test]
    fn test_ancestors_of() {
        let index = load_from_str(HIERARCHY).unwrap();
        let resolver = InheritanceResolver::new(&index);
        assert_eq!(
            resolver.ancestors_of("pt"),
            vec!["IfcTypeObject", "IfcObject", "IfcRoot"]
        );
        assert!(resolver.descends_from("pt", "IfcTypeObject"));
        assert!(!resolver.descends_from("o", "IfcTypeObject"));
        assert!(resolver.ancestors_of("missing").is_empty());
    }
}
