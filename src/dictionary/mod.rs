//! Definition Dictionary
//!
//! The flattened, inheritance-resolved view of a schema: classes keyed by
//! code, each owning property sets of properties with optional allowed values.
//!
//! Produced in stages:
//! 1. [`DefinitionGraphBuilder`] walks the [`SchemaIndex`](crate::model::SchemaIndex)
//!    and emits the full map
//! 2. [`DefinitionFilter`] prunes it to semantically relevant classes
//! 3. [`CrossReferenceAnnotator`] brackets code references in every text field
//!
//! Maps are [`IndexMap`]s so every stage preserves document order.

pub mod annotate;
pub mod builder;
pub mod diagnostics;
pub mod filter;
pub mod values;

pub use annotate::{CodeRegistry, CrossReferenceAnnotator};
pub use builder::{BuildResult, DefinitionGraphBuilder};
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use filter::{DefinitionFilter, Inclusion};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Class code -> definition, in document order
pub type DefinitionMap = IndexMap<String, ClassDefinition>;

/// How a property holds its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    Single,
    Range,
    Complex,
    List,
}

/// One admissible value of a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedValue {
    /// Literal token as declared in the schema
    pub value: String,
    /// Never empty
    pub description: String,
    pub package: String,
}

/// A property inside a property set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    pub definition: String,
    /// Explanation of the value shape for range, list and complex properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: PropertyKind,
    /// Primitive type name (lower case) or enumeration name
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<AllowedValue>>,
    pub package: String,
}

/// Property name -> definition, keys unique per owning class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySetDefinition {
    pub properties: IndexMap<String, PropertyDefinition>,
}

/// A class of the dictionary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    /// Display form of the code
    pub name: String,
    pub definition: String,
    /// Free text beside the definition; empty unless a later stage sets it
    #[serde(default)]
    pub description: String,
    /// Code of the single superclass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub package: String,
    /// Property-set name -> property set
    #[serde(default)]
    pub property_sets: IndexMap<String, PropertySetDefinition>,
}

impl ClassDefinition {
    /// Whether the class owns a property set other than `attributes_bucket`
    pub fn has_named_property_sets(&self, attributes_bucket: &str) -> bool {
        self.property_sets.keys().any(|name| name != attributes_bucket)
    }

    /// Property by set and name
    pub fn property(&self, set: &str, name: &str) -> Option<&PropertyDefinition> {
        self.property_sets.get(set).and_then(|s| s.properties.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_property_sets() {
        let mut class = ClassDefinition::default();
        assert!(!class.has_named_property_sets("Attributes"));
        class.property_sets.insert("Attributes".to_string(), PropertySetDefinition::default());
        assert!(!class.has_named_property_sets("Attributes"));
        class.property_sets.insert("Pset_PumpCommon".to_string(), PropertySetDefinition::default());
        assert!(class.has_named_property_sets("Attributes"));
    }
}
