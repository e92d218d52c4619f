//! Schema Object Graph
//!
//! Read-only indexed view of an already-parsed schema graph. The index is built
//! once from a [`SchemaDocument`] and never mutated; every pass of the
//! dictionary builder consumes it through the lookups below.
//!
//! Node kinds are resolved to the closed [`ItemKind`] tag at load time, so no
//! consumer has to probe nodes for the presence of kind-specific fields.

pub mod inheritance;
pub mod loader;

pub use inheritance::InheritanceResolver;
pub use loader::{load_from_path, load_from_str};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a node in the schema graph
pub type ItemId = String;

// =============================================================================
// Item Kind
// =============================================================================

/// Closed set of node kinds the builder routes on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemKind {
    /// Class-like item with attributes and an inheritance position
    Entity,
    /// Fixed set of literal tokens
    Enum,
    /// Defined scalar type
    Type,
    /// Open choice between several types
    Select,
    /// Property set
    Pset,
    /// Quantity set
    Qset,
    /// Anything else the parser emitted (functions, rules, ...)
    #[serde(other)]
    Other,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "ENTITY",
            Self::Enum => "ENUM",
            Self::Type => "TYPE",
            Self::Select => "SELECT",
            Self::Pset => "PSET",
            Self::Qset => "QSET",
            Self::Other => "OTHER",
        }
    }

    /// Property and quantity sets
    pub fn is_property_set(&self) -> bool {
        matches!(self, Self::Pset | Self::Qset)
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Documentation
// =============================================================================

/// Raw documentation text, or the explicit marker that none was written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Documentation {
    Text(String),
    #[default]
    Missing,
}

impl Documentation {
    /// Raw text, empty for missing documentation
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Missing => "",
        }
    }
}

impl From<Option<String>> for Documentation {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) => Self::Text(s),
            None => Self::Missing,
        }
    }
}

impl From<Documentation> for Option<String> {
    fn from(value: Documentation) -> Self {
        match value {
            Documentation::Text(s) => Some(s),
            Documentation::Missing => None,
        }
    }
}

impl From<&str> for Documentation {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

// =============================================================================
// Children
// =============================================================================

/// How a property-set member declares its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Plain single value
    Single,
    /// Single value drawn from an enumeration
    Enumerated,
    /// Upper/lower bounded value
    Bounded,
    /// Reference to another object
    Reference,
    /// List of values
    List,
    /// Two-column table of defining/defined values
    Table,
}

/// Attribute, literal or property owned by a [`SchemaItem`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaChild {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub documentation: Documentation,
    /// Id of the declared value type (entity attributes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<ItemId>,
    /// Name of the declared value type (property-set members, predefined types)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Value category of a property-set member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_kind: Option<ValueKind>,
}

// =============================================================================
// Items
// =============================================================================

/// Metadata attached by the parser
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Declared supertypes by name, nearest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<String>,
    /// Back-references to owning items (property-set applicability)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refs: Vec<ItemId>,
    /// Generalization edge to the general item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generalization: Option<ItemId>,
    /// Hardcoded underlying definition of a defined type (e.g. `STRING(22) FIXED`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbatim_super: Option<String>,
}

/// Node of the schema graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaItem {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub documentation: Documentation,
    #[serde(default)]
    pub children: Vec<SchemaChild>,
    #[serde(default)]
    pub meta: ItemMetadata,
    /// Enclosing scope names, outermost first
    #[serde(default)]
    pub package: Vec<String>,
}

impl SchemaItem {
    /// Innermost package name, used to partition output
    pub fn package_name(&self) -> &str {
        self.package.last().map(String::as_str).unwrap_or("")
    }

    /// Child by name
    pub fn child(&self, name: &str) -> Option<&SchemaChild> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// One end of an association between two items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationEnd {
    /// Role name (matches the attribute name on the owning side)
    #[serde(default)]
    pub name: String,
    /// Declared type of this end
    pub type_ref: ItemId,
}

/// Binary association as emitted by the parser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Association {
    #[serde(default)]
    pub id: Option<ItemId>,
    pub ends: Vec<AssociationEnd>,
}

/// Serialized snapshot of a parsed schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub name: Option<String>,
    pub items: Vec<SchemaItem>,
    #[serde(default)]
    pub associations: Vec<Association>,
}

// =============================================================================
// Schema Index
// =============================================================================

/// Immutable index over the schema graph
#[derive(Debug)]
pub struct SchemaIndex {
    /// Items in document order
    pub(crate) items: Vec<SchemaItem>,

    /// Index: id -> position in `items`
    pub(crate) by_id: HashMap<ItemId, usize>,

    /// Index: child id -> (owner position, child position)
    pub(crate) child_by_id: HashMap<ItemId, (usize, usize)>,

    /// Index: kind -> positions in document order
    pub(crate) by_kind: HashMap<ItemKind, Vec<usize>>,

    /// Index: name -> positions (names can collide!)
    pub(crate) by_name: HashMap<String, Vec<usize>>,

    /// Associations as loaded
    pub(crate) associations: Vec<Association>,

    /// Index: type id -> associations having an end of that type
    pub(crate) associations_by_type: HashMap<ItemId, Vec<usize>>,

    /// Document name, if the snapshot carried one
    pub name: Option<String>,

    /// SHA-256 of the loaded document bytes
    pub document_hash: String,
}

impl SchemaIndex {
    /// Item count
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in document order
    pub fn items(&self) -> impl Iterator<Item = &SchemaItem> {
        self.items.iter()
    }

    /// Item by id
    pub fn get(&self, id: &str) -> Option<&SchemaItem> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    /// Child (attribute, literal, property) by id, with its owner
    pub fn get_child(&self, id: &str) -> Option<(&SchemaItem, &SchemaChild)> {
        self.child_by_id.get(id).map(|&(owner, child)| {
            let item = &self.items[owner];
            (item, &item.children[child])
        })
    }

    /// Name of any node (item or child) by id
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.get(id)
            .map(|item| item.name.as_str())
            .or_else(|| self.get_child(id).map(|(_, child)| child.name.as_str()))
    }

    /// Items of a kind in document order
    pub fn of_kind(&self, kind: ItemKind) -> impl Iterator<Item = &SchemaItem> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flatten()
            .map(|&i| &self.items[i])
    }

    /// Items with a name, in document order
    pub fn by_name(&self, name: &str) -> impl Iterator<Item = &SchemaItem> {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|&i| &self.items[i])
    }

    /// First item with this name whose kind is one of `kinds`
    pub fn find_named(&self, name: &str, kinds: &[ItemKind]) -> Option<&SchemaItem> {
        // Preserve the priority order of `kinds`, not document order
        kinds
            .iter()
            .find_map(|kind| self.by_name(name).find(|item| item.kind == *kind))
    }

    /// Association ends whose peer end is typed by `owner_id`
    pub fn association_ends(&self, owner_id: &str) -> Vec<&AssociationEnd> {
        let mut ends = Vec::new();
        for &ai in self.associations_by_type.get(owner_id).into_iter().flatten() {
            let assoc = &self.associations[ai];
            if assoc.ends.len() != 2 {
                continue;
            }
            for (i, end) in assoc.ends.iter().enumerate() {
                let peer = &assoc.ends[1 - i];
                if peer.type_ref == owner_id && end.type_ref != owner_id {
                    ends.push(end);
                }
            }
        }
        ends
    }
}
