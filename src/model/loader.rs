//! Schema Loading
//!
//! Reads a serialized [`SchemaDocument`] and builds the [`SchemaIndex`]:
//! id table, kind and name indexes, and the association index. The document
//! bytes are hashed so a run can be tied to the exact input it consumed.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::{ItemId, ItemKind, SchemaDocument, SchemaIndex};
use crate::error::{DictionaryError, Result};

/// Load a schema snapshot from a JSON file
pub fn load_from_path(path: &Path) -> Result<SchemaIndex> {
    let content = fs::read_to_string(path)?;
    load_from_str(&content).map_err(|e| match e {
        DictionaryError::Json(err) => DictionaryError::InvalidDocument(format!(
            "Failed to parse JSON in {}: {}",
            path.display(),
            err
        )),
        other => other,
    })
}

/// Load a schema snapshot from JSON text
pub fn load_from_str(content: &str) -> Result<SchemaIndex> {
    let document: SchemaDocument = serde_json::from_str(content)?;

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let document_hash = format!("{:x}", hasher.finalize());

    build_index(document, document_hash)
}

impl SchemaIndex {
    /// Build an index from an in-memory document (hash left empty)
    pub fn from_document(document: SchemaDocument) -> Result<Self> {
        build_index(document, String::new())
    }
}

fn build_index(document: SchemaDocument, document_hash: String) -> Result<SchemaIndex> {
    let item_count = document.items.len();

    let mut by_id = HashMap::with_capacity(item_count);
    let mut child_by_id = HashMap::with_capacity(item_count * 4);
    let mut by_kind: HashMap<ItemKind, Vec<usize>> = HashMap::new();
    let mut by_name: HashMap<String, Vec<usize>> = HashMap::with_capacity(item_count);

    for (pos, item) in document.items.iter().enumerate() {
        if item.id.is_empty() {
            return Err(DictionaryError::InvalidDocument(format!(
                "item '{}' has an empty id",
                item.name
            )));
        }
        if by_id.insert(item.id.clone(), pos).is_some() {
            return Err(DictionaryError::DuplicateId(item.id.clone()));
        }
        by_kind.entry(item.kind).or_default().push(pos);
        by_name.entry(item.name.clone()).or_default().push(pos);

        for (cpos, child) in item.children.iter().enumerate() {
            // Children without ids cannot be referenced; nothing to index
            if !child.id.is_empty() {
                child_by_id.entry(child.id.clone()).or_insert((pos, cpos));
            }
        }
    }

    let mut associations_by_type: HashMap<ItemId, Vec<usize>> = HashMap::new();
    for (ai, assoc) in document.associations.iter().enumerate() {
        for end in &assoc.ends {
            let entry = associations_by_type.entry(end.type_ref.clone()).or_default();
            if entry.last() != Some(&ai) {
                entry.push(ai);
            }
        }
    }

    tracing::debug!(
        items = item_count,
        associations = document.associations.len(),
        "schema index built"
    );

    Ok(SchemaIndex {
        items: document.items,
        by_id,
        child_by_id,
        by_kind,
        by_name,
        associations: document.associations,
        associations_by_type,
        name: document.name,
        document_hash,
    })
}
