//! Definition Graph Builder
//!
//! Walks the schema index in four passes and produces the full, unfiltered
//! [`DefinitionMap`]:
//!
//! 1. **Classification**: routes every non-deprecated item by kind. Entities
//!    become classes, enumerations and property sets are set aside.
//! 2. **Predefined-type expansion**: one synthetic subclass per literal of an
//!    entity's predefined-type enumeration.
//! 3. **Property-set attachment**: resolves each set's back-references to
//!    owning classes (synthetic subclasses included) and attaches its
//!    properties.
//! 4. **Implicit attributes**: scalar and enumerated entity attributes become
//!    properties of the reserved attributes bucket.
//!
//! Problems with single items are recorded in [`Diagnostics`] and skipped;
//! the map only ever grows, so nothing needs to be rolled back.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use super::diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics};
use super::values::{allowed_values, implicit_values};
use super::{DefinitionMap, PropertyDefinition, PropertyKind};
use crate::config::ExtractionConfig;
use crate::model::{InheritanceResolver, ItemId, ItemKind, SchemaChild, SchemaIndex, SchemaItem, ValueKind};
use crate::text::{case_correct, display_name, strip_markup, strip_value_explanation, title_case, WordSplitter};

const BOUNDED_VALUE_TEXT: &str = "This property in IFC stores a bounded value, meaning it has a maximum of two \
    (numeric or descriptive) values assigned, the first value specifying the upper bound and the second \
    value specifying the lower bound. Read the IFC documentation for more information.";

const REFERENCE_VALUE_TEXT: &str = "This property in IFC takes as its value a reference to one of: IfcAddress, \
    IfcAppliedValue, IfcExternalReference, IfcMaterialDefinition, IfcOrganization, IfcPerson, \
    IfcPersonAndOrganization, IfcTable, IfcTimeSeries. Read the IFC documentation for more information.";

const LIST_VALUE_TEXT: &str =
    "This property in IFC takes list as its value. Read the IFC documentation for more information.";

const TABLE_VALUE_TEXT: &str = "This property in IFC takes a table as its value. That table has two columns \
    (two lists), one for defining and other for defined values. Read the IFC documentation for more information.";

/// Output of a build: the full class map and what was skipped on the way
#[derive(Debug, Clone, Default)]
pub struct BuildResult {
    pub classes: DefinitionMap,
    pub diagnostics: Diagnostics,
}

/// Items routed by pass 1
struct Classified<'a> {
    /// Enumerations by name
    enumerations: HashMap<&'a str, &'a SchemaItem>,
    /// Property and quantity sets, attached in pass 3
    property_sets: Vec<&'a SchemaItem>,
    /// Registered entities in document order
    entities: Vec<&'a SchemaItem>,
}

/// Builds the full definition map from a [`SchemaIndex`]
pub struct DefinitionGraphBuilder<'a> {
    index: &'a SchemaIndex,
    config: &'a ExtractionConfig,
    resolver: InheritanceResolver<'a>,
    splitter: WordSplitter,
    classes: DefinitionMap,
    /// Schema id (entity or predefined-type literal) -> class code
    owners: HashMap<ItemId, String>,
    diagnostics: Diagnostics,
}

impl<'a> DefinitionGraphBuilder<'a> {
    pub fn new(index: &'a SchemaIndex, config: &'a ExtractionConfig) -> Self {
        Self {
            index,
            config,
            resolver: InheritanceResolver::new(index),
            splitter: WordSplitter::with_vocabulary(&config.stem_vocabulary),
            classes: DefinitionMap::new(),
            owners: HashMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Run all passes
    pub fn build(mut self) -> BuildResult {
        let classified = self.classify();
        tracing::info!(
            classes = self.classes.len(),
            enumerations = classified.enumerations.len(),
            property_sets = classified.property_sets.len(),
            "classification pass done"
        );

        let before = self.classes.len();
        self.expand_predefined_types(&classified);
        tracing::info!(synthesized = self.classes.len() - before, "predefined-type expansion done");

        self.attach_property_sets(&classified);
        self.attach_attributes(&classified);
        self.clear_dangling_parents();

        tracing::info!(
            classes = self.classes.len(),
            diagnostics = self.diagnostics.len(),
            "definition graph built"
        );

        BuildResult {
            classes: self.classes,
            diagnostics: self.diagnostics,
        }
    }

    // ========== Pass 1: classification ==========

    fn classify(&mut self) -> Classified<'a> {
        let index = self.index;
        let mut classified = Classified {
            enumerations: HashMap::new(),
            property_sets: Vec::new(),
            entities: Vec::new(),
        };
        let mut set_counts: IndexMap<ItemKind, usize> = IndexMap::new();

        for item in index.items() {
            if self.config.is_deprecated(item.documentation.as_text()) {
                self.diagnostics
                    .report(&item.name, DiagnosticCode::Deprecated, format!("{} {} is deprecated", item.kind, item.name));
                continue;
            }

            match item.kind {
                ItemKind::Enum => {
                    classified.enumerations.insert(item.name.as_str(), item);
                }
                kind if kind.is_property_set() => {
                    *set_counts.entry(item.kind).or_default() += 1;
                    classified.property_sets.push(item);
                }
                ItemKind::Entity => {
                    self.register_entity(item);
                    classified.entities.push(item);
                }
                _ => {}
            }
        }

        for (kind, count) in &set_counts {
            tracing::info!("{}: {}", kind, count);
        }
        tracing::info!("TOTAL: {}", set_counts.values().sum::<usize>());

        classified
    }

    fn register_entity(&mut self, item: &SchemaItem) {
        let name = display_name(self.strip_name_prefix(&item.name));
        let class = self.classes.entry(item.name.clone()).or_default();
        if let Some(parent) = item.meta.supertypes.first() {
            class.parent = Some(parent.clone());
        }
        class.definition = strip_markup(item.documentation.as_text(), true);
        class.name = name;
        class.package = item.package_name().to_string();
        self.owners.insert(item.id.clone(), item.name.clone());
    }

    fn strip_name_prefix<'n>(&self, name: &'n str) -> &'n str {
        let prefix = self.config.name_prefix.as_str();
        match name.get(..prefix.len()) {
            Some(head) if !prefix.is_empty() && head.eq_ignore_ascii_case(prefix) => &name[prefix.len()..],
            _ => name,
        }
    }

    // ========== Pass 2: predefined-type expansion ==========

    fn expand_predefined_types(&mut self, classified: &Classified<'a>) {
        for entity in &classified.entities {
            if self.resolver.descends_from(&entity.id, &self.config.type_object_anchor) {
                continue;
            }
            let Some(attribute) = entity.child(&self.config.predefined_type_attribute) else {
                continue;
            };
            let Some(enumeration) = self
                .declared_type_name(attribute)
                .and_then(|name| classified.enumerations.get(name))
            else {
                continue;
            };

            for literal in &enumeration.children {
                if self.config.is_excluded_literal(&literal.name) {
                    continue;
                }
                let code = format!("{}{}", entity.name, literal.name);
                let name = case_correct(&title_case(&self.splitter.split(&literal.name)));

                let class = self.classes.entry(code.clone()).or_default();
                class.parent = Some(entity.name.clone());
                class.definition = strip_markup(literal.documentation.as_text(), true);
                class.name = name;
                class.package = entity.package_name().to_string();
                self.owners.insert(literal.id.clone(), code);
            }
        }
    }

    /// Declared type name of a child, by name or through its type reference
    fn declared_type_name<'c>(&self, child: &'c SchemaChild) -> Option<&'c str>
    where
        'a: 'c,
    {
        child
            .type_name
            .as_deref()
            .or_else(|| child.type_ref.as_deref().and_then(|id| self.index.get(id)).map(|item| item.name.as_str()))
    }

    // ========== Pass 3: property-set attachment ==========

    fn attach_property_sets(&mut self, classified: &Classified<'a>) {
        let mut attached = 0usize;

        for pset in &classified.property_sets {
            let mut properties: Vec<(String, PropertyDefinition)> = Vec::new();
            for property in &pset.children {
                if self.config.is_deprecated(property.documentation.as_text()) {
                    continue;
                }
                if let Some(definition) = self.property_definition(pset, property) {
                    properties.push((property.name.clone(), definition));
                }
            }

            let mut seen: HashSet<&str> = HashSet::new();
            for reference in &pset.meta.refs {
                if !seen.insert(reference.as_str()) {
                    continue;
                }
                let Some(owner) = self.owners.get(reference) else {
                    let label = self.index.name_of(reference).unwrap_or(reference);
                    self.diagnostics.unresolved_owner(&pset.name, label);
                    continue;
                };
                let Some(class) = self.classes.get_mut(owner) else {
                    continue;
                };

                let set = class.property_sets.entry(pset.name.clone()).or_default();
                for (name, definition) in &properties {
                    set.properties.insert(name.clone(), definition.clone());
                }
                attached += 1;
            }
        }

        tracing::info!(attachments = attached, "property-set attachment done");
    }

    fn property_definition(&mut self, pset: &SchemaItem, property: &SchemaChild) -> Option<PropertyDefinition> {
        let index = self.index;
        let documentation = property.documentation.as_text();
        let package = pset.package_name();

        let (kind, data_type, literals, description) = if pset.kind == ItemKind::Qset {
            (PropertyKind::Single, self.config.quantity_type.clone(), None, None)
        } else {
            let Some(value_kind) = property.value_kind else {
                self.diagnostics.report(
                    &pset.name,
                    DiagnosticCode::UndeclaredValue,
                    format!("{}.{} declares no value kind", pset.name, property.name),
                );
                return None;
            };
            let Some(type_name) = self.declared_type_name(property) else {
                self.diagnostics.report(
                    &pset.name,
                    DiagnosticCode::UndeclaredValue,
                    format!("{}.{} declares no value type", pset.name, property.name),
                );
                return None;
            };

            if value_kind == ValueKind::Enumerated {
                let Some(enumeration) = index.find_named(type_name, &[ItemKind::Enum, ItemKind::Entity, ItemKind::Other])
                else {
                    self.unresolved_type(&pset.name, &property.name, type_name);
                    return None;
                };
                let literals: Vec<String> = enumeration.children.iter().map(|c| c.name.clone()).collect();
                (PropertyKind::Single, type_name.to_string(), Some(literals), None)
            } else {
                let Some(declared) = index.find_named(type_name, &[ItemKind::Type, ItemKind::Entity, ItemKind::Other])
                else {
                    self.unresolved_type(&pset.name, &property.name, type_name);
                    return None;
                };
                let root = self.resolver.root_generalization(declared);
                let (kind, description) = value_shape(value_kind);
                (kind, root.name.to_lowercase(), None, description.map(str::to_string))
            }
        };

        let literals = literals
            .or_else(|| implicit_values(&data_type).map(|values| values.iter().map(|v| v.to_string()).collect()));
        let values = literals.map(|literals| allowed_values(literals, documentation, package, &self.splitter));

        Some(PropertyDefinition {
            name: display_name(&property.name),
            definition: strip_value_explanation(&strip_markup(documentation, true)),
            description,
            kind,
            data_type,
            values,
            package: package.to_string(),
        })
    }

    fn unresolved_type(&mut self, owner: &str, member: &str, type_name: &str) {
        self.diagnostics.push(
            DiagnosticItem::new(
                owner,
                DiagnosticCode::UnresolvedType,
                format!("type {} of {}.{} not found", type_name, owner, member),
            )
            .with_context(format!("member: {}", member)),
        );
    }

    // ========== Pass 4: implicit attribute properties ==========

    fn attach_attributes(&mut self, classified: &Classified<'a>) {
        let mut emitted = 0usize;

        for entity in &classified.entities {
            let target = self.attribute_target(entity);
            let package = entity.package_name();

            for attribute in &entity.children {
                let documentation = attribute.documentation.as_text();
                if self.config.is_deprecated(documentation) {
                    continue;
                }
                if attribute.name == self.config.predefined_type_attribute {
                    self.diagnostics.skipped_attribute(
                        &entity.name,
                        &attribute.name,
                        DiagnosticCode::PredefinedTypeAttribute,
                        "it's the PredefinedType attribute",
                    );
                    continue;
                }

                let Some(value_type) = self.attribute_type(entity, attribute) else {
                    self.diagnostics.skipped_attribute(
                        &entity.name,
                        &attribute.name,
                        DiagnosticCode::UnresolvedType,
                        "its type cannot be resolved",
                    );
                    continue;
                };

                let (data_type, literals): (String, Option<Vec<String>>) = match value_type.kind {
                    ItemKind::Entity => {
                        self.diagnostics.skipped_attribute(
                            &entity.name,
                            &attribute.name,
                            DiagnosticCode::EntityAttribute,
                            format!("it's taking an ENTITY: {}", value_type.name),
                        );
                        continue;
                    }
                    ItemKind::Select => {
                        self.diagnostics.skipped_attribute(
                            &entity.name,
                            &attribute.name,
                            DiagnosticCode::SelectAttribute,
                            format!("it's taking a SELECT: {}", value_type.name),
                        );
                        continue;
                    }
                    ItemKind::Type => {
                        let data_type = match value_type.meta.verbatim_super.as_deref() {
                            Some(verbatim) if verbatim.to_lowercase().starts_with("string") => "string".to_string(),
                            Some(verbatim) => {
                                self.diagnostics.skipped_attribute(
                                    &entity.name,
                                    &attribute.name,
                                    DiagnosticCode::HardcodedPrimitive,
                                    format!("it has a hardcoded express definition {}", verbatim),
                                );
                                continue;
                            }
                            None => self.resolver.root_generalization(value_type).name.to_lowercase(),
                        };
                        let literals = implicit_values(&data_type)
                            .map(|values| values.iter().map(|v| v.to_string()).collect());
                        (data_type, literals)
                    }
                    ItemKind::Enum => (
                        value_type.name.clone(),
                        Some(value_type.children.iter().map(|c| c.name.clone()).collect()),
                    ),
                    other => {
                        self.diagnostics.skipped_attribute(
                            &entity.name,
                            &attribute.name,
                            DiagnosticCode::UnsupportedAttribute,
                            format!("it's a {} {}", value_type.name, other),
                        );
                        continue;
                    }
                };

                let values = literals.map(|literals| allowed_values(literals, documentation, package, &self.splitter));
                let definition = PropertyDefinition {
                    name: display_name(&attribute.name),
                    definition: strip_value_explanation(&strip_markup(documentation, true)),
                    description: None,
                    kind: PropertyKind::Single,
                    data_type,
                    values,
                    package: package.to_string(),
                };

                if let Some(class) = self.classes.get_mut(&target) {
                    class
                        .property_sets
                        .entry(self.config.attributes_bucket.clone())
                        .or_default()
                        .properties
                        .insert(attribute.name.clone(), definition);
                    emitted += 1;
                }
            }
        }

        tracing::info!(attributes = emitted, "implicit attribute pass done");
    }

    /// Class receiving an entity's attributes: `XxxType` merges into `Xxx`
    /// when `Xxx` is registered, otherwise the entity keeps them.
    fn attribute_target(&self, entity: &SchemaItem) -> String {
        match entity.name.strip_suffix(self.config.type_suffix.as_str()) {
            Some(instance) if !self.config.type_suffix.is_empty() && self.classes.contains_key(instance) => {
                instance.to_string()
            }
            _ => entity.name.clone(),
        }
    }

    /// Value type of an attribute: its type reference, else the association end
    /// carrying its name, else its declared type name.
    fn attribute_type(&mut self, entity: &SchemaItem, attribute: &SchemaChild) -> Option<&'a SchemaItem> {
        let index = self.index;

        if let Some(type_ref) = attribute.type_ref.as_deref() {
            return index.get(type_ref);
        }

        let ends: Vec<_> = index
            .association_ends(&entity.id)
            .into_iter()
            .filter(|end| end.name == attribute.name)
            .collect();
        if ends.len() > 1 {
            let candidates: Vec<String> = ends
                .iter()
                .map(|end| index.name_of(&end.type_ref).unwrap_or(&end.type_ref).to_string())
                .collect();
            self.diagnostics
                .ambiguous(&entity.name, &format!("attribute {}", attribute.name), &candidates);
        }
        if let Some(end) = ends.first() {
            return index.get(&end.type_ref);
        }

        attribute.type_name.as_deref().and_then(|name| {
            index.find_named(
                name,
                &[ItemKind::Type, ItemKind::Enum, ItemKind::Select, ItemKind::Entity],
            )
        })
    }

    // ========== Finishing ==========

    /// Clear parents that name no class, so every parent link resolves
    fn clear_dangling_parents(&mut self) {
        let dangling: Vec<(String, String)> = self
            .classes
            .iter()
            .filter_map(|(code, class)| {
                class
                    .parent
                    .as_ref()
                    .filter(|parent| !self.classes.contains_key(parent.as_str()))
                    .map(|parent| (code.clone(), parent.clone()))
            })
            .collect();

        for (code, parent) in dangling {
            self.diagnostics.report(
                &code,
                DiagnosticCode::DanglingParent,
                format!("parent {} of {} is not a registered class", parent, code),
            );
            if let Some(class) = self.classes.get_mut(&code) {
                class.parent = None;
            }
        }
    }
}

/// Dictionary kind and value-shape explanation of a property value category
fn value_shape(value_kind: ValueKind) -> (PropertyKind, Option<&'static str>) {
    match value_kind {
        ValueKind::Single | ValueKind::Enumerated => (PropertyKind::Single, None),
        ValueKind::Bounded => (PropertyKind::Range, Some(BOUNDED_VALUE_TEXT)),
        ValueKind::Reference => (PropertyKind::Complex, Some(REFERENCE_VALUE_TEXT)),
        ValueKind::List => (PropertyKind::List, Some(LIST_VALUE_TEXT)),
        ValueKind::Table => (PropertyKind::Complex, Some(TABLE_VALUE_TEXT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::load_from_str;

    const SCHEMA: &str = r#"{"items": [
        {"id": "e_valve", "name": "IfcValve", "kind": "ENTITY",
         "children": [{"id": "a_pdt", "name": "PredefinedType", "type_name": "IfcValveTypeEnum"}]},
        {"id": "en", "name": "IfcValveTypeEnum", "kind": "ENUM",
         "children": [{"id": "l_mix", "name": "MIXING"}, {"id": "l_nd", "name": "NOTDEFINED"}]},
        {"id": "e_orphan_type", "name": "IfcSensorType", "kind": "ENTITY",
         "meta": {"supertypes": ["IfcMissing"]},
         "children": [{"id": "a_tag", "name": "Tag", "type_name": "IfcLabel"}]},
        {"id": "t_label", "name": "IfcLabel", "kind": "TYPE", "meta": {"generalization": "p_string"}},
        {"id": "p_string", "name": "STRING", "kind": "OTHER"},
        {"id": "ps", "name": "Pset_ValveTypeMixing", "kind": "PSET", "meta": {"refs": ["l_mix", "l_nd"]},
         "children": [{"id": "pp", "name": "MixerControl", "value_kind": "list", "type_name": "IfcLabel"}]}
    ]}"#;

    fn build() -> BuildResult {
        let index = load_from_str(SCHEMA).unwrap();
        let config = ExtractionConfig::default();
        DefinitionGraphBuilder::new(&index, &config).build()
    }

    #[test]
    fn test_literal_owned_property_set() {
        let result = build();
        let mixing = &result.classes["IfcValveMIXING"];
        assert_eq!(mixing.parent.as_deref(), Some("IfcValve"));
        let control = mixing.property("Pset_ValveTypeMixing", "MixerControl").unwrap();
        assert_eq!(control.kind, PropertyKind::List);
        assert_eq!(control.data_type, "string");
        assert_eq!(
            control.description.as_deref(),
            Some("This property in IFC takes list as its value. Read the IFC documentation for more information.")
        );
        // Sentinel literals have no class, so their pairing is reported
        assert_eq!(result.diagnostics.with_code(DiagnosticCode::UnresolvedOwner).count(), 1);
    }

    #[test]
    fn test_type_suffix_without_instance_keeps_own_key() {
        let result = build();
        let sensor = &result.classes["IfcSensorType"];
        assert_eq!(sensor.name, "Sensor Type");
        assert!(sensor.property("Attributes", "Tag").is_some());
        assert!(!result.classes.contains_key("IfcSensor"));
    }

    #[test]
    fn test_dangling_parent_cleared() {
        let result = build();
        assert_eq!(result.classes["IfcSensorType"].parent, None);
        assert_eq!(result.diagnostics.with_code(DiagnosticCode::DanglingParent).count(), 1);
    }

    #[test]
    fn test_ambiguous_association_takes_first_end() {
        let index = load_from_str(
            r#"{"items": [
                {"id": "e_door", "name": "IfcDoor", "kind": "ENTITY",
                 "children": [{"id": "a_panel", "name": "Panel"}]},
                {"id": "t_label", "name": "IfcLabel", "kind": "TYPE", "meta": {"generalization": "p_string"}},
                {"id": "p_string", "name": "STRING", "kind": "OTHER"},
                {"id": "en_panel", "name": "IfcDoorPanelEnum", "kind": "ENUM",
                 "children": [{"id": "l_left", "name": "LEFT"}]}
            ],
            "associations": [
                {"ends": [{"name": "Panel", "type_ref": "t_label"}, {"name": "", "type_ref": "e_door"}]},
                {"ends": [{"name": "Panel", "type_ref": "en_panel"}, {"name": "", "type_ref": "e_door"}]}
            ]}"#,
        )
        .unwrap();
        let config = ExtractionConfig::default();
        let result = DefinitionGraphBuilder::new(&index, &config).build();

        let panel = result.classes["IfcDoor"].property("Attributes", "Panel").unwrap();
        assert_eq!(panel.data_type, "string");
        assert!(panel.values.is_none());

        let ambiguous: Vec<_> = result.diagnostics.with_code(DiagnosticCode::AmbiguousReference).collect();
        assert_eq!(ambiguous.len(), 1);
        assert_eq!(ambiguous[0].item, "IfcDoor");
        assert_eq!(ambiguous[0].context, vec!["candidates: IfcLabel, IfcDoorPanelEnum"]);
    }

    #[test]
    fn test_value_shapes() {
        assert_eq!(value_shape(ValueKind::Bounded).0, PropertyKind::Range);
        assert_eq!(value_shape(ValueKind::Reference).0, PropertyKind::Complex);
        assert_eq!(value_shape(ValueKind::Table).0, PropertyKind::Complex);
        assert_eq!(value_shape(ValueKind::Enumerated), (PropertyKind::Single, None));
    }
}
