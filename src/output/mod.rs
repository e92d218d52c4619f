//! Output Projection
//!
//! Reshapes an annotated [`DefinitionMap`] into the flat records consumed by
//! the writers: ordered class records with their class-property records, a
//! deduplicated property list (first occurrence wins), and translation
//! records partitioned by package.

pub mod writer;

pub use writer::{catalog_text, dictionary_document, write_catalogs, write_dictionary_json, DictionaryDocument};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::dictionary::{AllowedValue, DefinitionMap, PropertyDefinition};
use crate::text::normalize_spacing;

/// Suffix appended to a code to key the translation of its definition
pub const DEFINITION_KEY_SUFFIX: &str = "_DEFINITION";

/// Suffix appended to a property code to key its value-shape description
pub const DESCRIPTION_KEY_SUFFIX: &str = "_DESCRIPTION";

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllowedValueRecord {
    pub value: String,
    pub description: String,
}

/// A property as attached to one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClassPropertyRecord {
    pub code: String,
    pub name: String,
    pub definition: String,
    /// Value-shape explanation of range, reference, list and table properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<AllowedValueRecord>>,
    pub property_set: String,
}

/// A property in the dictionary-wide property list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyRecord {
    pub code: String,
    pub name: String,
    pub definition: String,
    /// Value-shape explanation of range, reference, list and table properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<AllowedValueRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClassRecord {
    pub code: String,
    pub name: String,
    pub definition: String,
    pub description: String,
    /// Always `Class`
    pub class_type: String,
    pub class_properties: Vec<ClassPropertyRecord>,
}

/// One translatable text, keyed for catalog emission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub key: String,
    pub text: String,
    /// Package of the class the text was found under
    pub partition: String,
}

/// Flat, writer-ready view of the dictionary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedDictionary {
    pub classes: Vec<ClassRecord>,
    pub properties: Vec<PropertyRecord>,
    pub translations: Vec<TranslationRecord>,
}

// =============================================================================
// Projection
// =============================================================================

impl ProjectedDictionary {
    /// Project an annotated definition map
    pub fn project(classes: &DefinitionMap) -> Self {
        let mut projected = Self::default();
        let mut seen_properties: HashSet<&str> = HashSet::new();

        for (code, class) in classes {
            let partition = class.package.as_str();
            let mut record = ClassRecord {
                code: code.clone(),
                name: class.name.clone(),
                definition: class.definition.clone(),
                description: class.description.clone(),
                class_type: "Class".to_string(),
                class_properties: Vec::new(),
            };
            projected.translate(code, &class.name, partition);
            projected.translate(&definition_key(code), &class.definition, partition);

            for (set_code, set) in &class.property_sets {
                for (property_code, property) in &set.properties {
                    let name = property_name(property_code, property);
                    let allowed_values = property.values.as_ref().map(|values| project_values(values));

                    for value in property.values.iter().flatten() {
                        projected.translate(&value.value, &value.description, partition);
                    }

                    if seen_properties.insert(property_code.as_str()) {
                        projected.properties.push(PropertyRecord {
                            code: property_code.clone(),
                            name: name.clone(),
                            definition: property.definition.clone(),
                            description: property.description.clone(),
                            allowed_values: allowed_values.clone(),
                        });
                        projected.translate(property_code, &name, partition);
                        projected.translate(&definition_key(property_code), &property.definition, partition);
                        if let Some(description) = &property.description {
                            projected.translate(&description_key(property_code), description, partition);
                        }
                    }

                    record.class_properties.push(ClassPropertyRecord {
                        code: property_code.clone(),
                        name,
                        definition: property.definition.clone(),
                        description: property.description.clone(),
                        allowed_values,
                        property_set: set_code.clone(),
                    });
                }
            }

            projected.classes.push(record);
        }

        tracing::info!(
            classes = projected.classes.len(),
            properties = projected.properties.len(),
            translations = projected.translations.len(),
            "dictionary projected"
        );
        projected
    }

    /// Translation records grouped by partition, partitions in first-seen order
    pub fn translations_by_partition(&self) -> IndexMap<&str, Vec<&TranslationRecord>> {
        let mut partitions: IndexMap<&str, Vec<&TranslationRecord>> = IndexMap::new();
        for record in &self.translations {
            partitions.entry(record.partition.as_str()).or_default().push(record);
        }
        partitions
    }

    /// Class record by code
    pub fn class(&self, code: &str) -> Option<&ClassRecord> {
        self.classes.iter().find(|c| c.code == code)
    }

    fn translate(&mut self, key: &str, text: &str, partition: &str) {
        self.translations.push(TranslationRecord {
            key: key.to_string(),
            text: text.to_string(),
            partition: partition.to_string(),
        });
    }
}

/// Translation key of a code's definition
pub fn definition_key(code: &str) -> String {
    format!("{}{}", code, DEFINITION_KEY_SUFFIX)
}

/// Translation key of a property's value-shape description
pub fn description_key(code: &str) -> String {
    format!("{}{}", code, DESCRIPTION_KEY_SUFFIX)
}

fn property_name(code: &str, property: &PropertyDefinition) -> String {
    if property.name.trim().is_empty() {
        normalize_spacing(code)
    } else {
        property.name.clone()
    }
}

fn project_values(values: &[AllowedValue]) -> Vec<AllowedValueRecord> {
    values
        .iter()
        .map(|v| AllowedValueRecord {
            value: v.value.clone(),
            description: v.description.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{ClassDefinition, PropertyKind, PropertySetDefinition};

    fn property(name: &str, values: Option<Vec<AllowedValue>>) -> PropertyDefinition {
        PropertyDefinition {
            name: name.to_string(),
            definition: format!("{} definition", name),
            description: None,
            kind: PropertyKind::Single,
            data_type: "real".to_string(),
            values,
            package: "IfcHvacDomain".to_string(),
        }
    }

    fn sample() -> DefinitionMap {
        let mut set = PropertySetDefinition::default();
        set.properties.insert("FlowRate".to_string(), property("Flow Rate", None));
        set.properties.insert(
            "BaseType".to_string(),
            property(
                "",
                Some(vec![AllowedValue {
                    value: "FRAME".to_string(),
                    description: "Frame".to_string(),
                    package: "IfcHvacDomain".to_string(),
                }]),
            ),
        );

        let mut pump = ClassDefinition {
            name: "Pump".to_string(),
            definition: "A pump.".to_string(),
            package: "IfcHvacDomain".to_string(),
            ..Default::default()
        };
        pump.property_sets.insert("Pset_PumpTypeCommon".to_string(), set.clone());
        let mut fire = ClassDefinition {
            name: "Fire".to_string(),
            parent: Some("IfcPump".to_string()),
            package: "IfcHvacDomain".to_string(),
            ..Default::default()
        };
        fire.property_sets.insert("Pset_PumpTypeCommon".to_string(), set);
        let root = ClassDefinition {
            name: "Root".to_string(),
            package: "IfcKernel".to_string(),
            ..Default::default()
        };

        let mut classes = DefinitionMap::new();
        classes.insert("IfcPump".to_string(), pump);
        classes.insert("IfcPumpFIRE".to_string(), fire);
        classes.insert("IfcRoot".to_string(), root);
        classes
    }

    #[test]
    fn test_properties_deduplicated_first_wins() {
        let projected = ProjectedDictionary::project(&sample());
        assert_eq!(projected.classes.len(), 3);
        assert_eq!(projected.properties.len(), 2);
        assert_eq!(projected.properties[0].code, "FlowRate");
        assert_eq!(projected.class("IfcPumpFIRE").unwrap().class_properties.len(), 2);
        assert_eq!(
            projected.class("IfcPump").unwrap().class_properties[0].property_set,
            "Pset_PumpTypeCommon"
        );
        assert_eq!(projected.classes[0].class_type, "Class");
    }

    #[test]
    fn test_empty_property_name_falls_back_to_code() {
        let projected = ProjectedDictionary::project(&sample());
        assert_eq!(projected.properties[1].name, "Base Type");
    }

    #[test]
    fn test_translation_keys() {
        let projected = ProjectedDictionary::project(&sample());
        let keys: Vec<&str> = projected.translations.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(
            &keys[..8],
            &[
                "IfcPump",
                "IfcPump_DEFINITION",
                "FlowRate",
                "FlowRate_DEFINITION",
                "FRAME",
                "BaseType",
                "BaseType_DEFINITION",
                "IfcPumpFIRE",
            ]
        );
        // Values repeat per owner, properties only on first sight
        assert_eq!(keys.iter().filter(|k| **k == "FRAME").count(), 2);
        assert_eq!(keys.iter().filter(|k| **k == "FlowRate").count(), 1);
    }

    #[test]
    fn test_value_shape_description_projected() {
        let mut classes = sample();
        let set = classes["IfcPump"].property_sets.get_mut("Pset_PumpTypeCommon").unwrap();
        set.properties["FlowRate"].description = Some("Bounded value.".to_string());

        let projected = ProjectedDictionary::project(&classes);
        assert_eq!(projected.properties[0].description.as_deref(), Some("Bounded value."));
        assert_eq!(projected.properties[1].description, None);

        let pump = projected.class("IfcPump").unwrap();
        assert_eq!(pump.class_properties[0].description.as_deref(), Some("Bounded value."));
        // IfcPumpFIRE keeps its own copy of the set
        assert_eq!(projected.class("IfcPumpFIRE").unwrap().class_properties[0].description, None);

        let described: Vec<&TranslationRecord> =
            projected.translations.iter().filter(|t| t.key == "FlowRate_DESCRIPTION").collect();
        assert_eq!(described.len(), 1);
        assert_eq!(described[0].text, "Bounded value.");

        let value = serde_json::to_value(&projected.properties[1]).unwrap();
        assert!(value.get("Description").is_none());
    }

    #[test]
    fn test_partitions_by_package() {
        let projected = ProjectedDictionary::project(&sample());
        let partitions = projected.translations_by_partition();
        let names: Vec<&str> = partitions.keys().copied().collect();
        assert_eq!(names, vec!["IfcHvacDomain", "IfcKernel"]);
        assert_eq!(partitions["IfcKernel"].len(), 2);
    }
}
