//! Configuration management for dictionary extraction
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (dictionary.toml)
//! - Environment variables (IFCDICT__*)
//!
//! ## Example config file (dictionary.toml):
//! ```toml
//! [extraction]
//! deprecation_marker = "DEPRECAT"
//! excluded_literals = ["USERDEFINED", "NOTDEFINED"]
//!
//! [filter]
//! root_anchors = ["IfcRoot", "IfcMaterialDefinition", "IfcProfileDef"]
//!
//! [annotation]
//! min_length = 6
//! min_transitions = 2
//!
//! [dictionary]
//! code = "ifc"
//! version = "4.3.1"
//!
//! [output]
//! output_format = "pretty"
//! write_catalogs = true
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Main configuration for a dictionary extraction run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Builder settings (markers, sentinels, naming conventions)
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Relevance filter settings
    #[serde(default)]
    pub filter: FilterConfig,

    /// Cross-reference annotation settings
    #[serde(default)]
    pub annotation: AnnotationConfig,

    /// Header metadata of the produced dictionary
    #[serde(default)]
    pub dictionary: DictionaryMetadata,

    /// Writer settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Settings consumed by the definition graph builder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Items whose raw documentation contains this substring are dropped
    #[serde(default = "default_deprecation_marker")]
    pub deprecation_marker: String,

    /// Predefined-type literals that never become subclasses
    #[serde(default = "default_excluded_literals")]
    pub excluded_literals: Vec<String>,

    /// Entities descending from this class are not expanded by predefined type
    #[serde(default = "default_type_object_anchor")]
    pub type_object_anchor: String,

    /// Attribute name that carries the predefined-type enumeration
    #[serde(default = "default_predefined_type_attribute")]
    pub predefined_type_attribute: String,

    /// Property-set bucket that receives implicit attribute properties
    #[serde(default = "default_attributes_bucket")]
    pub attributes_bucket: String,

    /// Prefix stripped (case-insensitively) from entity display names
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Suffix that merges a type-defining entity into its instance entity
    #[serde(default = "default_type_suffix")]
    pub type_suffix: String,

    /// Type assigned to every property of a quantity set
    #[serde(default = "default_quantity_type")]
    pub quantity_type: String,

    /// Extra words fed to the reverse-stem vocabulary
    #[serde(default)]
    pub stem_vocabulary: Vec<String>,
}

/// Settings consumed by the relevance filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Classes descending from any of these are always retained
    #[serde(default = "default_root_anchors")]
    pub root_anchors: Vec<String>,
}

/// Settings for the code heuristic of the cross-reference annotator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationConfig {
    /// Minimum length of a code
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Minimum number of lower-to-upper case transitions inside a code
    #[serde(default = "default_min_transitions")]
    pub min_transitions: usize,
}

/// Header fields of the dictionary document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryMetadata {
    #[serde(default = "default_model_version")]
    pub model_version: String,
    #[serde(default = "default_organization")]
    pub organization_code: String,
    #[serde(default = "default_dictionary_code")]
    pub code: String,
    #[serde(default = "default_dictionary_name")]
    pub name: String,
    #[serde(default = "default_dictionary_version")]
    pub version: String,
    #[serde(default = "default_language")]
    pub language_iso_code: String,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub license_url: Option<String>,
    #[serde(default)]
    pub more_info_url: Option<String>,
}

/// Writer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Emit one translation catalog per package partition
    #[serde(default = "default_true")]
    pub write_catalogs: bool,

    /// File name of the dictionary document inside the output directory
    #[serde(default = "default_document_name")]
    pub document_name: String,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

// Default value functions
fn default_deprecation_marker() -> String {
    "DEPRECAT".to_string()
}

fn default_excluded_literals() -> Vec<String> {
    vec!["USERDEFINED".to_string(), "NOTDEFINED".to_string()]
}

fn default_type_object_anchor() -> String {
    "IfcTypeObject".to_string()
}

fn default_predefined_type_attribute() -> String {
    "PredefinedType".to_string()
}

fn default_attributes_bucket() -> String {
    "Attributes".to_string()
}

fn default_name_prefix() -> String {
    "ifc".to_string()
}

fn default_type_suffix() -> String {
    "Type".to_string()
}

fn default_quantity_type() -> String {
    "real".to_string()
}

fn default_root_anchors() -> Vec<String> {
    vec![
        "IfcRoot".to_string(),
        "IfcMaterialDefinition".to_string(),
        "IfcProfileDef".to_string(),
    ]
}

fn default_min_length() -> usize {
    6
}

fn default_min_transitions() -> usize {
    2
}

fn default_model_version() -> String {
    "2.0".to_string()
}

fn default_organization() -> String {
    "buildingsmart".to_string()
}

fn default_dictionary_code() -> String {
    "ifc".to_string()
}

fn default_dictionary_name() -> String {
    "IFC".to_string()
}

fn default_dictionary_version() -> String {
    "4.3.1".to_string()
}

fn default_language() -> String {
    "EN".to_string()
}

fn default_document_name() -> String {
    "dictionary.json".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            deprecation_marker: default_deprecation_marker(),
            excluded_literals: default_excluded_literals(),
            type_object_anchor: default_type_object_anchor(),
            predefined_type_attribute: default_predefined_type_attribute(),
            attributes_bucket: default_attributes_bucket(),
            name_prefix: default_name_prefix(),
            type_suffix: default_type_suffix(),
            quantity_type: default_quantity_type(),
            stem_vocabulary: Vec::new(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            root_anchors: default_root_anchors(),
        }
    }
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            min_transitions: default_min_transitions(),
        }
    }
}

impl Default for DictionaryMetadata {
    fn default() -> Self {
        Self {
            model_version: default_model_version(),
            organization_code: default_organization(),
            code: default_dictionary_code(),
            name: default_dictionary_name(),
            version: default_dictionary_version(),
            language_iso_code: default_language(),
            license: Some("CC BY-ND 4.0".to_string()),
            license_url: Some("https://creativecommons.org/licenses/by-nd/4.0/legalcode".to_string()),
            more_info_url: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Pretty,
            write_catalogs: true,
            document_name: default_document_name(),
        }
    }
}

impl ExtractionConfig {
    /// Whether raw documentation carries the deprecation marker.
    ///
    /// Plain substring search; unrelated text containing the marker also matches.
    pub fn is_deprecated(&self, raw_documentation: &str) -> bool {
        !self.deprecation_marker.is_empty() && raw_documentation.contains(&self.deprecation_marker)
    }

    /// Whether a predefined-type literal is one of the "unspecified" sentinels
    pub fn is_excluded_literal(&self, literal: &str) -> bool {
        self.excluded_literals.iter().any(|l| l == literal)
    }
}

impl DictionaryConfig {
    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "dictionary.toml",
            ".dictionary.toml",
            "config/dictionary.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "ifc-dictionary") {
            let xdg_config = config_dir.config_dir().join("dictionary.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // IFCDICT__EXTRACTION__DEPRECATION_MARKER=... and friends
        builder = builder.add_source(
            Environment::with_prefix("IFCDICT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DictionaryConfig::default();
        assert_eq!(config.extraction.deprecation_marker, "DEPRECAT");
        assert_eq!(config.filter.root_anchors.len(), 3);
        assert_eq!(config.annotation.min_length, 6);
        assert!(config.output.write_catalogs);
    }

    #[test]
    fn test_serialize_config() {
        let config = DictionaryConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[extraction]"));
        assert!(toml_str.contains("[annotation]"));
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dictionary.toml");

        let mut config = DictionaryConfig::default();
        config.filter.root_anchors = vec!["IfcProduct".to_string()];
        config.save(&path).unwrap();

        let loaded = DictionaryConfig::load_from(path.to_str()).unwrap();
        assert_eq!(loaded.filter.root_anchors, vec!["IfcProduct"]);
        assert_eq!(loaded.annotation.min_length, 6);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: DictionaryConfig = toml::from_str(
            r#"
            [filter]
            root_anchors = ["IfcProduct"]
            "#,
        )
        .unwrap();
        assert_eq!(config.filter.root_anchors, vec!["IfcProduct"]);
        assert_eq!(config.extraction.attributes_bucket, "Attributes");
        assert_eq!(config.output.output_format, OutputFormat::Pretty);
    }

    #[test]
    fn test_deprecation_and_sentinels() {
        let extraction = ExtractionConfig::default();
        assert!(extraction.is_deprecated("This entity is DEPRECATED."));
        assert!(!extraction.is_deprecated("A regular entity."));
        assert!(extraction.is_excluded_literal("NOTDEFINED"));
        assert!(!extraction.is_excluded_literal("FIRE"));
    }
}
