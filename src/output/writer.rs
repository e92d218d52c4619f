//! Dictionary Writers
//!
//! - `write_dictionary_json`: the dictionary document, header metadata from
//!   config and PascalCase keys, stamped with today's release date
//! - `write_catalogs`: one gettext template (`.pot`) per partition under `pot/`

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::{ClassRecord, ProjectedDictionary, PropertyRecord, TranslationRecord};
use crate::config::{DictionaryMetadata, OutputConfig, OutputFormat};
use crate::error::Result;

/// Directory receiving the catalogs, relative to the output directory
pub const CATALOG_DIR: &str = "pot";

/// Catalog name used for classes without a package
const UNPARTITIONED: &str = "unpartitioned";

/// Serialized dictionary document
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DictionaryDocument<'a> {
    pub model_version: &'a str,
    pub organization_code: &'a str,
    pub dictionary_code: &'a str,
    pub dictionary_name: &'a str,
    pub dictionary_version: &'a str,
    pub language_iso_code: &'a str,
    pub language_only: bool,
    pub use_own_uri: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub more_info_url: Option<&'a str>,
    pub release_date: String,
    pub classes: &'a [ClassRecord],
    pub properties: &'a [PropertyRecord],
}

/// Assemble the document for `projected` with an explicit release date
pub fn dictionary_document<'a>(
    projected: &'a ProjectedDictionary,
    metadata: &'a DictionaryMetadata,
    release_date: NaiveDate,
) -> DictionaryDocument<'a> {
    DictionaryDocument {
        model_version: &metadata.model_version,
        organization_code: &metadata.organization_code,
        dictionary_code: &metadata.code,
        dictionary_name: &metadata.name,
        dictionary_version: &metadata.version,
        language_iso_code: &metadata.language_iso_code,
        language_only: false,
        use_own_uri: false,
        license: metadata.license.as_deref(),
        license_url: metadata.license_url.as_deref(),
        more_info_url: metadata.more_info_url.as_deref(),
        release_date: release_date.format("%Y-%m-%d").to_string(),
        classes: &projected.classes,
        properties: &projected.properties,
    }
}

/// Write the dictionary document into `output_dir`, returning its path
pub fn write_dictionary_json(
    projected: &ProjectedDictionary,
    metadata: &DictionaryMetadata,
    output: &OutputConfig,
    output_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let document = dictionary_document(projected, metadata, Local::now().date_naive());
    let content = match output.output_format {
        OutputFormat::Pretty => serde_json::to_string_pretty(&document)?,
        OutputFormat::Compact => serde_json::to_string(&document)?,
    };

    let path = output_dir.join(&output.document_name);
    fs::write(&path, content)?;
    tracing::info!(path = %path.display(), classes = projected.classes.len(), "dictionary written");
    Ok(path)
}

/// Write one catalog per partition under `output_dir/pot`, returning the paths
pub fn write_catalogs(projected: &ProjectedDictionary, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let catalog_dir = output_dir.join(CATALOG_DIR);
    fs::create_dir_all(&catalog_dir)?;

    let created = Local::now();
    let mut written = Vec::new();

    for (partition, records) in projected.translations_by_partition() {
        let name = if partition.is_empty() { UNPARTITIONED } else { partition };
        let path = catalog_dir.join(format!("{}.pot", name));
        fs::write(&path, catalog_text(&records, &created))?;
        written.push(path);
    }

    tracing::info!(catalogs = written.len(), dir = %catalog_dir.display(), "catalogs written");
    Ok(written)
}

/// Catalog text: gettext header followed by one entry per record
pub fn catalog_text(records: &[&TranslationRecord], created: &DateTime<Local>) -> String {
    let mut text = format!(
        "# Industry Foundation Classes IFC.\n\
         # Copyright (C) {year} buildingSMART\n\
         #\n\
         #, fuzzy\n\
         msgid \"\"\n\
         msgstr \"\"\n\
         \"Project-Id-Version: PACKAGE VERSION\\n\"\n\
         \"Report-Msgid-Bugs-To: bsdd_support@buildingsmart.org\\n\"\n\
         \"POT-Creation-Date: {created}\\n\"\n\
         \"X-Crowdin-SourceKey: msgstr\\n\"\n\
         \"Language-Team: buildingSMART community\\n\"\n\n",
        year = created.format("%Y"),
        created = created.format("%Y-%m-%d %H:%M"),
    );

    for record in records {
        text.push_str(&format!("msgid {}\nmsgstr {}\n\n", quote(&record.key), quote(&record.text)));
    }

    text
}

/// Quote a catalog string, escaping what gettext treats specially
fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => {}
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn projected() -> ProjectedDictionary {
        ProjectedDictionary {
            classes: vec![ClassRecord {
                code: "IfcPump".to_string(),
                name: "Pump".to_string(),
                definition: "A pump.".to_string(),
                description: String::new(),
                class_type: "Class".to_string(),
                class_properties: Vec::new(),
            }],
            properties: Vec::new(),
            translations: vec![
                TranslationRecord {
                    key: "IfcPump".to_string(),
                    text: "Pump".to_string(),
                    partition: "IfcHvacDomain".to_string(),
                },
                TranslationRecord {
                    key: "IfcPump_DEFINITION".to_string(),
                    text: "Says \"pump\".".to_string(),
                    partition: "IfcHvacDomain".to_string(),
                },
                TranslationRecord {
                    key: "Orphan".to_string(),
                    text: "No package".to_string(),
                    partition: String::new(),
                },
            ],
        }
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"a "b" \ c"#), r#""a \"b\" \\ c""#);
        assert_eq!(quote("line\nbreak"), "\"line\\nbreak\"");
    }

    #[test]
    fn test_document_keys_are_pascal_case() {
        let projected = projected();
        let metadata = DictionaryMetadata::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let value = serde_json::to_value(dictionary_document(&projected, &metadata, date)).unwrap();

        assert_eq!(value["ReleaseDate"], "2024-03-01");
        assert_eq!(value["DictionaryCode"], "ifc");
        assert_eq!(value["LanguageOnly"], false);
        assert_eq!(value["Classes"][0]["Code"], "IfcPump");
        assert_eq!(value["Classes"][0]["ClassType"], "Class");
    }

    #[test]
    fn test_catalog_text() {
        let projected = projected();
        let created = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let partitions = projected.translations_by_partition();
        let text = catalog_text(&partitions["IfcHvacDomain"], &created);

        assert!(text.starts_with("# Industry Foundation Classes IFC.\n# Copyright (C) 2024 buildingSMART"));
        assert!(text.contains("\"POT-Creation-Date: 2024-03-01 09:30\\n\""));
        assert!(text.contains("msgid \"IfcPump\"\nmsgstr \"Pump\"\n\n"));
        assert!(text.contains("msgstr \"Says \\\"pump\\\".\""));
    }

    #[test]
    fn test_write_outputs() {
        let dir = TempDir::new().unwrap();
        let projected = projected();
        let config = crate::config::DictionaryConfig::default();

        let path = write_dictionary_json(&projected, &config.dictionary, &config.output, dir.path()).unwrap();
        assert!(path.ends_with("dictionary.json"));
        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["Classes"].as_array().unwrap().len(), 1);

        let catalogs = write_catalogs(&projected, dir.path()).unwrap();
        assert_eq!(catalogs.len(), 2);
        assert!(dir.path().join("pot/IfcHvacDomain.pot").exists());
        assert!(dir.path().join("pot/unpartitioned.pot").exists());
    }
}
