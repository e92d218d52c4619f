//! Extraction Pipeline
//!
//! build -> filter -> register codes -> annotate -> project
//!
//! The code registry is complete before annotation starts. The unfiltered map
//! is kept alongside the result so parent links of filtered classes can be
//! checked against it.

use std::path::{Path, PathBuf};

use crate::config::DictionaryConfig;
use crate::dictionary::{
    CodeRegistry, CrossReferenceAnnotator, DefinitionFilter, DefinitionGraphBuilder, DefinitionMap, Diagnostics,
};
use crate::error::Result;
use crate::model::{self, SchemaIndex};
use crate::output::{write_catalogs, write_dictionary_json, ProjectedDictionary};

/// Everything one run produces
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Builder output before filtering
    pub full: DefinitionMap,
    /// Filtered and annotated classes
    pub classes: DefinitionMap,
    pub projected: ProjectedDictionary,
    pub diagnostics: Diagnostics,
    /// SHA-256 of the input document, empty for in-memory indexes
    pub document_hash: String,
}

/// Files written by [`Extraction::write`]
#[derive(Debug, Clone, Default)]
pub struct WrittenOutputs {
    pub dictionary: PathBuf,
    pub catalogs: Vec<PathBuf>,
}

pub struct DictionaryPipeline<'c> {
    config: &'c DictionaryConfig,
}

impl<'c> DictionaryPipeline<'c> {
    pub fn new(config: &'c DictionaryConfig) -> Self {
        Self { config }
    }

    /// Load a schema snapshot and run every stage on it
    pub fn run_path(&self, input: &Path) -> Result<Extraction> {
        let index = model::load_from_path(input)?;
        tracing::info!(input = %input.display(), items = index.len(), "schema loaded");
        self.run(&index)
    }

    /// Run every stage over an already loaded index
    pub fn run(&self, index: &SchemaIndex) -> Result<Extraction> {
        let built = DefinitionGraphBuilder::new(index, &self.config.extraction).build();

        let filter = DefinitionFilter::from_config(self.config);
        let mut classes = filter.apply(&built.classes);

        let registry = CodeRegistry::from_definitions(&classes, &self.config.annotation)?;
        let annotator = CrossReferenceAnnotator::new(registry);
        annotator.annotate_definitions(&mut classes);

        let projected = ProjectedDictionary::project(&classes);

        Ok(Extraction {
            full: built.classes,
            classes,
            projected,
            diagnostics: built.diagnostics,
            document_hash: index.document_hash.clone(),
        })
    }
}

impl Extraction {
    /// Write the dictionary document and, if `catalogs`, the translation catalogs
    pub fn write(&self, config: &DictionaryConfig, output_dir: &Path, catalogs: bool) -> Result<WrittenOutputs> {
        let dictionary = write_dictionary_json(&self.projected, &config.dictionary, &config.output, output_dir)?;
        let catalogs = if catalogs {
            write_catalogs(&self.projected, output_dir)?
        } else {
            Vec::new()
        };
        Ok(WrittenOutputs { dictionary, catalogs })
    }

    /// Filtered classes whose parent is not a class of the unfiltered map
    pub fn orphaned_parents(&self) -> Vec<(&str, &str)> {
        self.classes
            .iter()
            .filter_map(|(code, class)| {
                class
                    .parent
                    .as_deref()
                    .filter(|parent| !self.full.contains_key(*parent))
                    .map(|parent| (code.as_str(), parent))
            })
            .collect()
    }
}
