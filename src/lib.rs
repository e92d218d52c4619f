//! IFC Dictionary Extraction
//!
//! Turns a parsed IFC schema graph into a flattened, inheritance-resolved
//! dictionary of classes and properties, ready for publication to a
//! classification service and for translation.
//!
//! ## Stages
//!
//! - **Model**: immutable [`SchemaIndex`] over the parsed schema snapshot
//! - **Build**: [`DefinitionGraphBuilder`] expands predefined types into
//!   subclasses, attaches property sets and implicit attributes
//! - **Filter**: [`DefinitionFilter`] keeps anchored classes and classes
//!   carrying property sets
//! - **Annotate**: [`CrossReferenceAnnotator`] brackets code references as `[[code]]`
//! - **Project**: [`ProjectedDictionary`] flattens the result for the writers
//!
//! ## Architecture
//!
//! ```text
//! schema.json ─▶ SchemaIndex ─▶ DefinitionMap (full)
//!                                   │ filter
//!                                   ▼
//!                              DefinitionMap ─▶ annotate ─▶ ProjectedDictionary
//!                                                               ├── dictionary.json
//!                                                               └── pot/<package>.pot
//! ```

pub mod config;
pub mod dictionary;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod text;

pub use config::DictionaryConfig;
pub use dictionary::{
    ClassDefinition, CodeRegistry, CrossReferenceAnnotator, DefinitionFilter, DefinitionGraphBuilder,
    DefinitionMap, Diagnostics, PropertyDefinition,
};
pub use error::{DictionaryError, Result};
pub use model::{SchemaDocument, SchemaIndex};
pub use output::ProjectedDictionary;
pub use pipeline::{DictionaryPipeline, Extraction};
