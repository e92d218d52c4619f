//! Error types for dictionary extraction
//!
//! Only conditions that stop a run live here. Problems with individual schema
//! items (unresolved owners, unsupported attribute shapes) are collected as
//! [`Diagnostics`](crate::dictionary::Diagnostics) instead.

use thiserror::Error;

/// Result type for dictionary operations
pub type Result<T> = std::result::Result<T, DictionaryError>;

/// Dictionary extraction errors
#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Invalid schema document: {0}")]
    InvalidDocument(String),

    #[error("Duplicate item id in schema document: {0}")]
    DuplicateId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),
}
