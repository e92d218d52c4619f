//! Diagnostics
//!
//! Collects the non-fatal problems found while building the dictionary.
//! A diagnostic always names the schema item it concerns; the offending
//! item or pairing has already been skipped when it is recorded.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Unresolvable references ===
    /// Property-set back-reference does not name a registered class
    UnresolvedOwner,
    /// Declared value type of a property or attribute not found
    UnresolvedType,
    /// More than one candidate where exactly one was expected
    AmbiguousReference,
    /// Parent code names no class in the map
    DanglingParent,

    // === Unsupported shapes ===
    /// Attribute typed by an entity (relational, not scalar)
    EntityAttribute,
    /// Attribute typed by an open choice
    SelectAttribute,
    /// Defined type with a hardcoded non-string underlying definition
    HardcodedPrimitive,
    /// Attribute typed by something that is neither TYPE nor ENUM
    UnsupportedAttribute,
    /// Property-set member without a declared value category or type
    UndeclaredValue,

    // === Informational ===
    /// Predefined-type attribute, expanded into subclasses instead
    PredefinedTypeAttribute,
    /// Item dropped because of the deprecation marker
    Deprecated,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnresolvedOwner => "E001",
            Self::UnresolvedType => "E002",
            Self::AmbiguousReference => "W001",
            Self::DanglingParent => "W002",
            Self::EntityAttribute => "S001",
            Self::SelectAttribute => "S002",
            Self::HardcodedPrimitive => "S003",
            Self::UnsupportedAttribute => "S004",
            Self::UndeclaredValue => "S005",
            Self::PredefinedTypeAttribute => "I001",
            Self::Deprecated => "I002",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::UnresolvedOwner
            | Self::UnresolvedType
            | Self::AmbiguousReference
            | Self::DanglingParent => Severity::Warning,

            Self::EntityAttribute
            | Self::SelectAttribute
            | Self::HardcodedPrimitive
            | Self::UnsupportedAttribute
            | Self::UndeclaredValue
            | Self::PredefinedTypeAttribute
            | Self::Deprecated => Severity::Info,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level. Nothing here aborts a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Name of the schema item this concerns
    pub item: String,
    pub code: DiagnosticCode,
    pub message: String,
    /// Additional context (owner, attribute, candidates)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(item: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.item
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from the build passes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic item, mirrored to the log
    pub fn push(&mut self, item: DiagnosticItem) {
        match item.severity() {
            Severity::Warning => tracing::warn!(code = %item.code, item = %item.item, "{}", item.message),
            Severity::Info => tracing::debug!(code = %item.code, item = %item.item, "{}", item.message),
        }
        self.items.push(item);
    }

    /// Add a diagnostic without context
    pub fn report(&mut self, item: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) {
        self.push(DiagnosticItem::new(item, code, message));
    }

    /// Property-set back-reference that resolves to no class
    pub fn unresolved_owner(&mut self, pset: &str, reference: &str) {
        self.push(
            DiagnosticItem::new(
                pset,
                DiagnosticCode::UnresolvedOwner,
                format!("for {} entity {} not emitted", pset, reference),
            )
            .with_context(format!("reference: {}", reference)),
        );
    }

    /// Attribute dropped because of its shape
    pub fn skipped_attribute(&mut self, owner: &str, attribute: &str, code: DiagnosticCode, reason: impl Into<String>) {
        self.push(
            DiagnosticItem::new(
                owner,
                code,
                format!("Not emitting {}.{}: {}", owner, attribute, reason.into()),
            )
            .with_context(format!("attribute: {}", attribute)),
        );
    }

    /// Several candidates where one was expected; the first one was used
    pub fn ambiguous(&mut self, item: &str, what: &str, candidates: &[String]) {
        self.push(
            DiagnosticItem::new(
                item,
                DiagnosticCode::AmbiguousReference,
                format!("{} candidates for {} on {}", candidates.len(), what, item),
            )
            .with_context(format!("candidates: {}", candidates.join(", "))),
        );
    }

    /// Get all warnings
    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    /// Items with a given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    /// Get total count
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Count warnings
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }

        if !self.is_empty() {
            output.push_str(&format!(
                "\n{} warning(s), {} note(s)\n",
                self.warning_count(),
                self.len() - self.warning_count()
            ));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

impl IntoIterator for Diagnostics {
    type Item = DiagnosticItem;
    type IntoIter = std::vec::IntoIter<DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticItem;
    type IntoIter = std::slice::Iter<'a, DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
