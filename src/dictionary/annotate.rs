//! Cross-Reference Annotation
//!
//! Two strictly ordered passes over the filtered map:
//!
//! 1. [`CodeRegistry`] collects every code-like key (class, property set,
//!    property, value token) passing the code heuristic.
//! 2. [`CrossReferenceAnnotator`] wraps each whole-word occurrence of a
//!    registered code in every free-text field as `[[code]]`.
//!
//! The registry is complete before any field is touched, and each field is
//! rewritten in a single pass. Occurrences already wrapped are left alone, so
//! annotating twice gives the same text as annotating once.

use regex::{Captures, Regex, RegexBuilder};
use std::collections::HashSet;

use super::DefinitionMap;
use crate::config::AnnotationConfig;
use crate::error::Result;

const MARKER_OPEN: &str = "[[";
const MARKER_CLOSE: &str = "]]";

/// Registered codes, longest first, with the compiled alternation
#[derive(Debug, Clone)]
pub struct CodeRegistry {
    codes: Vec<String>,
    pattern: Option<Regex>,
}

impl CodeRegistry {
    /// Whether `candidate` looks like a code: long enough and with enough
    /// lower-to-upper case transitions
    pub fn is_code(candidate: &str, config: &AnnotationConfig) -> bool {
        if candidate.chars().count() < config.min_length {
            return false;
        }
        let chars: Vec<char> = candidate.chars().collect();
        let transitions = chars
            .windows(2)
            .filter(|pair| pair[0].is_lowercase() && pair[1].is_uppercase())
            .count();
        transitions >= config.min_transitions
    }

    /// Registry over an explicit list of codes, heuristic applied
    pub fn new<I, S>(candidates: I, config: &AnnotationConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut codes: Vec<String> = candidates
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .filter(|c| Self::is_code(c, config))
            .filter(|c| seen.insert(c.clone()))
            .collect();
        codes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let pattern = if codes.is_empty() {
            None
        } else {
            let alternation = codes.iter().map(|c| regex::escape(c)).collect::<Vec<_>>().join("|");
            let source = format!(r"(\[\[)?\b(?P<code>{})\b(\]\])?", alternation);
            Some(
                RegexBuilder::new(&source)
                    .size_limit(256 * (1 << 20))
                    .dfa_size_limit(64 * (1 << 20))
                    .build()?,
            )
        };

        tracing::debug!(codes = codes.len(), "code registry built");
        Ok(Self { codes, pattern })
    }

    /// Registry over every key of a (filtered) definition map
    pub fn from_definitions(classes: &DefinitionMap, config: &AnnotationConfig) -> Result<Self> {
        let mut candidates: Vec<&str> = Vec::new();

        for (code, class) in classes {
            candidates.push(code);
            for (set_code, set) in &class.property_sets {
                candidates.push(set_code);
                for (property_code, property) in &set.properties {
                    candidates.push(property_code);
                    for value in property.values.iter().flatten() {
                        candidates.push(&value.value);
                    }
                }
            }
        }

        Self::new(candidates, config)
    }

    /// Codes, longest first
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }
}

/// Brackets registered codes inside free text
#[derive(Debug, Clone)]
pub struct CrossReferenceAnnotator {
    registry: CodeRegistry,
}

impl CrossReferenceAnnotator {
    pub fn new(registry: CodeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CodeRegistry {
        &self.registry
    }

    /// Wrap every whole-word occurrence of a registered code in `text`
    pub fn annotate(&self, text: &str) -> String {
        let Some(pattern) = &self.registry.pattern else {
            return text.to_string();
        };

        pattern
            .replace_all(text, |caps: &Captures| {
                let open = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let close = caps.get(3).map(|m| m.as_str()).unwrap_or("");
                if !open.is_empty() && !close.is_empty() {
                    return caps[0].to_string();
                }
                format!("{}{}{}{}{}", open, MARKER_OPEN, &caps["code"], MARKER_CLOSE, close)
            })
            .into_owned()
    }

    /// Annotate every definition and description in `classes`.
    ///
    /// Returns the number of fields that changed.
    pub fn annotate_definitions(&self, classes: &mut DefinitionMap) -> usize {
        if self.registry.is_empty() {
            return 0;
        }

        let mut changed = 0usize;
        let mut rewrite = |field: &mut String| {
            let annotated = self.annotate(field);
            if annotated != *field {
                *field = annotated;
                changed += 1;
            }
        };

        for class in classes.values_mut() {
            rewrite(&mut class.definition);
            rewrite(&mut class.description);
            for set in class.property_sets.values_mut() {
                for property in set.properties.values_mut() {
                    rewrite(&mut property.definition);
                    if let Some(description) = property.description.as_mut() {
                        rewrite(description);
                    }
                    for value in property.values.iter_mut().flatten() {
                        rewrite(&mut value.description);
                    }
                }
            }
        }

        tracing::info!(codes = self.registry.len(), fields = changed, "cross-references annotated");
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::ClassDefinition;

    fn annotator(codes: &[&str]) -> CrossReferenceAnnotator {
        CrossReferenceAnnotator::new(CodeRegistry::new(codes, &AnnotationConfig::default()).unwrap())
    }

    #[test]
    fn test_code_heuristic() {
        let config = AnnotationConfig::default();
        assert!(CodeRegistry::is_code("IfcPumpFIRE", &config));
        assert!(CodeRegistry::is_code("Pset_PumpTypeCommon", &config));
        assert!(!CodeRegistry::is_code("IfcPump", &config));
        assert!(!CodeRegistry::is_code("USERDEFINED", &config));
        assert!(!CodeRegistry::is_code("IfcAB", &config));
    }

    #[test]
    fn test_registry_sorted_longest_first() {
        let registry = CodeRegistry::new(
            ["IfcFlowTerminal", "IfcFlowTerminalType", "IfcFlowTerminal"],
            &AnnotationConfig::default(),
        )
        .unwrap();
        assert_eq!(registry.codes(), &["IfcFlowTerminalType", "IfcFlowTerminal"]);
    }

    #[test]
    fn test_annotate_whole_words_only() {
        let annotator = annotator(&["IfcFlowTerminal", "IfcFlowTerminalType"]);
        assert_eq!(
            annotator.annotate("See IfcFlowTerminalType and IfcFlowTerminal, not IfcFlowTerminals."),
            "See [[IfcFlowTerminalType]] and [[IfcFlowTerminal]], not IfcFlowTerminals."
        );
    }

    #[test]
    fn test_existing_markers_not_double_wrapped() {
        let annotator = annotator(&["IfcDistributionElement"]);
        let once = annotator.annotate("An IfcDistributionElement.");
        assert_eq!(once, "An [[IfcDistributionElement]].");
        assert_eq!(annotator.annotate(&once), once);
    }

    #[test]
    fn test_empty_registry_leaves_text() {
        let annotator = annotator(&[]);
        assert!(annotator.registry().is_empty());
        assert_eq!(annotator.annotate("IfcDistributionElement"), "IfcDistributionElement");
    }

    #[test]
    fn test_annotate_definitions() {
        let mut classes = DefinitionMap::new();
        classes.insert(
            "IfcDistributionElement".to_string(),
            ClassDefinition {
                definition: "Generalization of IfcDistributionElement types.".to_string(),
                ..Default::default()
            },
        );
        let registry = CodeRegistry::from_definitions(&classes, &AnnotationConfig::default()).unwrap();
        let annotator = CrossReferenceAnnotator::new(registry);
        assert_eq!(annotator.annotate_definitions(&mut classes), 1);
        assert_eq!(
            classes["IfcDistributionElement"].definition,
            "Generalization of [[IfcDistributionElement]] types."
        );
    }
}
