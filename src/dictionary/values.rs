//! Allowed-value descriptions
//!
//! A literal's description is the first sentence of the owning property's raw
//! documentation that mentions it. When no sentence does, the literal itself
//! is split into words and title-cased.

use regex::RegexBuilder;

use super::AllowedValue;
use crate::text::{case_correct, normalize_spacing, sanitize, strip_markup, title_case, StemLookup, WordSplitter};

/// Values implied by a primitive type that declares no enumeration
pub fn implicit_values(data_type: &str) -> Option<&'static [&'static str]> {
    match data_type {
        "boolean" => Some(&["TRUE", "FALSE"]),
        "logical" => Some(&["TRUE", "FALSE", "UNKNOWN"]),
        _ => None,
    }
}

/// First `.`/`;`/`!`/`,`-bounded sentence of `documentation` containing `literal`
pub fn sentence_mentioning<'d>(literal: &str, documentation: &'d str) -> Option<&'d str> {
    if literal.is_empty() || documentation.is_empty() {
        return None;
    }
    let pattern = format!("[^.;!,]*{}[^.;!,]*", regex::escape(literal));
    let re = RegexBuilder::new(&pattern).case_insensitive(true).build().ok()?;
    re.find(documentation).map(|m| m.as_str())
}

/// Readable form of a literal: split into words, title-cased, case-corrected
pub fn readable_literal<S: StemLookup>(literal: &str, splitter: &WordSplitter<S>) -> String {
    case_correct(&title_case(&sanitize(&normalize_spacing(&splitter.split(literal)))))
}

/// Description of `literal` taken from `documentation`, never empty
pub fn describe_value<S: StemLookup>(literal: &str, documentation: &str, splitter: &WordSplitter<S>) -> String {
    let from_docs = sentence_mentioning(literal, documentation)
        .map(|sentence| sanitize(&strip_markup(sentence.trim(), true)))
        .filter(|s| !s.is_empty());

    from_docs
        .or_else(|| Some(readable_literal(literal, splitter)).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| literal.to_string())
}

/// Allowed values for `literals`, described from `documentation`
pub fn allowed_values<S, I, L>(
    literals: I,
    documentation: &str,
    package: &str,
    splitter: &WordSplitter<S>,
) -> Vec<AllowedValue>
where
    S: StemLookup,
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    literals
        .into_iter()
        .map(|literal| {
            let literal = literal.as_ref();
            AllowedValue {
                value: literal.to_string(),
                description: describe_value(literal, documentation, splitter),
                package: package.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCS: &str = "Defines the type of pump. CIRCULATOR: A pump circulating water; \
                        ENDSUCTION: Pump with a single inlet. NOTDEFINED is the default.";

    #[test]
    fn test_sentence_search_is_case_insensitive() {
        assert_eq!(
            sentence_mentioning("endsuction", DOCS).map(str::trim),
            Some("ENDSUCTION: Pump with a single inlet")
        );
        assert_eq!(sentence_mentioning("SPLITCASE", DOCS), None);
    }

    #[test]
    fn test_describe_from_documentation() {
        let splitter = WordSplitter::default();
        assert_eq!(
            describe_value("CIRCULATOR", DOCS, &splitter),
            "CIRCULATOR: A pump circulating water"
        );
    }

    #[test]
    fn test_describe_falls_back_to_split_words() {
        let splitter = WordSplitter::default();
        assert_eq!(describe_value("PLATEEXCHANGER", "", &splitter), "Plate Exchanger");
        assert_eq!(describe_value("TRUE", "No mention here.", &splitter), "True");
    }

    #[test]
    fn test_description_never_empty() {
        let splitter = WordSplitter::default();
        // The matching sentence trims to nothing; the literal still gets a description
        let description = describe_value("NOTE", "NOTE here.", &splitter);
        assert!(!description.is_empty());
        assert_eq!(describe_value("__", "", &splitter), "__");
    }

    #[test]
    fn test_implicit_values() {
        assert_eq!(implicit_values("boolean"), Some(&["TRUE", "FALSE"][..]));
        assert_eq!(implicit_values("logical").map(<[_]>::len), Some(3));
        assert_eq!(implicit_values("real"), None);
    }

    #[test]
    fn test_allowed_values_keep_order() {
        let splitter = WordSplitter::default();
        let values = allowed_values(["TRUE", "FALSE"], "", "IfcKernel", &splitter);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].value, "TRUE");
        assert_eq!(values[1].description, "False");
        assert_eq!(values[1].package, "IfcKernel");
    }
}
