//! Markup stripping, spacing, sanitizing and case correction

use once_cell::sync::Lazy;
use regex::Regex;

use super::words::{ACRONYMS, SMALL_WORDS};

/// Keywords that open a trailing section (notes, history, examples) of a
/// documentation text. Everything from the first one onwards is dropped.
const SECTION_MARKERS: &[&str] = &[
    "NOTE",
    "DIAGRAM",
    "CHANGE",
    "IFC4",
    "HISTORY",
    "EXAMPLE",
    "DEPRECATION",
];

/// Punctuation kept by [`sanitize`] besides alphanumerics
const ALLOWED_PUNCTUATION: &str = ":.,()-+ —=;α°_/!?$%@<>\\*";

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("valid tag pattern"));

// A `{...}` block and everything after it
static CURLY_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{.*?\}.*").expect("valid block pattern"));

// A sentence fragment that points at a figure
static FIGURE_SENTENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.,;]*(Figure|the figure)[^.,;]*").expect("valid figure pattern"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid camel pattern"));

// Colon followed by an upper-case run: start of an inline list of enumeration values
static VALUE_EXPLANATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\s*[A-Z]{2,}.*").expect("valid explanation pattern"));

fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}

/// Reduce raw documentation markup to a single line of plain text.
///
/// With `trim`, the text is cut at the first section keyword; a text that
/// opens with one becomes empty.
pub fn strip_markup(text: &str, trim: bool) -> String {
    let unescaped = html_escape::decode_html_entities(text);
    let mut s: &str = &unescaped;

    if trim {
        match SECTION_MARKERS.iter().filter_map(|m| s.find(m)).min() {
            Some(0) => return String::new(),
            Some(i) => s = &s[..i],
            None => {}
        }
    }

    let s = s.replace('\n', "; ").replace(':', ": ");
    let s = HTML_TAG.replace_all(&s, " ");
    let s = CURLY_BLOCK.replace_all(&s, " ");
    let s = s.replace("SELF\\", "");
    let s = WHITESPACE.replace_all(&s, " ");
    let s = FIGURE_SENTENCE.replace_all(&s, "");
    collapse_whitespace(&s)
}

/// Split camel-joined identifiers at every lower-to-upper boundary
pub fn normalize_spacing(text: &str) -> String {
    let spaced = CAMEL_BOUNDARY.replace_all(text, "$1 $2");
    collapse_whitespace(&spaced)
}

/// Drop every character that is neither alphanumeric nor allowed punctuation
pub fn sanitize(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || ALLOWED_PUNCTUATION.contains(*c))
        .collect();
    collapse_whitespace(&kept)
}

/// Upper-case known acronyms and lower-case small connecting words, token by token
pub fn case_correct(text: &str) -> String {
    text.split_whitespace()
        .map(|token| {
            let lower = token.to_lowercase();
            if ACRONYMS.contains(lower.as_str()) {
                lower.to_uppercase()
            } else if SMALL_WORDS.contains(lower.as_str()) {
                lower
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-case the first letter of every letter run and lower-case the rest
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_cased = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_cased {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_cased = true;
        } else {
            result.push(c);
            previous_cased = false;
        }
    }
    result
}

/// Human-readable name of an identifier: spaced, sanitized, title-cased, case-corrected
pub fn display_name(identifier: &str) -> String {
    case_correct(&title_case(&sanitize(&normalize_spacing(identifier))))
}

/// Replace an inline enumeration-value explanation (`: VALUE ...`) with an ellipsis
pub fn strip_value_explanation(text: &str) -> String {
    VALUE_EXPLANATION.replacen(text, 1, "...").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup_trims_at_section_marker() {
        assert_eq!(strip_markup("Some text NOTE: foo", true), "Some text");
        assert_eq!(strip_markup("NOTE: discard everything", true), "");
        assert_eq!(strip_markup("Keep NOTE: all", false), "Keep NOTE: all");
    }

    #[test]
    fn test_strip_markup_cleans_markup() {
        assert_eq!(
            strip_markup("A <b>bold</b> &amp; plain\ntext.", true),
            "A bold & plain; text."
        );
        assert_eq!(strip_markup("Ratio:value", false), "Ratio: value");
        assert_eq!(strip_markup("Kept part {.change-ifc2x4} dropped", false), "Kept part");
        assert_eq!(strip_markup("SELF\\IfcRoot.Name is used", false), "IfcRoot.Name is used");
        assert_eq!(
            strip_markup("A wall. As shown in Figure 1, it stands.", false),
            "A wall., it stands."
        );
        assert_eq!(strip_markup("", true), "");
    }

    #[test]
    fn test_normalize_spacing() {
        assert_eq!(normalize_spacing("NominalDiameter"), "Nominal Diameter");
        assert_eq!(normalize_spacing("IsExternal  value"), "Is External value");
        assert_eq!(normalize_spacing("FIRE"), "FIRE");
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Heat {load} #1 – 20°C"), "Heat load 1 20°C");
        assert_eq!(sanitize("a/b (c)"), "a/b (c)");
    }

    #[test]
    fn test_case_correct() {
        assert_eq!(case_correct("Led Of Gps Unit"), "LED of GPS Unit");
        assert_eq!(case_correct("Hot And Cold Water"), "Hot and Cold Water");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("plate exchanger"), "Plate Exchanger");
        assert_eq!(title_case("NOMINAL DIAMETER"), "Nominal Diameter");
        assert_eq!(title_case("is external"), "Is External");
        assert_eq!(title_case("2nd floor"), "2Nd Floor");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("NominalDiameter"), "Nominal Diameter");
        assert_eq!(display_name("HasUpsConnection"), "Has UPS Connection");
        assert_eq!(display_name("FlowRateOfWater"), "Flow Rate of Water");
    }

    #[test]
    fn test_strip_value_explanation() {
        assert_eq!(
            strip_value_explanation("The type of pump: CIRCULATOR means a pump."),
            "The type of pump..."
        );
        assert_eq!(strip_value_explanation("Ratio: 2 to 1"), "Ratio: 2 to 1");
    }
}
