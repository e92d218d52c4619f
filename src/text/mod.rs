//! Text Normalization
//!
//! Pure, deterministic transformations applied to every human-readable field:
//! markup stripping, camel-case spacing, character sanitizing, case
//! correction and splitting of all-caps enumeration literals into words.
//!
//! Missing documentation reaches these functions as the empty string and
//! always yields the empty string.

pub mod normalize;
pub mod stem;
pub mod words;

pub use normalize::{
    case_correct, display_name, normalize_spacing, sanitize, strip_markup,
    strip_value_explanation, title_case,
};
pub use stem::{StemLookup, VocabularyStemmer};
pub use words::{split_enumeration_words, WordSplitter, ACRONYMS, ENUMERATION_WORDS, SMALL_WORDS};
