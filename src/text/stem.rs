//! Reverse-Stem Lookup
//!
//! Enumeration word splitting needs, for a dictionary word, the other surface
//! forms sharing its stem ("heating" -> "heat", "heated", "heater").
//! [`StemLookup`] is that seam; [`VocabularyStemmer`] implements it by
//! stemming a fixed vocabulary once and indexing the words by stem.

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{BTreeSet, HashMap};

use super::words::ENUMERATION_WORDS;

/// Stem and reverse-stem queries used by the word splitter
pub trait StemLookup {
    /// Stem of a lower-case word
    fn stem(&self, word: &str) -> String;

    /// Known surface words sharing `stem`, longest first
    fn surface_forms(&self, stem: &str) -> Vec<String>;
}

/// English Snowball stemmer with a reverse index over a vocabulary
pub struct VocabularyStemmer {
    stemmer: Stemmer,
    reverse: HashMap<String, BTreeSet<String>>,
}

impl VocabularyStemmer {
    /// Build the reverse index over `vocabulary`
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stemmer = Stemmer::create(Algorithm::English);
        let mut reverse: HashMap<String, BTreeSet<String>> = HashMap::new();

        for word in vocabulary {
            let word = word.as_ref().trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            let stem = stemmer.stem(&word).into_owned();
            reverse.entry(stem).or_default().insert(word);
        }

        Self { stemmer, reverse }
    }

    /// Curated enumeration words plus `extra`
    pub fn with_default_vocabulary(extra: &[String]) -> Self {
        Self::new(
            ENUMERATION_WORDS
                .iter()
                .map(|w| w.to_string())
                .chain(extra.iter().cloned()),
        )
    }
}

impl Default for VocabularyStemmer {
    fn default() -> Self {
        Self::with_default_vocabulary(&[])
    }
}

impl StemLookup for VocabularyStemmer {
    fn stem(&self, word: &str) -> String {
        self.stemmer.stem(&word.to_lowercase()).into_owned()
    }

    fn surface_forms(&self, stem: &str) -> Vec<String> {
        let mut forms: Vec<String> = self
            .reverse
            .get(stem)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        // Longest first; BTreeSet order breaks ties
        forms.sort_by(|a, b| b.len().cmp(&a.len()));
        forms
    }
}
