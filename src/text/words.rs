//! Enumeration Word Splitting
//!
//! Enumeration literals arrive as run-together capitals (`PLATEEXCHANGER`).
//! A curated dictionary of words seen in such literals is matched longest
//! first; each hit is padded with spaces. A candidate contained in an
//! already-matched longer word is skipped, so `EXCHANGE` never splits the
//! inside of `EXCHANGER`.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use super::stem::{StemLookup, VocabularyStemmer};

/// Words known to occur inside enumeration literals
pub const ENUMERATION_WORDS: &[&str] = &[
    "current", "cost", "of", "switch", "order", "recovery", "loading", "barrier",
    "predefined", "reel", "basin", "fountain", "packaged", "nozzle", "tube", "plant",
    "injection", "assisted", "element", "vertically", "vertical", "turbine", "heating",
    "disassembly", "button", "component", "security", "deflector", "cabinet", "assembly",
    "actuator", "meter", "sensor", "object", "detection", "station", "depth", "controller",
    "terminal", "center", "frame", "electric", "exchangers", "wedge", "gate", "configured",
    "plug", "lubricated", "parallel", "slide", "exchange", "exchanger", "change", "outlet",
    "server", "plate", "expansion", "rail", "solar", "surcharge", "excavation",
    "combustion", "draft", "mechanical", "constant", "coil", "cooled", "cooler",
    "evaporative", "pavement", "top", "column", "traffic", "crossing", "side", "road",
    "vehicle", "island", "gear", "super", "event", "adiabatic", "segment", "marker",
    "structure", "ground", "channel", "pressure", "shift", "prevention", "tray",
    "provision", "soil", "preloaded", "water", "cold", "hot", "cable", "domestic", "power",
    "generation", "solid", "waste", "unit", "carrier", "duct", "protection", "disconnector",
    "surfacing", "breaker", "wall", "flow", "curve", "limiter", "board", "chamber", "panel",
    "acoustic", "fire", "inspection", "transverse", "rumble", "strip", "surface",
    "maintenance", "pier", "system", "fixed", "hatch", "transmission", "network", "machine",
    "device", "equipment", "sound", "stud", "connector", "marking", "removal", "space",
    "agent", "section", "inventory", "bill", "schedule", "rate", "void", "quantities",
    "compacted", "drained", "tower", "indirect", "direct", "media", "intelligent", "rigid",
    "random", "marine", "compact", "tensioner", "operational", "intermediate", "storage",
    "hooks", "area", "lift", "lifting", "forward", "natural", "radial", "gravity", "piston",
    "relief", "air", "track", "pair", "switching", "transition", "off", "bend", "circular",
    "derailer", "tracked", "roadway", "plateau", "retention", "stock", "double", "twin",
    "cage", "seat", "moving", "soft", "inlet", "symbol", "symbolic", "toilet", "dock",
    "docking", "parabolic", "bending", "transceiver", "control", "asset", "furniture",
    "contact", "centre", "motorized", "motor", "photocopier", "generator", "engine",
    "point", "access", "asynchronous", "synchronous", "single", "plaza", "wheel", "loops",
    "drive", "stop", "rates", "timer", "leakage", "time", "dryer", "framework", "roof",
    "induction", "topping", "alignment", "curved", "stair", "elemented", "scaffolding",
    "electrical", "chair", "sofa", "railway", "entrance", "secured", "cover", "manhole",
    "flat", "concave", "convex", "known", "cylinder", "horizontal", "business", "issues",
    "elevated", "work", "platform", "materials", "handling", "material", "effects",
    "health", "safety", "hazardous", "dust", "scaffold", "fall", "fragile", "shock",
    "environmental", "drowning", "flooding", "very", "high", "unintended", "collapse",
    "working", "overhead", "considerable", "value", "driven", "defined", "unknown", "class",
    "appliance", "earth", "protective", "neutral", "disposal", "cradle", "site",
    "production", "transport", "repair", "whole", "lifecycle", "siphon", "urgent",
    "procedure", "emergency", "offsite", "office", "sensors", "volume", "diffusers",
    "variable", "multiple", "zone", "conduit", "temperature", "powered", "light", "warning",
    "exit", "blue", "illumination", "spark", "gap", "gas", "filled", "touch", "screen",
    "buttons", "auto", "transformer", "divided", "support", "earthing", "offload", "break",
    "glass", "key", "operated", "manual", "pull", "cord", "exhaust", "damper", "shell",
    "pump", "filter", "conveyor", "pumps", "heat", "heated", "speed", "fan", "bypass",
    "valve", "dampers", "wet", "bulb", "reset", "exiting", "folding", "curtain", "closed",
    "circuit", "dry", "open", "indicator", "shunting", "route", "derail", "departure",
    "starting", "signal", "repeating", "obstruction", "hump", "auxiliary", "home",
    "distant", "block", "blocking", "approach", "mesh", "push", "pushing", "bidirectional",
    "directional", "right", "left", "balancing", "combination", "earthquake", "relay",
    "interface", "face", "nail", "loss", "mounted", "unidirectional", "blastdamper",
    "centrifugal", "backward", "inclined", "vane", "axial", "propellor", "diatomaceous",
    "reverse", "osmosis", "liquefied", "petroleum", "lightning", "shaft", "soak", "slurry",
    "collector", "with", "check", "commercial", "propane", "butane", "atmospheric",
    "vacuum", "wetted", "function", "complementary", "fault", "lower", "limit", "pulse",
    "converter", "running", "average", "upper", "band", "position", "frost", "automatic",
    "continuous", "source", "sink",
];

/// Acronyms restored to upper case by [`case_correct`](super::case_correct)
pub static ACRONYMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ups", "gprs", "rs", "am", "gps", "dc", "ac", "chp", "led", "oled", "ole", "gfa", "tv",
        "msc", "ppm", "iot", "ocl", "lrm", "cgt", "teu", "tmp", "std", "gsm", "cdma", "lte", "td",
        "scdma", "wcdma", "sc", "mp", "bm", "ol", "ep",
    ]
    .into_iter()
    .collect()
});

/// Prepositions and conjunctions kept in lower case inside names
pub static SMALL_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["for", "of", "and", "to", "with", "or", "at"].into_iter().collect());

static DEFAULT_SPLITTER: Lazy<WordSplitter> = Lazy::new(WordSplitter::default);

/// Split an all-caps enumeration literal into lower-case words using the
/// curated dictionary.
pub fn split_enumeration_words(literal: &str) -> String {
    DEFAULT_SPLITTER.split(literal)
}

/// Dictionary-driven splitter for enumeration literals
pub struct WordSplitter<S = VocabularyStemmer> {
    /// Lower-case candidates, longest first
    candidates: Vec<String>,
    stems: S,
}

impl Default for WordSplitter<VocabularyStemmer> {
    fn default() -> Self {
        Self::with_lookup(ENUMERATION_WORDS.iter().copied(), VocabularyStemmer::default())
    }
}

impl WordSplitter<VocabularyStemmer> {
    /// Curated dictionary with `extra` words added to the stem vocabulary
    pub fn with_vocabulary(extra: &[String]) -> Self {
        Self::with_lookup(
            ENUMERATION_WORDS.iter().copied(),
            VocabularyStemmer::with_default_vocabulary(extra),
        )
    }
}

impl<S: StemLookup> WordSplitter<S> {
    /// Splitter over an explicit dictionary and stem lookup
    pub fn with_lookup<I, W>(words: I, stems: S) -> Self
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        let mut candidates: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        candidates.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { candidates, stems }
    }

    /// Split `literal` into space-separated lower-case words
    pub fn split(&self, literal: &str) -> String {
        let mut text = literal.to_lowercase();
        let mut found: Vec<&str> = Vec::new();

        for word in &self.candidates {
            if found.iter().any(|f| f.contains(word.as_str())) {
                continue;
            }
            if let Some(surface) = self.locate(word, &text) {
                text = text.replace(surface.as_str(), &format!(" {} ", surface));
                found.push(word);
            }
        }

        text.replace('_', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The form of `word` present in `text`: the word itself, else the
    /// longest vocabulary word sharing its stem. A bare stem is never a form.
    fn locate(&self, word: &str, text: &str) -> Option<String> {
        if text.contains(word) {
            return Some(word.to_string());
        }

        let stem = self.stems.stem(word);
        if stem.is_empty() {
            return None;
        }

        self.stems
            .surface_forms(&stem)
            .into_iter()
            .find(|form| form != word && text.contains(form.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(words: &[&str]) -> WordSplitter {
        WordSplitter::with_lookup(words.iter().copied(), VocabularyStemmer::new(words.iter().copied()))
    }

    #[test]
    fn test_longest_match_wins() {
        let s = splitter(&["exchange", "exchanger", "plate"]);
        assert_eq!(s.split("PLATEEXCHANGER"), "plate exchanger");
    }

    #[test]
    fn test_underscores_become_spaces() {
        let s = splitter(&["water"]);
        assert_eq!(s.split("HOT_WATER"), "hot water");
        assert_eq!(s.split("UNKNOWNLITERAL"), "unknownliteral");
    }

    #[test]
    fn test_stem_variant_is_split() {
        // "heated" is only known to the stem vocabulary
        let s = WordSplitter::with_lookup(
            ["heating", "pump"],
            VocabularyStemmer::new(["heating", "heated", "pump"]),
        );
        assert_eq!(s.split("HEATEDPUMP"), "heated pump");
    }

    #[test]
    fn test_bare_stem_is_not_split() {
        let s = splitter(&["heating", "heated", "pump"]);
        assert_eq!(s.split("HEATERPUMP"), "heater pump");
    }

    #[test]
    fn test_inflected_words_stay_whole() {
        assert_eq!(split_enumeration_words("WATERCOOLINGCOIL"), "water cooling coil");
        assert_eq!(split_enumeration_words("DXCOOLINGCOIL"), "dxcooling coil");
        assert_eq!(split_enumeration_words("UNLOADER"), "unloader");
    }

    #[test]
    fn test_split_is_idempotent() {
        for literal in ["PLATEEXCHANGER", "SHELLANDTUBE", "FIRE_HYDRANT", "plate exchanger"] {
            let once = split_enumeration_words(literal);
            assert_eq!(split_enumeration_words(&once), once, "literal {}", literal);
        }
    }

    #[test]
    fn test_default_dictionary() {
        assert_eq!(split_enumeration_words("PLATEEXCHANGER"), "plate exchanger");
        assert_eq!(split_enumeration_words("FIRE"), "fire");
        assert_eq!(split_enumeration_words("CIRCULATOR"), "circulator");
    }

    #[test]
    fn test_tables() {
        assert!(ACRONYMS.contains("led"));
        assert!(SMALL_WORDS.contains("and"));
        assert!(!SMALL_WORDS.contains("pump"));
    }
}
