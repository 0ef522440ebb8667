//! Text normalization shared by the classifier and the catalog matcher.
//!
//! Normalization runs in a fixed order: lower-case, accent folding, character
//! stripping, trimming. The two variants differ only in what they strip:
//!
//! - [`Normalizer::classifier`] keeps `[a-z0-9]` and whitespace, nothing else.
//! - [`Normalizer::catalog`] removes only `¿?¡!.,;` and keeps every other character.
//!
//! Both variants are idempotent.
//!
//! # Examples
//!
//! ```
//! use tazabot::analysis::{normalize_for_catalog, normalize_for_classifier};
//!
//! assert_eq!(normalize_for_classifier("¡Hola! ¿Qué tal?"), "hola que tal");
//! assert_eq!(normalize_for_catalog("¿Chilaquiles Rojos?"), "chilaquiles rojos");
//! ```

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::char_filter::CharFilter;
use crate::analysis::char_filter::accent_folding::AccentFoldingCharFilter;
use crate::analysis::char_filter::pattern_strip::PatternStripCharFilter;

/// Characters outside this class are removed on the classifier path.
pub const CLASSIFIER_STRIP_PATTERN: &str = r"[^a-z0-9\s]";

/// Punctuation removed on the catalog path.
pub const CATALOG_STRIP_PATTERN: &str = r"[¿?¡!.,;]";

lazy_static! {
    static ref CLASSIFIER_NORMALIZER: Normalizer = Normalizer::classifier();
    static ref CATALOG_NORMALIZER: Normalizer = Normalizer::catalog();
}

/// Normalize text for the bag-of-words classifier path.
pub fn normalize_for_classifier(text: &str) -> String {
    CLASSIFIER_NORMALIZER.normalize(text)
}

/// Normalize text for catalog item name matching.
pub fn normalize_for_catalog(text: &str) -> String {
    CATALOG_NORMALIZER.normalize(text)
}

/// A deterministic text normalizer: lower-case, then char filters, then trim.
pub struct Normalizer {
    name: &'static str,
    char_filters: Vec<Box<dyn CharFilter>>,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("name", &self.name)
            .field(
                "char_filters",
                &self.char_filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Normalizer {
    /// Create a normalizer from an explicit list of char filters.
    ///
    /// The filters run in order after lower-casing; trimming always runs last.
    pub fn new(name: &'static str, char_filters: Vec<Box<dyn CharFilter>>) -> Self {
        Normalizer { name, char_filters }
    }

    /// The classifier variant: strips everything except `[a-z0-9\s]`.
    pub fn classifier() -> Self {
        lazy_static! {
            static ref STRIP: Regex =
                Regex::new(CLASSIFIER_STRIP_PATTERN).expect("classifier strip pattern is valid");
        }
        Self::new(
            "classifier",
            vec![
                Box::new(AccentFoldingCharFilter::new()),
                Box::new(PatternStripCharFilter::from_regex(STRIP.clone())),
            ],
        )
    }

    /// The catalog variant: strips only `¿?¡!.,;`.
    pub fn catalog() -> Self {
        lazy_static! {
            static ref STRIP: Regex =
                Regex::new(CATALOG_STRIP_PATTERN).expect("catalog strip pattern is valid");
        }
        Self::new(
            "catalog",
            vec![
                Box::new(AccentFoldingCharFilter::new()),
                Box::new(PatternStripCharFilter::from_regex(STRIP.clone())),
            ],
        )
    }

    /// Normalize the given text.
    pub fn normalize(&self, text: &str) -> String {
        let mut normalized = text.to_lowercase();
        for filter in &self.char_filters {
            normalized = filter.filter(&normalized);
        }
        normalized.trim().to_string()
    }

    /// Name of this normalizer variant.
    pub fn name(&self) -> &'static str {
        self.name
    }
}
