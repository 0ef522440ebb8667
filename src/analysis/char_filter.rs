//! Char filter implementations for text normalization.
//!
//! Char filters rewrite the whole text string before it is tokenized or
//! compared against catalog item names.
//!
//! # Available Filters
//!
//! - [`accent_folding::AccentFoldingCharFilter`] - Fixed-table accent folding
//! - [`pattern_strip::PatternStripCharFilter`] - Regex-based character removal
//!
//! # Examples
//!
//! ```
//! use tazabot::analysis::char_filter::CharFilter;
//! use tazabot::analysis::char_filter::accent_folding::AccentFoldingCharFilter;
//!
//! let filter = AccentFoldingCharFilter::new();
//! assert_eq!(filter.filter("café con piña"), "cafe con pina");
//! ```

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text and return the filtered text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod accent_folding;
pub mod pattern_strip;
