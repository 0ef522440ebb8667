//! Fuzzy lookup of catalog items by name.

pub mod item_matcher;

pub use item_matcher::{FuzzyItemMatcher, ItemMatch, MatcherConfig};
