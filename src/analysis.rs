//! Text analysis for intent resolution.
//!
//! Raw user messages go through a [`normalizer::Normalizer`] (case folding,
//! accent folding, punctuation stripping) and are then split into tokens by a
//! [`tokenizer::Tokenizer`]. Two normalizer variants exist because the
//! classifier and the catalog matcher keep different character sets.

pub mod char_filter;
pub mod normalizer;
pub mod tokenizer;

pub use normalizer::{Normalizer, normalize_for_catalog, normalize_for_classifier};
pub use tokenizer::{Tokenizer, WhitespaceTokenizer};
