//! Tokenizers split normalized text into tokens.
//!
//! # Examples
//!
//! ```
//! use tazabot::analysis::tokenizer::{Tokenizer, WhitespaceTokenizer};
//!
//! let tokenizer = WhitespaceTokenizer::new();
//! let tokens = tokenizer.tokenize("quiero  ordenar tacos");
//! assert_eq!(tokens, vec!["quiero", "ordenar", "tacos"]);
//! ```

pub mod whitespace;

pub use whitespace::WhitespaceTokenizer;

/// Trait for tokenizers that convert text into a sequence of tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text. Empty input yields no tokens.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Get the name of this tokenizer.
    fn name(&self) -> &'static str;
}
