//! Closed token vocabulary built from the training phrases.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::normalize_for_classifier;
use crate::analysis::tokenizer::{Tokenizer, WhitespaceTokenizer};

/// Ordered set of unique normalized tokens with a dense token -> index mapping.
///
/// Indices are assigned in lexicographic token order, so two builds over the
/// same phrases produce the same mapping regardless of input order. The
/// vocabulary is frozen once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from raw phrases.
    ///
    /// Each phrase is normalized for the classifier path and split on
    /// whitespace; the union of all tokens is sorted and indexed.
    pub fn build<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokenizer = WhitespaceTokenizer::new();
        let mut all_tokens = BTreeSet::new();
        for phrase in phrases {
            let normalized = normalize_for_classifier(phrase.as_ref());
            all_tokens.extend(tokenizer.tokenize(&normalized));
        }
        Self::from(all_tokens.into_iter().collect::<Vec<_>>())
    }

    /// Index of a token, if it is part of the vocabulary.
    pub fn get(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Token at an index.
    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in index order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(tokens: Vec<String>) -> Self {
        let index = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Vocabulary { tokens, index }
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.tokens
    }
}
