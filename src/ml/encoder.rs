//! Binary bag-of-words encoding.

use crate::analysis::normalizer::normalize_for_classifier;
use crate::analysis::tokenizer::{Tokenizer, WhitespaceTokenizer};
use crate::ml::vocabulary::Vocabulary;

/// Fixed-length binary presence vector over a vocabulary.
///
/// Entry `i` is `1.0` when vocabulary token `i` occurs in the text and `0.0`
/// otherwise. Token order and counts are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVector {
    values: Vec<f32>,
}

impl EncodedVector {
    /// All-zero vector of the given length.
    pub fn zeros(len: usize) -> Self {
        EncodedVector {
            values: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when no vocabulary token was present in the text.
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    /// Indices of the set entries, ascending.
    pub fn active_indices(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }
}

/// Encodes text against a frozen vocabulary.
///
/// Out-of-vocabulary tokens are dropped silently; the vocabulary never grows.
#[derive(Debug, Clone, Copy)]
pub struct BagOfWordsEncoder<'a> {
    vocabulary: &'a Vocabulary,
}

impl<'a> BagOfWordsEncoder<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        BagOfWordsEncoder { vocabulary }
    }

    /// Encode raw text. The output length is always the vocabulary size.
    pub fn encode(&self, text: &str) -> EncodedVector {
        let normalized = normalize_for_classifier(text);
        let tokens = WhitespaceTokenizer::new().tokenize(&normalized);
        self.encode_tokens(&tokens)
    }

    /// Encode an already normalized token sequence.
    pub fn encode_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> EncodedVector {
        let mut vector = EncodedVector::zeros(self.vocabulary.len());
        for token in tokens {
            if let Some(idx) = self.vocabulary.get(token.as_ref()) {
                vector.values[idx] = 1.0;
            }
        }
        vector
    }
}

/// Encode `text` against `vocabulary`.
pub fn encode(text: &str, vocabulary: &Vocabulary) -> EncodedVector {
    BagOfWordsEncoder::new(vocabulary).encode(text)
}
