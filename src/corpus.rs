//! Labeled training corpus, intent label set and response table.
//!
//! The corpus is a list of intent definitions, each carrying the example
//! phrases used for training and the candidate responses returned when the
//! intent is recognised:
//!
//! ```json
//! {
//!   "intents": [
//!     {"tag": "saludos", "patterns": ["hola", "buenos dias"], "responses": ["¡Hola!"]}
//!   ]
//! }
//! ```
//!
//! The Spanish field names `intenciones`, `patrones` and `respuestas` are
//! accepted as aliases.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TazabotError};

/// A single labeled phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Example phrase as written by a user.
    pub phrase: String,
    /// Intent tag the phrase belongs to.
    pub intent_tag: String,
}

impl TrainingExample {
    pub fn new<P: Into<String>, T: Into<String>>(phrase: P, intent_tag: T) -> Self {
        TrainingExample {
            phrase: phrase.into(),
            intent_tag: intent_tag.into(),
        }
    }
}

/// An intent with its training patterns and candidate responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentDefinition {
    pub tag: String,
    #[serde(alias = "patrones", default)]
    pub patterns: Vec<String>,
    #[serde(alias = "respuestas", default)]
    pub responses: Vec<String>,
}

impl IntentDefinition {
    pub fn new<T: Into<String>>(tag: T, patterns: Vec<String>, responses: Vec<String>) -> Self {
        IntentDefinition {
            tag: tag.into(),
            patterns,
            responses,
        }
    }
}

/// A validated training corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(alias = "intenciones")]
    intents: Vec<IntentDefinition>,
}

impl Corpus {
    /// Create a corpus from intent definitions, validating it.
    pub fn new(intents: Vec<IntentDefinition>) -> Result<Self> {
        let corpus = Corpus { intents };
        corpus.validate()?;
        Ok(corpus)
    }

    /// Load and validate a corpus from a JSON file.
    ///
    /// A missing, unreadable or malformed file is a configuration error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TazabotError::configuration(format!(
                "cannot read corpus file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&content).map_err(|e| match e {
            TazabotError::Configuration(msg) => {
                TazabotError::configuration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Parse and validate a corpus from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let corpus: Corpus = serde_json::from_str(json)
            .map_err(|e| TazabotError::configuration(format!("malformed corpus: {e}")))?;
        corpus.validate()?;
        Ok(corpus)
    }

    /// Check the corpus invariants.
    ///
    /// Tags must be unique and non-empty, every intent needs at least one
    /// response, and the corpus as a whole needs at least one pattern.
    pub fn validate(&self) -> Result<()> {
        if self.intents.is_empty() {
            return Err(TazabotError::configuration("corpus has no intents"));
        }

        let mut seen = HashSet::new();
        for intent in &self.intents {
            if intent.tag.trim().is_empty() {
                return Err(TazabotError::configuration("intent with empty tag"));
            }
            if !seen.insert(intent.tag.as_str()) {
                return Err(TazabotError::configuration(format!(
                    "duplicate intent tag '{}'",
                    intent.tag
                )));
            }
            if intent.responses.is_empty() {
                return Err(TazabotError::configuration(format!(
                    "intent '{}' has no responses",
                    intent.tag
                )));
            }
            if intent.patterns.is_empty() {
                warn!(
                    "Intent '{}' has no patterns and will not be learned",
                    intent.tag
                );
            }
        }

        if self.intents.iter().all(|i| i.patterns.is_empty()) {
            return Err(TazabotError::configuration("corpus has no patterns"));
        }

        Ok(())
    }

    /// Intent definitions in corpus order.
    pub fn intents(&self) -> &[IntentDefinition] {
        &self.intents
    }

    /// Flatten the corpus into labeled examples, in corpus order.
    pub fn examples(&self) -> Vec<TrainingExample> {
        self.intents
            .iter()
            .flat_map(|intent| {
                intent
                    .patterns
                    .iter()
                    .map(move |pattern| TrainingExample::new(pattern.clone(), intent.tag.clone()))
            })
            .collect()
    }

    /// Total number of training phrases.
    pub fn num_examples(&self) -> usize {
        self.intents.iter().map(|i| i.patterns.len()).sum()
    }

    /// Response table covering every intent in the corpus.
    pub fn response_table(&self) -> ResponseTable {
        let mut table = ResponseTable::new();
        for intent in &self.intents {
            table.insert(intent.tag.clone(), intent.responses.clone());
        }
        table
    }
}

/// Ordered list of unique intent tags.
///
/// A tag's position is the classifier output index for that intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentLabelSet {
    labels: Vec<String>,
}

impl IntentLabelSet {
    /// Build the label set from examples, ordered by first appearance.
    pub fn from_examples(examples: &[TrainingExample]) -> Self {
        let mut labels: Vec<String> = Vec::new();
        for example in examples {
            if !labels.contains(&example.intent_tag) {
                labels.push(example.intent_tag.clone());
            }
        }
        IntentLabelSet { labels }
    }

    /// Build a label set from explicit tags. Duplicates are rejected.
    pub fn from_labels(labels: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(TazabotError::configuration(format!(
                    "duplicate label '{label}'"
                )));
            }
        }
        Ok(IntentLabelSet { labels })
    }

    /// Output index of a tag.
    pub fn index_of(&self, tag: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == tag)
    }

    /// Tag at an output index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

/// Candidate responses per intent tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseTable {
    responses: BTreeMap<String, Vec<String>>,
}

impl ResponseTable {
    pub fn new() -> Self {
        ResponseTable::default()
    }

    pub fn insert(&mut self, tag: String, responses: Vec<String>) {
        self.responses.insert(tag, responses);
    }

    /// Candidate responses for a tag.
    pub fn get(&self, tag: &str) -> Option<&[String]> {
        self.responses.get(tag).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Check that every label has at least one response.
    pub fn validate_against(&self, labels: &IntentLabelSet) -> Result<()> {
        for label in labels.iter() {
            match self.responses.get(label) {
                Some(responses) if !responses.is_empty() => {}
                _ => {
                    return Err(TazabotError::configuration(format!(
                        "intent '{label}' has no responses"
                    )));
                }
            }
        }
        Ok(())
    }
}
