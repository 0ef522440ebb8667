//! Intent classification.
//!
//! The pipeline is: build a [`vocabulary::Vocabulary`] from the training
//! phrases, encode each phrase as a binary bag-of-words vector with
//! [`encoder::BagOfWordsEncoder`], and train a small feed-forward
//! [`network::FeedForwardNetwork`] with the Adam optimizer. The trained
//! network, vocabulary, label set and response table are bundled into an
//! [`intent_classifier::IntentClassifier`] and persisted with
//! [`snapshot`].

pub mod encoder;
pub mod intent_classifier;
pub mod network;
pub mod optimizer;
pub mod snapshot;
pub mod vocabulary;

pub use encoder::{BagOfWordsEncoder, EncodedVector};
pub use intent_classifier::{IntentClassifier, IntentPrediction, TrainingConfig, TrainingReport};
pub use vocabulary::Vocabulary;

/// Default confidence below which the raw classifier suppresses its answer.
pub const DEFAULT_CLASSIFIER_THRESHOLD: f32 = 0.10;
