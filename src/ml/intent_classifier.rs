//! Bag-of-words intent classifier backed by a feed-forward network.
//!
//! # Training
//!
//! [`IntentClassifier::train`] builds the vocabulary and label set from the
//! corpus, encodes every phrase, and runs mini-batch training with softmax
//! cross-entropy and Adam. The whole corpus is used for training; the
//! reported accuracy is the running training accuracy of the last epoch.
//!
//! # Inference
//!
//! [`IntentClassifier::predict`] returns the most probable intent together
//! with its softmax probability. When that probability is below the
//! confidence threshold, the intent is suppressed and only the confidence is
//! reported. Text with no known token carries no evidence at all and is
//! always suppressed.
//!
//! A classifier is immutable once built, so a shared reference can serve
//! any number of concurrent predictions.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::corpus::{Corpus, IntentLabelSet, ResponseTable, TrainingExample};
use crate::error::{Result, TazabotError};
use crate::ml::DEFAULT_CLASSIFIER_THRESHOLD;
use crate::ml::encoder::BagOfWordsEncoder;
use crate::ml::network::{
    FeedForwardNetwork, Gradients, NetworkArchitecture, argmax, cross_entropy, softmax,
};
use crate::ml::optimizer::{Adam, AdamConfig};
use crate::ml::snapshot::{self, SnapshotMetadata};
use crate::ml::vocabulary::Vocabulary;

/// Training hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of passes over the corpus.
    pub epochs: usize,
    /// Examples per optimizer step.
    pub batch_size: usize,
    /// Adam learning rate.
    pub learning_rate: f32,
    /// Seed for initialisation, shuffling and dropout. `None` draws one.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            epochs: 200,
            batch_size: 8,
            learning_rate: 0.001,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(TazabotError::invalid_argument("epochs must be positive"));
        }
        if self.batch_size == 0 {
            return Err(TazabotError::invalid_argument("batch size must be positive"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TazabotError::invalid_argument(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Running training accuracy of the last epoch, in `[0, 1]`.
    pub accuracy: f32,
    /// Mean batch loss of the last epoch.
    pub loss: f32,
    pub epochs: usize,
    pub examples: usize,
    pub vocabulary_size: usize,
    pub labels: usize,
    /// Seed actually used, so a run can be reproduced.
    pub seed: u64,
    pub duration_ms: u64,
}

/// Result of classifying one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentPrediction {
    /// Predicted intent, or `None` when confidence was below the threshold.
    pub intent: Option<String>,
    /// Probability of the arg-max intent.
    pub confidence: f32,
}

impl IntentPrediction {
    /// The suppressed outcome: no intent, with the observed confidence.
    pub fn suppressed(confidence: f32) -> Self {
        IntentPrediction {
            intent: None,
            confidence,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.intent.is_none()
    }
}

/// Trained, immutable intent classifier.
#[derive(Clone)]
pub struct IntentClassifier {
    vocabulary: Vocabulary,
    labels: IntentLabelSet,
    responses: ResponseTable,
    network: FeedForwardNetwork,
    threshold: f32,
    report: Option<TrainingReport>,
}

impl fmt::Debug for IntentClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntentClassifier")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("labels", &self.labels)
            .field("parameters", &self.network.num_parameters())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl IntentClassifier {
    /// Train a classifier on a corpus.
    pub fn train(corpus: &Corpus, config: &TrainingConfig) -> Result<Self> {
        Self::train_examples(&corpus.examples(), corpus.response_table(), config)
    }

    /// Train a classifier on labeled examples.
    ///
    /// `responses` must cover every tag that appears in `examples`.
    pub fn train_examples(
        examples: &[TrainingExample],
        responses: ResponseTable,
        config: &TrainingConfig,
    ) -> Result<Self> {
        config.validate()?;
        if examples.is_empty() {
            return Err(TazabotError::invalid_argument(
                "training needs at least one example",
            ));
        }

        let start = Instant::now();
        let vocabulary = Vocabulary::build(examples.iter().map(|e| e.phrase.as_str()));
        if vocabulary.is_empty() {
            return Err(TazabotError::invalid_argument(
                "training phrases contain no tokens",
            ));
        }
        let labels = IntentLabelSet::from_examples(examples);
        responses.validate_against(&labels)?;
        info!(
            "Vocabulary built: {} tokens, {} intents, {} examples",
            vocabulary.len(),
            labels.len(),
            examples.len()
        );

        let encoder = BagOfWordsEncoder::new(&vocabulary);
        let inputs: Vec<Vec<f32>> = examples
            .par_iter()
            .map(|e| encoder.encode(&e.phrase).into_vec())
            .collect();
        let targets = examples
            .iter()
            .map(|e| {
                labels.index_of(&e.intent_tag).ok_or_else(|| {
                    TazabotError::other(format!("label '{}' missing", e.intent_tag))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        debug!("Training seed: {seed}");

        let architecture = NetworkArchitecture::intent_funnel(vocabulary.len(), labels.len());
        let mut network = FeedForwardNetwork::new(architecture, &mut rng)?;
        let mut optimizer = Adam::new(AdamConfig::with_learning_rate(config.learning_rate), &network);
        let mut grads = Gradients::zeros_like(&network);
        let mut order: Vec<usize> = (0..examples.len()).collect();

        let mut accuracy = 0.0;
        let mut loss = 0.0;
        for epoch in 0..config.epochs {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;
            let mut batches = 0;
            let mut correct = 0;

            for batch in order.chunks(config.batch_size) {
                grads.reset();
                let scale = 1.0 / batch.len() as f32;
                let mut batch_loss = 0.0;

                for &idx in batch {
                    let target = targets[idx];
                    let trace = network.forward_train(&inputs[idx], &mut rng);
                    if argmax(&trace.logits) == Some(target) {
                        correct += 1;
                    }

                    // d(mean CE)/d(logits) = (softmax - one_hot) / batch_len
                    let mut grad = softmax(&trace.logits);
                    batch_loss += cross_entropy(&grad, target);
                    grad[target] -= 1.0;
                    grad.iter_mut().for_each(|g| *g *= scale);
                    network.backward(&trace, &grad, &mut grads);
                }

                optimizer.step(&mut network, &grads);
                epoch_loss += batch_loss * scale;
                batches += 1;
            }

            accuracy = correct as f32 / examples.len() as f32;
            loss = epoch_loss / batches as f32;
            if (epoch + 1) % 20 == 0 || epoch + 1 == config.epochs {
                info!(
                    "Epoch {}/{} - loss: {:.4} - accuracy: {:.2}%",
                    epoch + 1,
                    config.epochs,
                    loss,
                    accuracy * 100.0
                );
            }
        }

        let report = TrainingReport {
            accuracy,
            loss,
            epochs: config.epochs,
            examples: examples.len(),
            vocabulary_size: vocabulary.len(),
            labels: labels.len(),
            seed,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "Training complete: accuracy {:.2}% in {} ms",
            report.accuracy * 100.0,
            report.duration_ms
        );

        let mut classifier = Self::from_parts(vocabulary, labels, responses, network)?;
        classifier.report = Some(report);
        Ok(classifier)
    }

    /// Assemble a classifier from trained components, checking that they agree.
    pub fn from_parts(
        vocabulary: Vocabulary,
        labels: IntentLabelSet,
        responses: ResponseTable,
        network: FeedForwardNetwork,
    ) -> Result<Self> {
        network.validate()?;
        if labels.is_empty() {
            return Err(TazabotError::configuration("classifier has no labels"));
        }
        let architecture = network.architecture();
        if architecture.input_dim != vocabulary.len() {
            return Err(TazabotError::configuration(format!(
                "network expects {} inputs but vocabulary has {} tokens",
                architecture.input_dim,
                vocabulary.len()
            )));
        }
        if architecture.output_dim != labels.len() {
            return Err(TazabotError::configuration(format!(
                "network has {} outputs but there are {} labels",
                architecture.output_dim,
                labels.len()
            )));
        }
        responses.validate_against(&labels)?;

        Ok(IntentClassifier {
            vocabulary,
            labels,
            responses,
            network,
            threshold: DEFAULT_CLASSIFIER_THRESHOLD,
            report: None,
        })
    }

    /// Replace the default confidence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Attach a training report.
    pub fn with_report(mut self, report: Option<TrainingReport>) -> Self {
        self.report = report;
        self
    }

    /// Probability distribution over the label set for `text`.
    ///
    /// Text without any vocabulary token yields the uniform distribution.
    pub fn probabilities(&self, text: &str) -> Vec<f32> {
        let encoded = BagOfWordsEncoder::new(&self.vocabulary).encode(text);
        if encoded.is_zero() {
            return vec![1.0 / self.labels.len() as f32; self.labels.len()];
        }
        softmax(&self.network.forward(encoded.as_slice()))
    }

    /// Classify `text` using the classifier's own threshold.
    pub fn predict(&self, text: &str) -> IntentPrediction {
        self.predict_with_threshold(text, self.threshold)
    }

    /// Classify `text`, suppressing the intent when confidence is below `threshold`.
    pub fn predict_with_threshold(&self, text: &str, threshold: f32) -> IntentPrediction {
        let encoded = BagOfWordsEncoder::new(&self.vocabulary).encode(text);
        if encoded.is_zero() {
            return IntentPrediction::suppressed(1.0 / self.labels.len() as f32);
        }

        let probabilities = softmax(&self.network.forward(encoded.as_slice()));
        let Some(best) = argmax(&probabilities) else {
            return IntentPrediction::suppressed(0.0);
        };
        let confidence = probabilities[best];
        if confidence < threshold {
            return IntentPrediction::suppressed(confidence);
        }

        IntentPrediction {
            intent: self.labels.get(best).map(str::to_string),
            confidence,
        }
    }

    /// Candidate responses for an intent.
    pub fn responses_for(&self, tag: &str) -> Option<&[String]> {
        self.responses.get(tag)
    }

    /// Persist this classifier as a snapshot directory.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<SnapshotMetadata> {
        snapshot::save(self, path)
    }

    /// Load a classifier from a snapshot directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        snapshot::load(path)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn labels(&self) -> &IntentLabelSet {
        &self.labels
    }

    pub fn responses(&self) -> &ResponseTable {
        &self.responses
    }

    pub fn network(&self) -> &FeedForwardNetwork {
        &self.network
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }
}
