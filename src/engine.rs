//! Intent engine.
//!
//! [`IntentEngine`] is the entry point for callers: it owns the loaded
//! classifier, the catalog and the arbiter, and exposes three operation
//! groups:
//!
//! - [`IntentEngine::resolve`]: answer one message.
//! - [`IntentEngine::train_and_persist`]: retrain, write a snapshot, and
//!   serve it.
//! - [`IntentEngine::load_snapshot`]: serve an existing snapshot.
//!
//! The classifier is immutable and held behind an `Arc`. Inference clones
//! the `Arc` under a short read lock and computes without holding any lock,
//! so concurrent `resolve` calls never wait on each other. Installing a new
//! model swaps the `Arc`; in-flight calls finish on the model they started
//! with.

pub mod config;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::catalog::{Catalog, CatalogItem};
use crate::corpus::Corpus;
use crate::error::{Result, TazabotError};
use crate::ml::snapshot;
use crate::ml::{IntentClassifier, IntentPrediction, TrainingConfig, TrainingReport};
use crate::resolution::{Resolution, ResolutionArbiter, ResponseSelector};

pub use config::EngineConfig;

/// Outcome of [`IntentEngine::load_snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Readiness {
    /// A classifier is loaded and serving.
    Ready,
    /// No classifier is loaded; messages are answered in pattern-only mode.
    NotReady { reason: String },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// Thread-safe message resolution engine.
pub struct IntentEngine {
    config: EngineConfig,
    arbiter: ResolutionArbiter,
    catalog: RwLock<Arc<Catalog>>,
    classifier: RwLock<Option<Arc<IntentClassifier>>>,
    training: Mutex<()>,
}

impl fmt::Debug for IntentEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntentEngine")
            .field("ready", &self.is_ready())
            .field("catalog_items", &self.catalog.read().len())
            .finish()
    }
}

impl IntentEngine {
    /// Create an engine with an empty catalog and no classifier.
    pub fn new(config: EngineConfig) -> Self {
        let arbiter = ResolutionArbiter::new(config.arbiter.clone(), config.matcher.clone());
        IntentEngine {
            config,
            arbiter,
            catalog: RwLock::new(Arc::new(Catalog::default())),
            classifier: RwLock::new(None),
            training: Mutex::new(()),
        }
    }

    /// Create an engine and load the configured menu and snapshot.
    ///
    /// Neither failure is fatal: an unreadable menu leaves the catalog
    /// empty and an unusable snapshot leaves the engine in pattern-only mode.
    pub fn open(config: EngineConfig) -> Self {
        let engine = IntentEngine::new(config);
        match Catalog::from_file(&engine.config.menu_path) {
            Ok(catalog) => engine.set_catalog(catalog),
            Err(e) => warn!("Menu not loaded: {e}"),
        }
        let snapshot_dir = engine.config.snapshot_dir.clone();
        engine.load_snapshot(snapshot_dir);
        engine
    }

    /// Replace the response selector used for intent replies.
    pub fn with_selector(mut self, selector: Arc<dyn ResponseSelector>) -> Self {
        self.arbiter = self.arbiter.with_selector(selector);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Answer one message. Never fails.
    pub fn resolve(&self, message: &str) -> String {
        self.resolve_detailed(message).into_text()
    }

    /// Answer one message against the current catalog, with the signals
    /// that produced the answer.
    pub fn resolve_detailed(&self, message: &str) -> Resolution {
        let catalog = self.catalog();
        self.resolve_with_catalog(message, catalog.items())
    }

    /// Answer one message against a caller-supplied catalog.
    pub fn resolve_with_catalog(&self, message: &str, catalog: &[CatalogItem]) -> Resolution {
        let classifier = self.classifier();
        self.arbiter.resolve(message, classifier.as_deref(), catalog)
    }

    /// Classify one message.
    ///
    /// Fails with [`TazabotError::InferenceUnavailable`] when no classifier
    /// is loaded.
    pub fn predict(&self, text: &str) -> Result<IntentPrediction> {
        let classifier = self.classifier().ok_or_else(|| {
            TazabotError::inference_unavailable("no classifier has been trained or loaded")
        })?;
        Ok(classifier.predict(text))
    }

    /// Train on `corpus`, write the snapshot to `dir`, and serve it.
    ///
    /// Only one training run may be active at a time; a concurrent call
    /// fails with [`TazabotError::TrainingInProgress`]. Inference continues
    /// on the previous model until the new one is installed.
    pub fn train_and_persist<P: AsRef<Path>>(
        &self,
        corpus: &Corpus,
        training: &TrainingConfig,
        dir: P,
    ) -> Result<TrainingReport> {
        let Some(_guard) = self.training.try_lock() else {
            return Err(TazabotError::training_in_progress(
                "another training run is active",
            ));
        };

        let dir = dir.as_ref();
        info!(
            "Training on {} examples across {} intents",
            corpus.num_examples(),
            corpus.intents().len()
        );
        let classifier = IntentClassifier::train(corpus, training)?;
        let report = classifier
            .report()
            .cloned()
            .ok_or_else(|| TazabotError::other("training produced no report"))?;

        snapshot::save(&classifier, dir)?;
        let reloaded = snapshot::load(dir)?;
        self.install(reloaded);
        Ok(report)
    }

    /// Train and persist using the configured corpus, hyperparameters and
    /// snapshot directory.
    pub fn retrain(&self) -> Result<TrainingReport> {
        let corpus = Corpus::from_file(&self.config.corpus_path)?;
        self.train_and_persist(&corpus, &self.config.training, &self.config.snapshot_dir)
    }

    /// Load the snapshot at `dir` and serve it.
    ///
    /// On failure the engine drops any classifier it was serving and
    /// answers in pattern-only mode.
    pub fn load_snapshot<P: AsRef<Path>>(&self, dir: P) -> Readiness {
        let dir = dir.as_ref();
        match snapshot::load(dir) {
            Ok(classifier) => {
                info!(
                    "Classifier loaded from {} ({} intents, {} tokens)",
                    dir.display(),
                    classifier.labels().len(),
                    classifier.vocabulary().len()
                );
                self.install(classifier);
                Readiness::Ready
            }
            Err(e) => {
                warn!("Classifier unavailable, using pattern-only mode: {e}");
                self.unload();
                Readiness::NotReady {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Serve `classifier`, replacing the current one.
    pub fn install(&self, classifier: IntentClassifier) {
        let classifier = classifier.with_threshold(self.config.classifier_threshold);
        let previous = std::mem::replace(&mut *self.classifier.write(), Some(Arc::new(classifier)));
        if previous.is_some() {
            info!("Replaced the serving classifier");
        }
    }

    /// Stop serving any classifier.
    pub fn unload(&self) {
        self.classifier.write().take();
    }

    pub fn is_ready(&self) -> bool {
        self.classifier.read().is_some()
    }

    /// The classifier currently served, if any.
    pub fn classifier(&self) -> Option<Arc<IntentClassifier>> {
        self.classifier.read().clone()
    }

    /// Replace the catalog.
    pub fn set_catalog(&self, catalog: Catalog) {
        *self.catalog.write() = Arc::new(catalog);
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::IntentDefinition;
    use crate::resolution::FirstSelector;
    use tempfile::TempDir;

    fn corpus() -> Corpus {
        Corpus::new(vec![
            IntentDefinition::new(
                "saludos",
                vec!["hola".into(), "buenos dias".into()],
                vec!["¡Hola!".into()],
            ),
            IntentDefinition::new(
                "despedida",
                vec!["adios".into(), "hasta luego".into()],
                vec!["¡Hasta pronto!".into()],
            ),
        ])
        .unwrap()
    }

    fn training() -> TrainingConfig {
        TrainingConfig {
            epochs: 200,
            learning_rate: 0.005,
            seed: Some(11),
            ..Default::default()
        }
    }

    #[test]
    fn test_predict_without_model() {
        let engine = IntentEngine::new(EngineConfig::default());
        assert!(!engine.is_ready());
        assert!(matches!(
            engine.predict("hola"),
            Err(TazabotError::InferenceUnavailable(_))
        ));
        // resolve never fails
        assert!(engine.resolve_detailed("hola").is_fallback());
    }

    #[test]
    fn test_train_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model");
        let engine = IntentEngine::new(EngineConfig::default())
            .with_selector(Arc::new(FirstSelector));

        let report = engine.train_and_persist(&corpus(), &training(), &path).unwrap();
        assert_eq!(report.examples, 4);
        assert!(engine.is_ready());
        assert_eq!(engine.resolve("Hola!"), "¡Hola!");

        let fresh = IntentEngine::new(EngineConfig::default());
        assert_eq!(fresh.load_snapshot(&path), Readiness::Ready);
        assert_eq!(
            fresh.predict("adios").unwrap().intent.as_deref(),
            Some("despedida")
        );
    }

    #[test]
    fn test_failed_load_unloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model");
        let engine = IntentEngine::new(EngineConfig::default());
        engine.train_and_persist(&corpus(), &training(), &path).unwrap();
        assert!(engine.is_ready());

        let readiness = engine.load_snapshot(dir.path().join("missing"));
        assert!(!readiness.is_ready());
        assert!(!engine.is_ready());
    }

    #[test]
    fn test_training_is_exclusive() {
        let dir = TempDir::new().unwrap();
        let engine = IntentEngine::new(EngineConfig::default());
        let _held = engine.training.lock();
        let err = engine
            .train_and_persist(&corpus(), &training(), dir.path().join("model"))
            .unwrap_err();
        assert!(matches!(err, TazabotError::TrainingInProgress(_)));
    }

    #[test]
    fn test_install_applies_configured_threshold() {
        let mut config = EngineConfig::default();
        config.classifier_threshold = 0.25;
        let engine = IntentEngine::new(config);
        let classifier = IntentClassifier::train(&corpus(), &training()).unwrap();
        engine.install(classifier);
        assert_eq!(engine.classifier().unwrap().threshold(), 0.25);
        engine.unload();
        assert!(engine.classifier().is_none());
    }

    #[test]
    fn test_catalog_swap() {
        let engine = IntentEngine::new(EngineConfig::default());
        engine.set_catalog(Catalog::new(vec![CatalogItem::new(
            1,
            "Pozole Rojo",
            "Con maíz cacahuazintle",
            120.0,
        )]));
        let resolution = engine.resolve_detailed("pozole rojo");
        assert_eq!(resolution.kind(), "item_detail");
    }
}
