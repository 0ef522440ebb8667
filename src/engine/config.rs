//! Configuration for the intent engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TazabotError};
use crate::matching::MatcherConfig;
use crate::ml::{DEFAULT_CLASSIFIER_THRESHOLD, TrainingConfig};
use crate::resolution::ArbiterConfig;

/// Configuration for [`IntentEngine`](crate::engine::IntentEngine).
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```json
/// {"snapshot_dir": "models/current", "arbiter": {"intent_threshold": 0.4}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory of the classifier snapshot.
    pub snapshot_dir: PathBuf,

    /// Training corpus file.
    pub corpus_path: PathBuf,

    /// Menu file.
    pub menu_path: PathBuf,

    /// Confidence below which the classifier itself suppresses its answer.
    pub classifier_threshold: f32,

    /// Hyperparameters for retraining.
    pub training: TrainingConfig,

    /// Arbiter thresholds and texts.
    pub arbiter: ArbiterConfig,

    /// Fuzzy item matching thresholds.
    pub matcher: MatcherConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("model"),
            corpus_path: PathBuf::from("data/intents.json"),
            menu_path: PathBuf::from("data/menu.json"),
            classifier_threshold: DEFAULT_CLASSIFIER_THRESHOLD,
            training: TrainingConfig::default(),
            arbiter: ArbiterConfig::default(),
            matcher: MatcherConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TazabotError::configuration(format!("cannot read config {}: {e}", path.display()))
        })?;
        let config: EngineConfig = serde_json::from_str(&content).map_err(|e| {
            TazabotError::configuration(format!("malformed config {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let probability = 0.0..=1.0;
        if !probability.contains(&self.classifier_threshold) {
            return Err(TazabotError::configuration(format!(
                "classifier_threshold {} outside [0, 1]",
                self.classifier_threshold
            )));
        }
        if !probability.contains(&self.arbiter.intent_threshold) {
            return Err(TazabotError::configuration(format!(
                "intent_threshold {} outside [0, 1]",
                self.arbiter.intent_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.arbiter.item_detail_threshold)
            || !(0.0..=1.0).contains(&self.matcher.min_similarity)
        {
            return Err(TazabotError::configuration(
                "similarity thresholds must lie in [0, 1]",
            ));
        }
        self.training
            .validate()
            .map_err(|e| TazabotError::configuration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.classifier_threshold, 0.10);
        assert_eq!(config.arbiter.intent_threshold, 0.30);
        assert_eq!(config.matcher.min_similarity, 0.6);
        assert_eq!(config.matcher.max_matches, 3);
        assert_eq!(config.training.epochs, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tazabot.json");
        std::fs::write(
            &path,
            r#"{"snapshot_dir": "models/current", "arbiter": {"intent_threshold": 0.4}, "training": {"epochs": 50}}"#,
        )
        .unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.snapshot_dir, PathBuf::from("models/current"));
        assert_eq!(config.arbiter.intent_threshold, 0.4);
        assert_eq!(config.arbiter.item_detail_threshold, 0.8);
        assert_eq!(config.training.epochs, 50);
        assert_eq!(config.training.batch_size, 8);
    }

    #[test]
    fn test_invalid_files() {
        let dir = TempDir::new().unwrap();
        assert!(
            EngineConfig::from_file(dir.path().join("missing.json"))
                .unwrap_err()
                .is_configuration()
        );

        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"classifier_threshold": 2.0}"#).unwrap();
        assert!(EngineConfig::from_file(&path).unwrap_err().is_configuration());
    }
}
