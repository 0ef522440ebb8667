//! On-disk snapshots of a trained classifier.
//!
//! A snapshot is a directory holding two files:
//!
//! - `model.bin`: the network parameters, bincode encoded.
//! - `metadata.json`: format version, architecture, vocabulary, label set,
//!   response table, a CRC32 of `model.bin` and the training report.
//!
//! Saving writes into a hidden staging directory next to the target and
//! renames it into place, so a reader never observes a half-written
//! snapshot. Loading validates everything it reads; any inconsistency is a
//! [`TazabotError::Configuration`] so callers can degrade to pattern-only
//! mode.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::corpus::{IntentLabelSet, ResponseTable};
use crate::error::{Result, TazabotError};
use crate::ml::intent_classifier::{IntentClassifier, TrainingReport};
use crate::ml::network::{FeedForwardNetwork, NetworkArchitecture};
use crate::ml::vocabulary::Vocabulary;

/// Current snapshot format version.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Parameter file name inside a snapshot directory.
pub const PARAMETERS_FILE: &str = "model.bin";

/// Metadata file name inside a snapshot directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Everything in a snapshot except the network parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub format_version: u32,
    pub snapshot_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub architecture: NetworkArchitecture,
    pub vocabulary: Vocabulary,
    pub labels: IntentLabelSet,
    pub responses: ResponseTable,
    /// CRC32 of the parameter file.
    pub parameters_checksum: u32,
    pub confidence_threshold: f32,
    pub report: Option<TrainingReport>,
}

/// Write `classifier` to the snapshot directory `path`, replacing any
/// existing snapshot there.
pub fn save<P: AsRef<Path>>(classifier: &IntentClassifier, path: P) -> Result<SnapshotMetadata> {
    let target = path.as_ref();
    let (parent, name) = split_target(target)?;
    fs::create_dir_all(&parent)?;

    let parameters = bincode::serialize(classifier.network())?;
    let metadata = SnapshotMetadata {
        format_version: SNAPSHOT_FORMAT_VERSION,
        snapshot_id: Uuid::new_v4(),
        created_at: Utc::now(),
        architecture: classifier.network().architecture().clone(),
        vocabulary: classifier.vocabulary().clone(),
        labels: classifier.labels().clone(),
        responses: classifier.responses().clone(),
        parameters_checksum: crc32fast::hash(&parameters),
        confidence_threshold: classifier.threshold(),
        report: classifier.report().cloned(),
    };

    let staging = parent.join(format!(".{name}.staging-{}", metadata.snapshot_id));
    if let Err(e) = write_files(&staging, &parameters, &metadata) {
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }

    if target.exists() {
        let retired = parent.join(format!(".{name}.retired-{}", metadata.snapshot_id));
        fs::rename(target, &retired)?;
        if let Err(e) = fs::rename(&staging, target) {
            // Put the previous snapshot back before reporting the failure.
            let _ = fs::rename(&retired, target);
            let _ = fs::remove_dir_all(&staging);
            return Err(e.into());
        }
        if let Err(e) = fs::remove_dir_all(&retired) {
            warn!("Failed to remove old snapshot {}: {e}", retired.display());
        }
    } else {
        fs::rename(&staging, target)?;
    }

    info!(
        "Saved snapshot {} to {} ({} bytes of parameters)",
        metadata.snapshot_id,
        target.display(),
        parameters.len()
    );
    Ok(metadata)
}

/// Load and validate the classifier stored at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<IntentClassifier> {
    let path = path.as_ref();
    let metadata = read_metadata(path)?;

    let parameters_path = path.join(PARAMETERS_FILE);
    let parameters = fs::read(&parameters_path).map_err(|e| {
        TazabotError::configuration(format!("cannot read {}: {e}", parameters_path.display()))
    })?;
    let checksum = crc32fast::hash(&parameters);
    if checksum != metadata.parameters_checksum {
        return Err(TazabotError::configuration(format!(
            "checksum mismatch in {}: expected {:08x}, found {checksum:08x}",
            parameters_path.display(),
            metadata.parameters_checksum
        )));
    }

    let network: FeedForwardNetwork = bincode::deserialize(&parameters).map_err(|e| {
        TazabotError::configuration(format!(
            "corrupt parameters in {}: {e}",
            parameters_path.display()
        ))
    })?;
    if network.architecture() != &metadata.architecture {
        return Err(TazabotError::configuration(
            "parameter file does not match the recorded architecture",
        ));
    }

    let classifier = IntentClassifier::from_parts(
        metadata.vocabulary,
        metadata.labels,
        metadata.responses,
        network,
    )
    .map_err(|e| match e {
        TazabotError::Configuration(_) => e,
        other => TazabotError::configuration(other.to_string()),
    })?
    .with_threshold(metadata.confidence_threshold)
    .with_report(metadata.report);

    debug!(
        "Loaded snapshot {} from {}",
        metadata.snapshot_id,
        path.display()
    );
    Ok(classifier)
}

/// Read and check the metadata of a snapshot without loading parameters.
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<SnapshotMetadata> {
    let metadata_path = path.as_ref().join(METADATA_FILE);
    let content = fs::read_to_string(&metadata_path).map_err(|e| {
        TazabotError::configuration(format!("cannot read {}: {e}", metadata_path.display()))
    })?;
    let metadata: SnapshotMetadata = serde_json::from_str(&content).map_err(|e| {
        TazabotError::configuration(format!("malformed {}: {e}", metadata_path.display()))
    })?;
    if metadata.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(TazabotError::configuration(format!(
            "unsupported snapshot format version {} (expected {SNAPSHOT_FORMAT_VERSION})",
            metadata.format_version
        )));
    }
    Ok(metadata)
}

/// Whether `path` looks like a snapshot directory.
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    path.join(METADATA_FILE).is_file() && path.join(PARAMETERS_FILE).is_file()
}

fn split_target(target: &Path) -> Result<(PathBuf, String)> {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            TazabotError::invalid_argument(format!(
                "snapshot path {} has no directory name",
                target.display()
            ))
        })?;
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((parent, name))
}

fn write_files(dir: &Path, parameters: &[u8], metadata: &SnapshotMetadata) -> Result<()> {
    fs::create_dir(dir)?;
    fs::write(dir.join(PARAMETERS_FILE), parameters)?;
    fs::write(
        dir.join(METADATA_FILE),
        serde_json::to_string_pretty(metadata)?,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Corpus, IntentDefinition};
    use crate::ml::intent_classifier::TrainingConfig;
    use tempfile::TempDir;

    fn trained() -> IntentClassifier {
        let corpus = Corpus::new(vec![
            IntentDefinition::new(
                "saludos",
                vec!["hola".into(), "buenos dias".into()],
                vec!["¡Hola!".into()],
            ),
            IntentDefinition::new(
                "horario",
                vec!["a que hora abren".into(), "cual es el horario".into()],
                vec!["De 8 a 17".into()],
            ),
        ])
        .unwrap();
        let config = TrainingConfig {
            epochs: 20,
            seed: Some(7),
            ..Default::default()
        };
        IntentClassifier::train(&corpus, &config).unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot");
        let classifier = trained();

        let metadata = save(&classifier, &path).unwrap();
        assert!(exists(&path));
        assert_eq!(metadata.labels, *classifier.labels());

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.network(), classifier.network());
        assert_eq!(loaded.vocabulary(), classifier.vocabulary());
        let report = loaded.report().unwrap();
        assert_eq!(report.seed, 7);
        assert_eq!(report.examples, 4);
        assert_eq!(
            loaded.probabilities("hola"),
            classifier.probabilities("hola")
        );
    }

    #[test]
    fn test_save_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot");
        let first = save(&trained(), &path).unwrap();
        let second = save(&trained(), &path).unwrap();
        assert_ne!(first.snapshot_id, second.snapshot_id);
        assert_eq!(read_metadata(&path).unwrap().snapshot_id, second.snapshot_id);

        // No staging or retired directories are left behind.
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_missing_snapshot() {
        let dir = TempDir::new().unwrap();
        let err = load(dir.path().join("nothing")).unwrap_err();
        assert!(err.is_configuration());
        assert!(!exists(dir.path().join("nothing")));
    }

    #[test]
    fn test_corrupt_parameters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot");
        save(&trained(), &path).unwrap();

        let mut bytes = fs::read(path.join(PARAMETERS_FILE)).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(path.join(PARAMETERS_FILE), bytes).unwrap();

        assert!(load(&path).unwrap_err().is_configuration());
    }

    #[test]
    fn test_unsupported_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot");
        save(&trained(), &path).unwrap();

        let mut metadata = read_metadata(&path).unwrap();
        metadata.format_version = 99;
        fs::write(
            path.join(METADATA_FILE),
            serde_json::to_string(&metadata).unwrap(),
        )
        .unwrap();

        assert!(load(&path).unwrap_err().is_configuration());
    }

    #[test]
    fn test_vocabulary_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot");
        save(&trained(), &path).unwrap();

        let mut metadata = read_metadata(&path).unwrap();
        metadata.vocabulary = Vocabulary::build(["solo una palabra"]);
        fs::write(
            path.join(METADATA_FILE),
            serde_json::to_string(&metadata).unwrap(),
        )
        .unwrap();

        assert!(load(&path).unwrap_err().is_configuration());
    }
}
