use std::fs;
use std::path::PathBuf;

use tazabot::corpus::Corpus;
use tazabot::error::Result;
use tazabot::ml::snapshot::{self, METADATA_FILE, PARAMETERS_FILE};
use tazabot::ml::{IntentClassifier, TrainingConfig};
use tempfile::TempDir;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn trained() -> Result<IntentClassifier> {
    let corpus = Corpus::from_file(data_path("intents.json"))?;
    let config = TrainingConfig {
        epochs: 30,
        seed: Some(5),
        ..Default::default()
    };
    IntentClassifier::train(&corpus, &config)
}

const HELD_OUT: [&str; 6] = [
    "hola buenos dias",
    "cuanto cuesta el cafe",
    "a que hora abren el sabado",
    "quiero pedir chilaquiles",
    "gracias amigo",
    "nada que ver",
];

#[test]
fn reloaded_snapshot_reproduces_predictions() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("model");
    let classifier = trained()?;

    let metadata = classifier.save(&path)?;
    assert_eq!(metadata.format_version, snapshot::SNAPSHOT_FORMAT_VERSION);
    assert!(path.join(PARAMETERS_FILE).is_file());
    assert!(path.join(METADATA_FILE).is_file());

    let loaded = IntentClassifier::load(&path)?;
    for text in HELD_OUT {
        assert_eq!(loaded.predict(text), classifier.predict(text), "{text}");
        assert_eq!(loaded.probabilities(text), classifier.probabilities(text));
    }
    Ok(())
}

#[test]
fn metadata_is_readable_json() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("model");
    let classifier = trained()?;
    classifier.save(&path)?;

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(path.join(METADATA_FILE))?)?;
    assert_eq!(raw["format_version"], 1);
    assert_eq!(
        raw["labels"][0].as_str(),
        classifier.labels().get(0)
    );
    assert_eq!(
        raw["vocabulary"].as_array().map(Vec::len),
        Some(classifier.vocabulary().len())
    );
    Ok(())
}

#[test]
fn partial_snapshot_fails_as_a_unit() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("model");
    trained()?.save(&path)?;

    fs::remove_file(path.join(PARAMETERS_FILE))?;
    assert!(!snapshot::exists(&path));
    let err = IntentClassifier::load(&path).unwrap_err();
    assert!(err.is_configuration());
    Ok(())
}

#[test]
fn truncated_parameters_are_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("model");
    trained()?.save(&path)?;

    let bytes = fs::read(path.join(PARAMETERS_FILE))?;
    fs::write(path.join(PARAMETERS_FILE), &bytes[..bytes.len() / 2])?;
    assert!(IntentClassifier::load(&path).unwrap_err().is_configuration());
    Ok(())
}
