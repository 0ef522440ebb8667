use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use tazabot::catalog::{Catalog, CatalogItem};
use tazabot::corpus::Corpus;
use tazabot::engine::{EngineConfig, IntentEngine, Readiness};
use tazabot::error::Result;
use tazabot::ml::TrainingConfig;
use tazabot::resolution::{ArbiterConfig, FirstSelector, Resolution};
use tempfile::TempDir;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn training_config() -> TrainingConfig {
    TrainingConfig {
        epochs: 200,
        batch_size: 8,
        learning_rate: 0.005,
        seed: Some(42),
    }
}

fn trained_engine(dir: &TempDir) -> Result<IntentEngine> {
    let engine = IntentEngine::new(EngineConfig::default()).with_selector(Arc::new(FirstSelector));
    engine.set_catalog(Catalog::from_file(data_path("menu.json"))?);
    let corpus = Corpus::from_file(data_path("intents.json"))?;
    engine.train_and_persist(&corpus, &training_config(), dir.path().join("model"))?;
    Ok(engine)
}

#[test]
fn greeting_resolves_to_greeting_response() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = trained_engine(&dir)?;

    match engine.resolve_detailed("Hola!") {
        Resolution::Intent {
            intent,
            confidence,
            text,
        } => {
            assert_eq!(intent, "saludos");
            assert!(confidence > 0.30);
            assert_eq!(text, "¡Hola! Bienvenido a La Taza Loca ☕ ¿En qué te puedo ayudar?");
        }
        other => panic!("expected a greeting, got {other:?}"),
    }
    Ok(())
}

#[test]
fn exact_dish_name_returns_detail_card() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = trained_engine(&dir)?;

    let resolution = engine.resolve_detailed("chilaquiles rojos con huevo");
    match &resolution {
        Resolution::ItemDetail { item_id, score, .. } => {
            assert_eq!(*item_id, 1);
            assert_eq!(*score, 1.0);
        }
        other => panic!("expected a detail card, got {other:?}"),
    }
    let text = resolution.text();
    assert!(text.starts_with("\n🍽️ **Chilaquiles Rojos con Huevo**\n"));
    assert!(text.contains("💰 Precio: $95 pesos"));
    assert!(text.contains("📦 Estado: ✓ Disponible"));
    assert!(text.contains("⭐ ¡Más vendido!"));
    Ok(())
}

#[test]
fn gibberish_returns_default_reply() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = trained_engine(&dir)?;

    let prediction = engine.predict("xkcd qwerty zzz")?;
    assert!(prediction.intent.is_none());
    assert!(prediction.confidence < 0.30);

    let resolution = engine.resolve_detailed("xkcd qwerty zzz");
    assert!(resolution.is_fallback());
    assert_eq!(resolution.text(), ArbiterConfig::default().fallback_text());
    assert!(resolution.text().contains("📲 WhatsApp: **664-563-16-75**"));
    Ok(())
}

#[test]
fn dish_name_outranks_intent() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = trained_engine(&dir)?;
    assert_eq!(engine.predict("hola")?.intent.as_deref(), Some("saludos"));

    engine.set_catalog(Catalog::new(vec![CatalogItem::new(
        99,
        "Hola",
        "Platillo de la casa",
        50.0,
    )]));
    let resolution = engine.resolve_detailed("¡Hola!");
    assert!(matches!(resolution, Resolution::ItemDetail { item_id: 99, .. }));
    Ok(())
}

#[test]
fn training_phrases_classify_to_their_intent() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = trained_engine(&dir)?;
    let corpus = Corpus::from_file(data_path("intents.json"))?;

    for example in corpus.examples() {
        let prediction = engine.predict(&example.phrase)?;
        assert_eq!(
            prediction.intent.as_deref(),
            Some(example.intent_tag.as_str()),
            "{:?} classified with confidence {}",
            example.phrase,
            prediction.confidence
        );
    }
    Ok(())
}

#[test]
fn pattern_only_mode_after_failed_load() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = IntentEngine::new(EngineConfig::default());
    engine.set_catalog(Catalog::from_file(data_path("menu.json"))?);

    let readiness = engine.load_snapshot(dir.path().join("missing"));
    assert!(matches!(readiness, Readiness::NotReady { .. }));
    assert!(engine.predict("hola").is_err());

    // Catalog tiers keep working without a classifier.
    assert_eq!(engine.resolve_detailed("pozole rojo").kind(), "item_detail");
    assert_eq!(engine.resolve_detailed("chilaquiles rojos").kind(), "item_list");
    assert!(engine.resolve_detailed("hola").is_fallback());
    Ok(())
}

#[test]
fn concurrent_resolution_during_reload() -> Result<()> {
    let dir = TempDir::new()?;
    let engine = Arc::new(trained_engine(&dir)?);
    let model_dir = dir.path().join("model");

    let mut handles = Vec::new();
    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                assert_eq!(
                    engine.resolve_detailed("chilaquiles rojos con huevo").kind(),
                    "item_detail"
                );
                assert_eq!(
                    engine.resolve_detailed("hola").kind(),
                    "intent"
                );
            }
        }));
    }

    for _ in 0..5 {
        assert_eq!(engine.load_snapshot(&model_dir), Readiness::Ready);
    }

    for handle in handles {
        handle.join().expect("resolver thread panicked");
    }
    Ok(())
}
