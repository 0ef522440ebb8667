//! Command implementations for the Tazabot CLI.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::info;

use crate::catalog::{Catalog, CatalogItem};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::corpus::Corpus;
use crate::engine::{EngineConfig, IntentEngine, Readiness};
use crate::error::{Result, TazabotError};
use crate::matching::FuzzyItemMatcher;
use crate::ml::snapshot;
use crate::resolution::SeededSelector;

/// Words that end an interactive chat session.
const EXIT_WORDS: [&str; 3] = ["salir", "exit", "quit"];

/// Execute a CLI command.
pub fn execute_command(args: TazabotArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    match &args.command {
        Command::Train(train_args) => train(train_args, config, &args),
        Command::Predict(predict_args) => predict(predict_args, config, &args),
        Command::Chat(chat_args) => chat(chat_args, config, &args),
        Command::Search(search_args) => search(search_args, config, &args),
        Command::Inspect(inspect_args) => inspect(inspect_args, config, &args),
        Command::Menu(menu_args) => menu(menu_args, config, &args),
    }
}

/// Load the engine configuration, or the defaults when no file was given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            EngineConfig::from_file(path)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn or_config(value: &Option<PathBuf>, fallback: &Path) -> PathBuf {
    value.clone().unwrap_or_else(|| fallback.to_path_buf())
}

/// Train the classifier and persist a snapshot.
fn train(args: &TrainArgs, config: EngineConfig, cli_args: &TazabotArgs) -> Result<()> {
    let corpus_path = or_config(&args.corpus, &config.corpus_path);
    let model_dir = or_config(&args.model_dir, &config.snapshot_dir);

    let mut training = config.training.clone();
    if let Some(epochs) = args.epochs {
        training.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        training.batch_size = batch_size;
    }
    if let Some(learning_rate) = args.learning_rate {
        training.learning_rate = learning_rate;
    }
    if args.seed.is_some() {
        training.seed = args.seed;
    }

    if cli_args.verbosity() > 0 {
        println!("Training on corpus: {}", corpus_path.display());
    }
    let corpus = Corpus::from_file(&corpus_path)?;
    let engine = IntentEngine::new(config);
    let report = engine.train_and_persist(&corpus, &training, &model_dir)?;

    output_result(
        "Model trained and saved",
        &TrainingResult {
            model_dir: model_dir.to_string_lossy().to_string(),
            report,
        },
        cli_args,
    )
}

/// Classify one message with a saved snapshot.
fn predict(args: &PredictArgs, config: EngineConfig, cli_args: &TazabotArgs) -> Result<()> {
    let model_dir = or_config(&args.model_dir, &config.snapshot_dir);
    let engine = IntentEngine::new(config);
    if let Readiness::NotReady { reason } = engine.load_snapshot(&model_dir) {
        return Err(TazabotError::inference_unavailable(reason));
    }
    let classifier = engine
        .classifier()
        .ok_or_else(|| TazabotError::inference_unavailable("snapshot was not installed"))?;

    let threshold = args.threshold.unwrap_or_else(|| classifier.threshold());
    let prediction = classifier.predict_with_threshold(&args.text, threshold);
    let probabilities: Option<Vec<(String, f32)>> = args.all.then(|| {
        classifier
            .labels()
            .iter()
            .map(str::to_string)
            .zip(classifier.probabilities(&args.text))
            .collect()
    });

    output_result(
        "Prediction",
        &PredictionResult {
            text: args.text.clone(),
            intent: prediction.intent,
            confidence: prediction.confidence,
            threshold,
            probabilities,
        },
        cli_args,
    )
}

/// Answer one message, or every line read from stdin.
fn chat(args: &ChatArgs, mut config: EngineConfig, cli_args: &TazabotArgs) -> Result<()> {
    if let Some(model_dir) = &args.model_dir {
        config.snapshot_dir = model_dir.clone();
    }
    if let Some(menu) = &args.menu {
        config.menu_path = menu.clone();
    }

    let mut engine = IntentEngine::open(config);
    if let Some(seed) = args.seed {
        engine = engine.with_selector(Arc::new(SeededSelector::new(seed)));
    }
    if !engine.is_ready() && cli_args.verbosity() > 0 {
        eprintln!("Classifier unavailable, answering in pattern-only mode");
    }

    if let Some(message) = &args.message {
        return output_resolution(&engine.resolve_detailed(message), cli_args);
    }

    let interactive = cli_args.output_format == OutputFormat::Human && cli_args.verbosity() > 0;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        if interactive {
            print!("> ");
            stdout.flush()?;
        }
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if EXIT_WORDS.contains(&message.to_lowercase().as_str()) {
            break;
        }
        output_resolution(&engine.resolve_detailed(message), cli_args)?;
    }
    Ok(())
}

/// Fuzzy search the menu.
fn search(args: &SearchArgs, config: EngineConfig, cli_args: &TazabotArgs) -> Result<()> {
    if args.term.trim().is_empty() {
        return Err(TazabotError::invalid_argument("search term cannot be empty"));
    }
    let menu_path = or_config(&args.menu, &config.menu_path);
    let catalog = Catalog::from_file(&menu_path)?;
    let matcher = FuzzyItemMatcher::new(config.matcher);

    let start_time = Instant::now();
    let hits = matcher
        .find_matches(&args.term, catalog.items())
        .into_iter()
        .map(|m| SearchHit {
            id: m.item.id,
            name: m.item.name.clone(),
            price: m.item.price,
            available: m.item.available,
            score: m.score,
        })
        .collect();
    let duration = start_time.elapsed();

    output_result(
        "Search results",
        &SearchResults {
            term: args.term.clone(),
            hits,
            duration_ms: duration.as_millis() as u64,
        },
        cli_args,
    )
}

/// Show snapshot metadata without loading the parameters.
fn inspect(args: &InspectArgs, config: EngineConfig, cli_args: &TazabotArgs) -> Result<()> {
    let model_dir = or_config(&args.model_dir, &config.snapshot_dir);
    let metadata = snapshot::read_metadata(&model_dir)?;

    output_result(
        &format!("Snapshot at {}", model_dir.display()),
        &SnapshotSummary {
            snapshot_id: metadata.snapshot_id,
            created_at: metadata.created_at,
            format_version: metadata.format_version,
            layer_sizes: metadata.architecture.layer_sizes(),
            vocabulary_size: metadata.vocabulary.len(),
            intents: metadata.labels.iter().map(str::to_string).collect(),
            confidence_threshold: metadata.confidence_threshold,
            report: metadata.report,
        },
        cli_args,
    )
}

/// List menu items or statistics.
fn menu(args: &MenuArgs, config: EngineConfig, cli_args: &TazabotArgs) -> Result<()> {
    let menu_path = or_config(&args.menu, &config.menu_path);
    let catalog = Catalog::from_file(&menu_path)?;

    if args.stats {
        return output_result("Menu statistics", &catalog.stats(), cli_args);
    }

    let items: Vec<&CatalogItem> = if args.available {
        catalog.available().collect()
    } else {
        catalog.items().iter().collect()
    };
    match cli_args.output_format {
        OutputFormat::Json => output_result("Menu", &items, cli_args),
        OutputFormat::Human => {
            for item in items {
                println!("{}", item.detail_card());
            }
            Ok(())
        }
    }
}
