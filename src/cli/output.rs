//! Output formatting for CLI commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cli::args::{OutputFormat, TazabotArgs};
use crate::error::Result;
use crate::ml::TrainingReport;
use crate::resolution::Resolution;

/// Result structure for training.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingResult {
    pub model_dir: String,
    pub report: TrainingReport,
}

/// Result structure for a single prediction.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResult {
    pub text: String,
    pub intent: Option<String>,
    pub confidence: f32,
    pub threshold: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<(String, f32)>>,
}

/// One menu search hit.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub available: bool,
    pub score: f64,
}

/// Result structure for menu search.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResults {
    pub term: String,
    pub hits: Vec<SearchHit>,
    pub duration_ms: u64,
}

/// Summary of a snapshot's metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub snapshot_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub format_version: u32,
    pub layer_sizes: Vec<usize>,
    pub vocabulary_size: usize,
    pub intents: Vec<String>,
    pub confidence_threshold: f32,
    pub report: Option<TrainingReport>,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &TazabotArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output a chat reply: the bare text for humans, the full resolution as JSON.
pub fn output_resolution(resolution: &Resolution, args: &TazabotArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("[{}]", resolution.kind());
            }
            println!("{}", resolution.text());
            Ok(())
        }
        OutputFormat::Json => output_json(resolution, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &TazabotArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    print_human_value(&value, 0);
    Ok(())
}

fn print_human_value(value: &serde_json::Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                match val {
                    serde_json::Value::Object(_) => {
                        println!("{pad}{key}:");
                        print_human_value(val, indent + 1);
                    }
                    serde_json::Value::Array(arr) if arr.iter().any(|v| v.is_object()) => {
                        println!("{pad}{key}:");
                        for (i, item) in arr.iter().enumerate() {
                            println!("{pad}  [{}]", i + 1);
                            print_human_value(item, indent + 2);
                        }
                    }
                    _ => println!("{pad}{key}: {}", format_value(val)),
                }
            }
        }
        _ => println!("{pad}{}", format_value(value)),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &TazabotArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for human output.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "-".to_string(),
    }
}
