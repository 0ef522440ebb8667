//! Error types for the Tazabot library.
//!
//! All fallible operations return [`TazabotError`] through the crate-wide
//! [`Result`] alias. The variants follow the failure kinds the engine surfaces
//! to its callers:
//!
//! - [`TazabotError::Configuration`]: a corpus, menu, config or snapshot file is
//!   missing, unreadable or inconsistent. Callers fall back to pattern-only mode.
//! - [`TazabotError::InferenceUnavailable`]: prediction was requested while no
//!   model is loaded.
//! - [`TazabotError::TrainingInProgress`]: a second training run was started
//!   while one was already running.
//!
//! A low-confidence prediction is not an error; it is reported as a prediction
//! without an intent.
//!
//! # Examples
//!
//! ```
//! use tazabot::error::{Result, TazabotError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(TazabotError::invalid_argument("batch size must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Tazabot operations.
#[derive(Error, Debug)]
pub enum TazabotError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Missing, unreadable or inconsistent corpus, catalog, config or snapshot
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Prediction requested before a model was trained or loaded
    #[error("Inference unavailable: {0}")]
    InferenceUnavailable(String),

    /// A training run is already in progress
    #[error("Training in progress: {0}")]
    TrainingInProgress(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Binary serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with TazabotError.
pub type Result<T> = std::result::Result<T, TazabotError>;

impl TazabotError {
    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        TazabotError::Configuration(msg.into())
    }

    /// Create a new inference unavailable error.
    pub fn inference_unavailable<S: Into<String>>(msg: S) -> Self {
        TazabotError::InferenceUnavailable(msg.into())
    }

    /// Create a new training in progress error.
    pub fn training_in_progress<S: Into<String>>(msg: S) -> Self {
        TazabotError::TrainingInProgress(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        TazabotError::InvalidArgument(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        TazabotError::Serialization(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TazabotError::Other(msg.into())
    }

    /// Whether the caller should degrade to pattern-only mode rather than fail.
    pub fn is_configuration(&self) -> bool {
        matches!(self, TazabotError::Configuration(_))
    }
}

impl From<bincode::Error> for TazabotError {
    fn from(err: bincode::Error) -> Self {
        TazabotError::Serialization(err.to_string())
    }
}
