//! # Tazabot
//!
//! Intent resolution engine for a restaurant chatbot.
//!
//! A message is answered by the first of four tiers that applies: a detail
//! card for a dish the message names, a response for a confidently
//! recognised conversational intent, a list of loosely matching dishes, or
//! a fixed default reply.
//!
//! ## Features
//!
//! - Pure Rust feed-forward intent classifier over bag-of-words vectors
//! - Ratcliff/Obershelp fuzzy matching of dish names
//! - Versioned, checksummed model snapshots
//! - Lock-free concurrent inference with atomic model swap
//!
//! ## Example
//!
//! ```
//! use tazabot::catalog::{Catalog, CatalogItem};
//! use tazabot::engine::{EngineConfig, IntentEngine};
//!
//! let engine = IntentEngine::new(EngineConfig::default());
//! engine.set_catalog(Catalog::new(vec![CatalogItem::new(
//!     1,
//!     "Chilaquiles Rojos con Huevo",
//!     "Totopos bañados en salsa roja",
//!     95.0,
//! )]));
//!
//! let reply = engine.resolve("Chilaquiles rojos con huevo");
//! assert!(reply.contains("💰 Precio: $95 pesos"));
//! ```

pub mod analysis;
pub mod catalog;
pub mod cli;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod matching;
pub mod ml;
pub mod resolution;
pub mod util;

pub mod prelude {
    pub use crate::catalog::{Catalog, CatalogItem};
    pub use crate::corpus::{Corpus, IntentDefinition, TrainingExample};
    pub use crate::engine::{EngineConfig, IntentEngine, Readiness};
    pub use crate::error::{Result, TazabotError};
    pub use crate::ml::{IntentClassifier, IntentPrediction, TrainingConfig, TrainingReport};
    pub use crate::resolution::{Resolution, ResolutionArbiter};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
