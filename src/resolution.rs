//! Per-message arbitration between catalog lookups, intent classification
//! and the default reply.

pub mod arbiter;
pub mod selector;

pub use arbiter::{ArbiterConfig, Resolution, ResolutionArbiter};
pub use selector::{FirstSelector, RandomSelector, ResponseSelector, SeededSelector};
