//! Shared utility modules used across Tazabot components.

pub mod sequence_matcher;
