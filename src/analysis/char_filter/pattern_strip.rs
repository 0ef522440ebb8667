use regex::Regex;

use super::CharFilter;
use crate::error::{Result, TazabotError};

/// A char filter that removes every substring matching a regex pattern.
#[derive(Clone, Debug)]
pub struct PatternStripCharFilter {
    pattern: Regex,
}

impl PatternStripCharFilter {
    /// Create a new pattern strip char filter.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)
                .map_err(|e| TazabotError::Anyhow(anyhow::Error::from(e)))?,
        })
    }

    /// Create a filter from an already compiled regex.
    pub fn from_regex(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl CharFilter for PatternStripCharFilter {
    fn filter(&self, input: &str) -> String {
        self.pattern.replace_all(input, "").into_owned()
    }

    fn name(&self) -> &'static str {
        "pattern_strip"
    }
}
