//! Accent folding char filter.

use super::CharFilter;

/// Lower-case accented vowels and n-with-tilde, folded to plain ASCII.
///
/// Upper-case forms are intentionally absent: the normalizer lower-cases the
/// text before folding.
pub const DEFAULT_FOLDING_TABLE: &[(char, char)] = &[
    ('á', 'a'),
    ('é', 'e'),
    ('í', 'i'),
    ('ó', 'o'),
    ('ú', 'u'),
    ('ü', 'u'),
    ('ñ', 'n'),
];

/// A char filter that replaces characters using an explicit substitution table.
///
/// Characters not present in the table pass through unchanged.
#[derive(Clone, Debug)]
pub struct AccentFoldingCharFilter {
    table: Vec<(char, char)>,
}

impl AccentFoldingCharFilter {
    /// Create a filter with the default Spanish folding table.
    pub fn new() -> Self {
        Self::with_table(DEFAULT_FOLDING_TABLE)
    }

    /// Create a filter with a custom substitution table.
    pub fn with_table(table: &[(char, char)]) -> Self {
        AccentFoldingCharFilter {
            table: table.to_vec(),
        }
    }

    fn fold(&self, c: char) -> char {
        self.table
            .iter()
            .find(|(from, _)| *from == c)
            .map(|(_, to)| *to)
            .unwrap_or(c)
    }
}

impl Default for AccentFoldingCharFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl CharFilter for AccentFoldingCharFilter {
    fn filter(&self, input: &str) -> String {
        input.chars().map(|c| self.fold(c)).collect()
    }

    fn name(&self) -> &'static str {
        "accent_folding"
    }
}
