//! Fuzzy item matcher.
//!
//! Each catalog item name is compared against the whole query with the
//! Ratcliff/Obershelp ratio after catalog normalization. Items scoring above
//! the minimum similarity are returned best first; equal scores keep catalog
//! order.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::analysis::normalize_for_catalog;
use crate::catalog::CatalogItem;
use crate::util::sequence_matcher::similarity_ratio;

/// Matching thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Items must score strictly above this ratio.
    pub min_similarity: f64,
    /// Maximum number of matches returned.
    pub max_matches: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            min_similarity: 0.6,
            max_matches: 3,
        }
    }
}

/// A catalog item together with its similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemMatch<'a> {
    pub item: &'a CatalogItem,
    pub score: f64,
}

/// Scores catalog items against a free-text query.
#[derive(Debug, Clone, Default)]
pub struct FuzzyItemMatcher {
    config: MatcherConfig,
}

impl FuzzyItemMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        FuzzyItemMatcher { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Similarity between a query and an item name, after normalization.
    pub fn score(&self, query: &str, name: &str) -> f64 {
        similarity_ratio(&normalize_for_catalog(query), &normalize_for_catalog(name))
    }

    /// Score every item in `catalog`, in catalog order.
    pub fn score_all<'a>(&self, query: &str, catalog: &'a [CatalogItem]) -> Vec<ItemMatch<'a>> {
        let query = normalize_for_catalog(query);
        catalog
            .iter()
            .map(|item| ItemMatch {
                item,
                score: similarity_ratio(&query, &normalize_for_catalog(&item.name)),
            })
            .collect()
    }

    /// Items scoring above the minimum similarity, best first, at most
    /// `max_matches` of them.
    pub fn find_matches<'a>(&self, query: &str, catalog: &'a [CatalogItem]) -> Vec<ItemMatch<'a>> {
        let mut matches: Vec<ItemMatch<'a>> = self
            .score_all(query, catalog)
            .into_iter()
            .filter(|m| m.score > self.config.min_similarity)
            .collect();

        // sort_by is stable, so catalog order survives among equal scores.
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(self.config.max_matches);

        trace!("{} catalog matches for {query:?}", matches.len());
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Vec<CatalogItem> {
        vec![
            CatalogItem::new(1, "Chilaquiles Rojos con Huevo", "", 95.0),
            CatalogItem::new(2, "Chilaquiles Verdes con Huevo", "", 95.0),
            CatalogItem::new(3, "Café de Olla", "", 35.0),
            CatalogItem::new(4, "Enchiladas Suizas", "", 110.0),
        ]
    }

    #[test]
    fn test_exact_name_scores_one() {
        let menu = menu();
        let matcher = FuzzyItemMatcher::default();
        let matches = matcher.find_matches("¿Chilaquiles rojos con huevo?", &menu);
        assert_eq!(matches[0].item.id, 1);
        assert_eq!(matches[0].score, 1.0);
        // The green variant is close enough to be listed too.
        assert_eq!(matches[1].item.id, 2);
        assert!(matches[1].score > 0.8 && matches[1].score < 1.0);
    }

    #[test]
    fn test_accents_are_ignored() {
        let menu = menu();
        let matcher = FuzzyItemMatcher::default();
        assert_eq!(matcher.score("cafe de olla", "Café de Olla"), 1.0);
        let matches = matcher.find_matches("cafe de olla", &menu);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].item.id, 3);
    }

    #[test]
    fn test_no_match_below_threshold() {
        let menu = menu();
        let matcher = FuzzyItemMatcher::default();
        assert!(matcher.find_matches("xyz", &menu).is_empty());
        assert!(matcher.find_matches("", &menu).is_empty());
        assert!(matcher.find_matches("hola", &[]).is_empty());
    }

    #[test]
    fn test_ties_keep_catalog_order_and_cap() {
        let menu = vec![
            CatalogItem::new(10, "Taco", "", 20.0),
            CatalogItem::new(11, "Taco", "", 20.0),
            CatalogItem::new(12, "Taco", "", 20.0),
            CatalogItem::new(13, "Taco", "", 20.0),
        ];
        let matcher = FuzzyItemMatcher::default();
        let ids: Vec<u64> = matcher
            .find_matches("taco", &menu)
            .iter()
            .map(|m| m.item.id)
            .collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[test]
    fn test_custom_config() {
        let menu = menu();
        let matcher = FuzzyItemMatcher::new(MatcherConfig {
            min_similarity: 0.0,
            max_matches: 10,
        });
        let matches = matcher.find_matches("chilaquiles", &menu);
        assert!(matches.len() >= 2);
        assert!(matches.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
