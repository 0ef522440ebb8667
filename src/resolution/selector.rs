//! Choice of one response among an intent's candidates.

use std::fmt::Debug;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

/// Picks one response from a non-empty candidate list.
pub trait ResponseSelector: Send + Sync + Debug {
    /// Select a response. Returns `None` only for an empty list.
    fn select<'a>(&self, responses: &'a [String]) -> Option<&'a str>;

    /// Get the name of this selector.
    fn name(&self) -> &'static str;
}

/// Uniformly random choice using the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl ResponseSelector for RandomSelector {
    fn select<'a>(&self, responses: &'a [String]) -> Option<&'a str> {
        responses.choose(&mut rand::rng()).map(String::as_str)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Uniformly random choice from a seeded generator, reproducible across runs.
#[derive(Debug)]
pub struct SeededSelector {
    rng: Mutex<StdRng>,
}

impl SeededSelector {
    pub fn new(seed: u64) -> Self {
        SeededSelector {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ResponseSelector for SeededSelector {
    fn select<'a>(&self, responses: &'a [String]) -> Option<&'a str> {
        let mut rng = self.rng.lock();
        responses.choose(&mut *rng).map(String::as_str)
    }

    fn name(&self) -> &'static str {
        "seeded"
    }
}

/// Always the first response.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSelector;

impl ResponseSelector for FirstSelector {
    fn select<'a>(&self, responses: &'a [String]) -> Option<&'a str> {
        responses.first().map(String::as_str)
    }

    fn name(&self) -> &'static str {
        "first"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responses() -> Vec<String> {
        vec!["uno".into(), "dos".into(), "tres".into()]
    }

    #[test]
    fn test_first_selector() {
        assert_eq!(FirstSelector.select(&responses()), Some("uno"));
        assert_eq!(FirstSelector.select(&[]), None);
    }

    #[test]
    fn test_random_selector_stays_in_range() {
        let responses = responses();
        for _ in 0..20 {
            let picked = RandomSelector.select(&responses).unwrap();
            assert!(responses.iter().any(|r| r == picked));
        }
        assert_eq!(RandomSelector.select(&[]), None);
    }

    #[test]
    fn test_seeded_selector_is_reproducible() {
        let responses = responses();
        let a = SeededSelector::new(9);
        let b = SeededSelector::new(9);
        let picks_a: Vec<&str> = (0..10).map(|_| a.select(&responses).unwrap()).collect();
        let picks_b: Vec<&str> = (0..10).map(|_| b.select(&responses).unwrap()).collect();
        assert_eq!(picks_a, picks_b);
        assert_eq!(a.name(), "seeded");
    }
}
