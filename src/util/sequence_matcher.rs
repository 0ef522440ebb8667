//! Ratcliff/Obershelp sequence similarity.
//!
//! [`SequenceMatcher`] finds the longest contiguous matching block between
//! two strings, then recurses on the pieces to the left and right of it. The
//! similarity ratio is `2 * M / T` where `M` is the total size of the matching
//! blocks and `T` the combined length of both strings. Strings are compared
//! by Unicode scalar value.
//!
//! ```
//! use tazabot::util::sequence_matcher::similarity_ratio;
//!
//! assert_eq!(similarity_ratio("abcd", "abcd"), 1.0);
//! assert_eq!(similarity_ratio("abcd", "bcde"), 0.75);
//! ```

use std::collections::HashMap;

/// Sequences at least this long get their most frequent elements ignored
/// when seeding matches.
const AUTOJUNK_MIN_LEN: usize = 200;

/// A matching block: `a[a..a + size] == b[b..b + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

/// Compares two strings by their longest common contiguous blocks.
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    b2j: HashMap<char, Vec<usize>>,
}

impl SequenceMatcher {
    pub fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        // Drop "popular" characters from long sequences.
        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let limit = n / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }

        SequenceMatcher { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Among equally long blocks, the one starting earliest in `a` wins, and
    /// of those the one starting earliest in `b`.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);

        // j2len[j] = length of the longest match ending at a[i - 1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = next;
        }

        // Popular characters were never seeded; grow the match over them.
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        Match {
            a: besti,
            b: bestj,
            size: bestsize,
        }
    }

    /// All matching blocks in increasing order, adjacent blocks merged.
    ///
    /// The last element is always the sentinel `Match { a: len(a), b: len(b), size: 0 }`.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
            blocks.push(m);
        }
        blocks.sort_by_key(|m| (m.a, m.b));

        let mut merged: Vec<Match> = Vec::with_capacity(blocks.len() + 1);
        for block in blocks {
            match merged.last_mut() {
                Some(last) if last.a + last.size == block.a && last.b + last.size == block.b => {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        merged.push(Match {
            a: la,
            b: lb,
            size: 0,
        });
        merged
    }

    /// Similarity in `[0, 1]`. Two empty strings are identical.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matches: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        2.0 * matches as f64 / total as f64
    }
}

/// Similarity ratio of two strings.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    SequenceMatcher::new(a, b).ratio()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_and_empty() {
        assert_eq!(similarity_ratio("chilaquiles", "chilaquiles"), 1.0);
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_known_ratios() {
        // difflib: SequenceMatcher(None, "abcd", "bcde").ratio() == 0.75
        assert_eq!(similarity_ratio("abcd", "bcde"), 0.75);
        // Two blocks: "ab" and "d"
        assert!((similarity_ratio("abxd", "abd") - 6.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_longest_match_prefers_earliest() {
        let matcher = SequenceMatcher::new(" abcd", "abcd abcd");
        let m = matcher.find_longest_match(0, 5, 0, 9);
        assert_eq!(m, Match { a: 0, b: 4, size: 5 });

        let matcher = SequenceMatcher::new("ab", "abab");
        assert_eq!(matcher.find_longest_match(0, 2, 0, 4), Match { a: 0, b: 0, size: 2 });
    }

    #[test]
    fn test_matching_blocks() {
        let matcher = SequenceMatcher::new("abxcd", "abcd");
        let blocks = matcher.matching_blocks();
        assert_eq!(
            blocks,
            vec![
                Match { a: 0, b: 0, size: 2 },
                Match { a: 3, b: 2, size: 2 },
                Match { a: 5, b: 4, size: 0 },
            ]
        );
    }

    #[test]
    fn test_multibyte_characters() {
        assert_eq!(similarity_ratio("café", "cafe"), 0.75);
        assert_eq!(similarity_ratio("ñ", "ñ"), 1.0);
    }

    #[test]
    fn test_long_sequences_use_autojunk() {
        let long = "a".repeat(250);
        // Every character of `long` is popular; the match is grown afterwards.
        let ratio = similarity_ratio(&long, &long);
        assert_eq!(ratio, 1.0);
    }
}
