//! Token frequency counting and ranking.
//!
//! Counts keep first-seen order so that ranking ties resolve to the token
//! that appeared first, which keeps reports stable between runs.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::hash::Hash;

/// A counter that remembers the order in which keys were first seen.
#[derive(Debug, Clone)]
pub struct OrderedCounter<K> {
    index: FxHashMap<K, usize>,
    entries: Vec<(K, usize)>,
}

impl<K> Default for OrderedCounter<K> {
    fn default() -> Self {
        Self {
            index: FxHashMap::default(),
            entries: Vec::new(),
        }
    }
}

impl<K: Hash + Eq + Clone> OrderedCounter<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count of `key` by one.
    pub fn add(&mut self, key: K) {
        self.add_by(key, 1);
    }

    /// Increment the count of `key` by `n`.
    pub fn add_by(&mut self, key: K, n: usize) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 += n,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, n));
            }
        }
    }

    /// Count for `key`, zero when never seen.
    pub fn get(&self, key: &K) -> usize {
        self.index.get(key).map(|&pos| self.entries[pos].1).unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(k, n)| (k, *n))
    }

    /// The `k` most frequent entries, count descending, ties in first-seen order.
    pub fn most_common(&self, k: usize) -> Vec<(K, usize)> {
        let mut ranked: Vec<(K, usize)> = self.entries.clone();
        // sort_by is stable, which preserves first-seen order among equal counts
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(k);
        ranked
    }
}

/// A token frequency table for one corpus slice.
pub type FrequencyTable = OrderedCounter<String>;

impl FrequencyTable {
    /// Count every token of the sequence.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for token in tokens {
            table.add(token.into());
        }
        table
    }

    /// Count for a token given as `&str`.
    pub fn count(&self, token: &str) -> usize {
        self.index.get(token).map(|&pos| self.entries[pos].1).unwrap_or(0)
    }

    /// The `k` most frequent tokens as report rows.
    pub fn top_k(&self, k: usize) -> Vec<KeywordCount> {
        self.most_common(k)
            .into_iter()
            .map(|(keyword, count)| KeywordCount { keyword, count })
            .collect()
    }
}

/// One row of a ranked frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// The count of one target keyword within one time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub bucket: String,
    pub keyword: String,
    pub count: usize,
}

/// Evaluate the same keyword list against each bucket's frequency table.
///
/// Produces `buckets × targets` points, bucket-major, with keywords the
/// bucket never mentions counted as zero.
pub fn keyword_trend<S: AsRef<str>>(buckets: &[(String, FrequencyTable)], targets: &[S]) -> Vec<TrendPoint> {
    buckets
        .iter()
        .flat_map(|(bucket, table)| {
            targets.iter().map(move |keyword| TrendPoint {
                bucket: bucket.clone(),
                keyword: keyword.as_ref().to_string(),
                count: table.count(keyword.as_ref()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_top_one() {
        let table = FrequencyTable::from_tokens(["a", "a", "b", "c", "c", "c"]);
        assert_eq!(table.count("a"), 2);
        assert_eq!(table.count("b"), 1);
        assert_eq!(table.count("c"), 3);
        assert_eq!(table.len(), 3);
        assert_eq!(table.total(), 6);
        assert_eq!(
            table.top_k(1),
            vec![KeywordCount {
                keyword: "c".to_string(),
                count: 3
            }]
        );
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let table = FrequencyTable::from_tokens(["한국", "노래", "문화", "노래", "한국", "문화"]);
        let ranked: Vec<String> = table.top_k(3).into_iter().map(|r| r.keyword).collect();
        assert_eq!(ranked, vec!["한국", "노래", "문화"]);
    }

    #[test]
    fn test_top_k_larger_than_table() {
        let table = FrequencyTable::from_tokens(["노래"]);
        assert_eq!(table.top_k(20).len(), 1);
        assert!(FrequencyTable::new().top_k(5).is_empty());
    }

    #[test]
    fn test_missing_token_counts_zero() {
        let table = FrequencyTable::from_tokens(["노래"]);
        assert_eq!(table.count("한국"), 0);
    }

    #[test]
    fn test_keyword_trend_defaults_to_zero() {
        let buckets = vec![
            ("06월 1주차".to_string(), FrequencyTable::from_tokens(["노래", "노래", "한국"])),
            ("06월 2주차".to_string(), FrequencyTable::from_tokens(["인기"])),
        ];
        let trend = keyword_trend(&buckets, &["노래", "인기"]);

        assert_eq!(trend.len(), 4);
        assert_eq!(trend[0].bucket, "06월 1주차");
        assert_eq!(trend[0].count, 2);
        assert_eq!(trend[1].keyword, "인기");
        assert_eq!(trend[1].count, 0);
        assert_eq!(trend[2].count, 0);
        assert_eq!(trend[3].count, 1);
    }

    #[test]
    fn test_keyword_trend_single_bucket_no_hits() {
        let buckets = vec![("07월 1주차".to_string(), FrequencyTable::new())];
        let trend = keyword_trend(&buckets, &["케데헌 효과"]);
        assert_eq!(
            trend,
            vec![TrendPoint {
                bucket: "07월 1주차".to_string(),
                keyword: "케데헌 효과".to_string(),
                count: 0
            }]
        );
    }
}
