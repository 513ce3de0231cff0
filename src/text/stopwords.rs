//! Stop-word filtering
//!
//! Korean particles and boilerplate predicates that carry no topical meaning
//! are removed before counting. The list is configurable; the default comes
//! from [`crate::config::DEFAULT_STOP_WORDS`].

use rustc_hash::FxHashSet;

/// A filter for removing stop words from a token stream
#[derive(Debug, Clone, Default)]
pub struct StopwordFilter {
    stopwords: FxHashSet<String>,
}

impl StopwordFilter {
    /// Create a filter from a list of words; blank entries are ignored
    pub fn from_list<S: AsRef<str>>(words: &[S]) -> Self {
        let stopwords = words
            .iter()
            .map(|w| w.as_ref().trim())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self { stopwords }
    }

    /// Check if a token is a stop word
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }
}
