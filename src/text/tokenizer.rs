//! Korean tokenization and noun extraction.
//!
//! A [`MorphAnalyzer`] backend segments text in one of two ways:
//! - [`MorphAnalyzer::morphs`]: every morpheme, used for keyword trends
//! - [`MorphAnalyzer::nouns`]: nominal morphemes only, used for frequency
//!   tables, word clouds and the co-occurrence network
//!
//! [`Tokenizer`] pairs a backend with a [`TokenFilter`] (stop words and
//! minimum length) so callers never see unfiltered output.
//!
//! # Backends
//!
//! | Backend | Availability | Method |
//! |---------|--------------|--------|
//! | [`RuleAnalyzer`] | always | whitespace words, particle splitting |
//! | `LinderaAnalyzer` | `korean-dict` feature | ko-dic morphological analysis |

use crate::config::AnalysisConfig;
use crate::text::stopwords::StopwordFilter;
use clap::ValueEnum;
use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, info};

/// A morphological analyzer capable of both extraction modes.
///
/// Implementations must be deterministic: the same text always yields the
/// same sequence.
pub trait MorphAnalyzer {
    /// Short backend name for logs and reports.
    fn name(&self) -> &'static str;

    /// Segment text into all of its morphemes, in order.
    fn morphs(&self, text: &str) -> Vec<String>;

    /// Extract the nouns of the text, in order, duplicates included.
    fn nouns(&self, text: &str) -> Vec<String>;
}

/// Available analyzer backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AnalyzerKind {
    /// Dictionary-free rule based segmentation.
    #[default]
    Rule,
    /// ko-dic morphological analysis (requires the `korean-dict` feature).
    Lindera,
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("failed to load the morphological dictionary: {0}")]
    Dictionary(String),

    #[error("the `{0:?}` analyzer is not compiled in (enable the `korean-dict` feature)")]
    Unavailable(AnalyzerKind),
}

/// Construct the requested backend.
pub fn build_analyzer(kind: AnalyzerKind) -> Result<Box<dyn MorphAnalyzer>, AnalyzerError> {
    let analyzer: Box<dyn MorphAnalyzer> = match kind {
        AnalyzerKind::Rule => Box::new(RuleAnalyzer::new()),
        #[cfg(feature = "korean-dict")]
        AnalyzerKind::Lindera => Box::new(lindera_backend::LinderaAnalyzer::new()?),
        #[cfg(not(feature = "korean-dict"))]
        AnalyzerKind::Lindera => return Err(AnalyzerError::Unavailable(kind)),
    };
    info!(backend = analyzer.name(), "Morphological analyzer ready");
    Ok(analyzer)
}

/// Stop-word and length filtering applied to analyzer output.
#[derive(Debug, Clone)]
pub struct TokenFilter {
    stopwords: StopwordFilter,
    min_len: usize,
}

impl TokenFilter {
    pub fn new(stopwords: StopwordFilter, min_len: usize) -> Self {
        Self { stopwords, min_len }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        let stopwords = StopwordFilter::from_list(&config.stop_words);
        debug!(stop_words = stopwords.len(), min_len = config.min_token_len, "Token filter ready");
        Self::new(stopwords, config.min_token_len)
    }

    /// A noun qualifies when it is long enough (in characters) and not a stop word.
    pub fn qualifies(&self, token: &str) -> bool {
        token.chars().count() >= self.min_len && !self.stopwords.is_stopword(token)
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.is_stopword(token)
    }
}

/// An analyzer backend together with the filters every analysis applies.
pub struct Tokenizer<'a> {
    analyzer: &'a dyn MorphAnalyzer,
    filter: TokenFilter,
}

impl<'a> Tokenizer<'a> {
    pub fn new(analyzer: &'a dyn MorphAnalyzer, filter: TokenFilter) -> Self {
        Self { analyzer, filter }
    }

    /// All morphemes except stop words. No length filter is applied.
    pub fn morphemes(&self, text: &str) -> Vec<String> {
        self.analyzer
            .morphs(text)
            .into_iter()
            .filter(|m| !self.filter.is_stopword(m))
            .collect()
    }

    /// Qualifying nouns, duplicates included.
    pub fn nouns(&self, text: &str) -> Vec<String> {
        self.analyzer
            .nouns(text)
            .into_iter()
            .filter(|n| self.filter.qualifies(n))
            .collect()
    }

    /// Qualifying nouns with repeats removed, first occurrence kept.
    pub fn unique_nouns(&self, text: &str) -> Vec<String> {
        let nouns = self.nouns(text).into_iter().unique().collect::<Vec<_>>();
        debug!(count = nouns.len(), "Extracted unique nouns");
        nouns
    }

    pub fn backend(&self) -> &'static str {
        self.analyzer.name()
    }
}

/// Particles split off the end of a word, longest first so that `에게서`
/// wins over `서`-less `에게`.
const PARTICLES: [&str; 30] = [
    "에게서", "에게로", "으로서", "으로써", "이라는", "에서는", "에서도", "에게", "에서", "으로", "까지",
    "부터", "처럼", "보다", "이나", "이며", "라는", "와는", "과는", "은", "는", "이", "가", "을", "를",
    "에", "의", "도", "와", "과",
];

/// Word endings that mark a predicate rather than a noun.
const PREDICATE_ENDINGS: [&str; 38] = [
    "니다", "었다", "았다", "였다", "했다", "한다", "된다", "됐다", "있다", "없다", "이다", "하는", "하고",
    "하며", "해서", "하여", "되는", "되어", "했던", "하게", "하지", "하면", "되고", "되며", "되게", "했고",
    "으며", "으면", "면서", "지만", "는데", "라며", "라고", "다고", "르는", "르고", "르며", "르던",
];

/// Adnominal endings that never close a noun.
const ADNOMINAL_ENDINGS: [char; 2] = ['된', '던'];

/// Single-syllable verb endings: connective, adnominal or sentence-final.
const VERB_SUFFIXES: [char; 8] = ['고', '게', '지', '며', '면', '는', '던', '다'];

/// Final-consonant indices (ㄴ, ㅁ, ㅇ) that Sino-Korean nouns commonly end in.
const NOUN_FINALS: [u32; 3] = [4, 16, 21];

/// Dictionary-free Korean segmentation.
///
/// Splits on whitespace, then detaches a trailing particle when at least
/// two characters of stem remain. Words ending in a predicate ending are
/// excluded from noun output, as are words containing non-Hangul characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleAnalyzer;

impl RuleAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Split a word into stem and trailing particle.
    fn split_particle(word: &str) -> (&str, Option<&str>) {
        for particle in PARTICLES {
            if let Some(stem) = word.strip_suffix(particle) {
                if stem.chars().count() >= 2 {
                    return (stem, Some(particle));
                }
            }
        }
        (word, None)
    }

    fn is_predicate(word: &str) -> bool {
        PREDICATE_ENDINGS.iter().any(|ending| word.ends_with(ending))
    }

    /// Inflected verb or adjective forms the ending list misses.
    ///
    /// `공개된` and `먹던` end in an adnominal ending; `끌고`, `좋다` and
    /// `먹는` attach a verb suffix to a syllable whose final consonant is
    /// one a noun rarely ends in. `최고`, `광고` and `노래는` stay nouns.
    fn is_inflected(word: &str) -> bool {
        let mut rev = word.chars().rev();
        let (Some(last), Some(prev)) = (rev.next(), rev.next()) else {
            return false;
        };
        if ADNOMINAL_ENDINGS.contains(&last) {
            return true;
        }
        if word.chars().count() >= 3 && last == '한' {
            return true;
        }
        VERB_SUFFIXES.contains(&last)
            && final_consonant(prev).is_some_and(|jong| !NOUN_FINALS.contains(&jong))
    }

    fn is_hangul(word: &str) -> bool {
        word.chars().all(|c| ('가'..='힣').contains(&c))
    }
}

/// Final-consonant (jongseong) index of a Hangul syllable; `None` for open
/// syllables and non-Hangul characters.
fn final_consonant(c: char) -> Option<u32> {
    if !('가'..='힣').contains(&c) {
        return None;
    }
    match (c as u32 - '가' as u32) % 28 {
        0 => None,
        jong => Some(jong),
    }
}

impl MorphAnalyzer for RuleAnalyzer {
    fn name(&self) -> &'static str {
        "rule"
    }

    fn morphs(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        for word in text.split_whitespace() {
            if Self::is_predicate(word) {
                out.push(word.to_string());
                continue;
            }
            let (stem, particle) = Self::split_particle(word);
            out.push(stem.to_string());
            if let Some(p) = particle {
                out.push(p.to_string());
            }
        }
        out
    }

    fn nouns(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .filter(|word| !Self::is_predicate(word) && !Self::is_inflected(word))
            .map(|word| Self::split_particle(word).0)
            .filter(|stem| Self::is_hangul(stem))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(feature = "korean-dict")]
mod lindera_backend {
    use super::{AnalyzerError, MorphAnalyzer};
    use lindera::dictionary::load_dictionary;
    use lindera::mode::Mode;
    use lindera::segmenter::Segmenter;
    use lindera::tokenizer::Tokenizer as LinderaTokenizer;
    use tracing::warn;

    /// ko-dic part-of-speech tags treated as nouns: common, proper and
    /// dependent nouns, numerals and foreign (Latin) words.
    const NOUN_TAGS: &[&str] = &["NNG", "NNP", "NNB", "NR", "SL"];

    /// ko-dic backed analyzer.
    pub struct LinderaAnalyzer {
        tokenizer: LinderaTokenizer,
    }

    impl LinderaAnalyzer {
        pub fn new() -> Result<Self, AnalyzerError> {
            let dictionary =
                load_dictionary("embedded://ko-dic").map_err(|e| AnalyzerError::Dictionary(e.to_string()))?;
            let segmenter = Segmenter::new(Mode::Normal, dictionary, None);
            Ok(Self {
                tokenizer: LinderaTokenizer::new(segmenter),
            })
        }

        /// Surface forms paired with their leading POS tag.
        fn tagged(&self, text: &str) -> Vec<(String, String)> {
            match self.tokenizer.tokenize(text) {
                Ok(tokens) => tokens
                    .into_iter()
                    .map(|mut token| {
                        let surface = token.surface.as_ref().to_string();
                        let details = token.details();
                        let tag = details.first().map(|d| d.to_string()).unwrap_or_default();
                        (surface, tag)
                    })
                    .collect(),
                Err(e) => {
                    warn!(error = %e, "Morphological analysis failed; falling back to whitespace split");
                    text.split_whitespace()
                        .map(|w| (w.to_string(), "UNK".to_string()))
                        .collect()
                }
            }
        }
    }

    impl MorphAnalyzer for LinderaAnalyzer {
        fn name(&self) -> &'static str {
            "lindera-ko-dic"
        }

        fn morphs(&self, text: &str) -> Vec<String> {
            self.tagged(text).into_iter().map(|(surface, _)| surface).collect()
        }

        fn nouns(&self, text: &str) -> Vec<String> {
            self.tagged(text)
                .into_iter()
                .filter(|(_, tag)| NOUN_TAGS.iter().any(|t| tag.starts_with(t)))
                .map(|(surface, _)| surface)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_filter() -> TokenFilter {
        TokenFilter::from_config(&AnalysisConfig::default())
    }

    #[test]
    fn test_rule_morphs_split_particles() {
        let analyzer = RuleAnalyzer::new();
        assert_eq!(
            analyzer.morphs("케이팝이 한국의 문화를 알렸다"),
            vec!["케이팝", "이", "한국", "의", "문화", "를", "알렸다"]
        );
    }

    #[test]
    fn test_rule_keeps_short_stems_intact() {
        let analyzer = RuleAnalyzer::new();
        // Stripping would leave a one-character stem.
        assert_eq!(analyzer.morphs("아이 책을"), vec!["아이", "책을"]);
    }

    #[test]
    fn test_rule_nouns_skip_predicates_and_latin() {
        let analyzer = RuleAnalyzer::new();
        assert_eq!(
            analyzer.nouns("넷플릭스에서 공개된 애니메이션이 인기를 끌고 있다 Netflix 2025"),
            vec!["넷플릭스", "애니메이션", "인기"]
        );
        assert!(analyzer.nouns("합니다 입니다").is_empty());
    }

    #[test]
    fn test_rule_nouns_skip_inflected_forms() {
        let analyzer = RuleAnalyzer::new();
        assert!(analyzer.nouns("부르는 먹는 좋다 공개한 먹던 있으며").is_empty());
        // Open or nasal final syllables before the suffix read as nouns.
        assert_eq!(
            analyzer.nouns("최고 광고 노래는 케이팝은 참고 바다"),
            vec!["최고", "광고", "노래", "케이팝", "참고", "바다"]
        );
    }

    #[test]
    fn test_tokenizer_noun_filtering() {
        let analyzer = RuleAnalyzer::new();
        let tokenizer = Tokenizer::new(&analyzer, default_filter());
        // "예정" is a stop word, "곡" is too short
        assert_eq!(
            tokenizer.nouns("신곡 예정 곡 노래 노래"),
            vec!["신곡", "노래", "노래"]
        );
        assert_eq!(tokenizer.unique_nouns("신곡 예정 곡 노래 노래"), vec!["신곡", "노래"]);
    }

    #[test]
    fn test_tokenizer_morphemes_drop_only_stopwords() {
        let analyzer = RuleAnalyzer::new();
        let tokenizer = Tokenizer::new(&analyzer, default_filter());
        assert_eq!(tokenizer.morphemes("한국의 노래 곡"), vec!["한국", "노래", "곡"]);
    }

    #[test]
    fn test_tokenizer_is_deterministic() {
        let analyzer = RuleAnalyzer::new();
        let tokenizer = Tokenizer::new(&analyzer, default_filter());
        let text = "케이팝 데몬 헌터스가 빌보드에서 인기를 얻었다 케이팝 팬덤";
        assert_eq!(tokenizer.nouns(text), tokenizer.nouns(text));
        assert_eq!(tokenizer.morphemes(text), tokenizer.morphemes(text));
    }

    #[test]
    fn test_filter_counts_characters_not_bytes() {
        let filter = TokenFilter::new(StopwordFilter::default(), 2);
        // One Hangul syllable is three UTF-8 bytes.
        assert!(!filter.qualifies("곡"));
        assert!(filter.qualifies("신곡"));
    }

    #[test]
    fn test_build_rule_analyzer() {
        let analyzer = build_analyzer(AnalyzerKind::Rule).unwrap();
        assert_eq!(analyzer.name(), "rule");
    }

    #[cfg(not(feature = "korean-dict"))]
    #[test]
    fn test_lindera_unavailable_without_feature() {
        assert!(matches!(
            build_analyzer(AnalyzerKind::Lindera),
            Err(AnalyzerError::Unavailable(AnalyzerKind::Lindera))
        ));
    }
}
