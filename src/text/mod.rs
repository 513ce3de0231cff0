//! Text processing: normalization, stop words and tokenization.

pub mod normalize;
pub mod stopwords;
pub mod tokenizer;

pub use normalize::{normalize, normalize_hangul};
pub use stopwords::StopwordFilter;
pub use tokenizer::{build_analyzer, AnalyzerKind, MorphAnalyzer, RuleAnalyzer, TokenFilter, Tokenizer};
