//! Corpus-level aggregations: token frequencies, keyword trends and
//! article counts over time.

pub mod frequency;
pub mod timeseries;

pub use frequency::{keyword_trend, FrequencyTable, KeywordCount, OrderedCounter, TrendPoint};
pub use timeseries::{daily_counts, group_by_week, summarize, week_label, CorpusSummary, DailyCount, ReleasePhase};
