//! The text-to-network pipeline.
//!
//! [`compute`] turns a corpus and an [`AnalysisConfig`] into an
//! [`AnalysisResult`], running only the enabled sections:
//!
//! 1. **Timeseries**: articles per day, tagged with a release phase
//! 2. **Trend**: target keyword counts per week bucket (all morphemes)
//! 3. **Frequency** / **Word cloud**: noun counts over every title and description
//! 4. **Network**: per-description noun sets → co-occurrence graph → centrality
//!
//! Every call recomputes from scratch; nothing is retained between calls.

use crate::analysis::{
    daily_counts, group_by_week, keyword_trend, summarize, CorpusSummary, DailyCount, FrequencyTable, KeywordCount,
    TrendPoint,
};
use crate::config::{AnalysisConfig, Section};
use crate::corpus::{Corpus, CorpusSource};
use crate::graph::{build_network, compute_centrality, Centrality, CooccurrenceCounter, NetworkOutcome, NetworkSnapshot};
use crate::models::Article;
use crate::text::{normalize, normalize_hangul, MorphAnalyzer, TokenFilter, Tokenizer};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// One word of the word cloud, with its weight relative to the most
/// frequent word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordWeight {
    pub keyword: String,
    pub count: usize,
    pub weight: f64,
}

/// The keyword network section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NetworkReport {
    Built {
        min_weight: usize,
        node_cap: usize,
        /// Documents that had at least two qualifying nouns.
        contributing_documents: usize,
        graph: NetworkSnapshot,
        centrality: Centrality,
    },
    NoQualifyingNetwork {
        min_weight: usize,
        max_observed_weight: usize,
        guidance: String,
    },
}

/// Everything a renderer needs for one dashboard run.
///
/// Disabled sections are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub source: CorpusSource,
    pub analyzer: String,
    pub summary: CorpusSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_preview: Option<Vec<Article>>,
    pub daily_counts: Option<Vec<DailyCount>>,
    pub keyword_trend: Option<Vec<TrendPoint>>,
    pub top_keywords: Option<Vec<KeywordCount>>,
    pub word_cloud: Option<Vec<WordWeight>>,
    pub network: Option<NetworkReport>,
}

/// Run every enabled analysis over the corpus.
///
/// # Arguments
///
/// * `corpus` - Articles to analyze; an empty corpus yields empty sections
/// * `config` - Enabled sections, thresholds and stop words
/// * `analyzer` - Morphological backend used for every section
///
/// # Returns
///
/// An [`AnalysisResult`] whose disabled sections are `None`.
#[instrument(level = "info", skip_all, fields(articles = corpus.len(), source = %corpus.source, analyzer = analyzer.name()))]
pub fn compute(corpus: &Corpus, config: &AnalysisConfig, analyzer: &dyn MorphAnalyzer) -> AnalysisResult {
    let tokenizer = Tokenizer::new(analyzer, TokenFilter::from_config(config));
    let articles = corpus.articles.as_slice();

    let summary = summarize(articles);
    info!(
        count = summary.article_count,
        period_days = summary.period_days,
        "Summarized corpus"
    );

    let raw_preview = config
        .show_raw_data
        .then(|| articles.iter().take(config.raw_preview_rows).cloned().collect());

    let daily = config
        .enabled(Section::Timeseries)
        .then(|| daily_counts(articles, config.release_date));

    let trend = config
        .enabled(Section::Trend)
        .then(|| weekly_trend(articles, &tokenizer, &config.target_keywords));

    let nouns = (config.enabled(Section::Frequency) || config.enabled(Section::Wordcloud))
        .then(|| noun_frequencies(articles, &tokenizer));
    let top_keywords = nouns
        .as_ref()
        .filter(|_| config.enabled(Section::Frequency))
        .map(|table| table.top_k(config.top_keywords));
    let word_cloud = nouns
        .as_ref()
        .filter(|_| config.enabled(Section::Wordcloud))
        .map(|table| word_weights(table, config.word_cloud_size));

    let network = config
        .enabled(Section::Network)
        .then(|| keyword_network(articles, &tokenizer, config));

    AnalysisResult {
        source: corpus.source.clone(),
        analyzer: tokenizer.backend().to_string(),
        summary,
        raw_preview,
        daily_counts: daily,
        keyword_trend: trend,
        top_keywords,
        word_cloud,
        network,
    }
}

/// Morpheme counts for each week bucket, evaluated against the target keywords.
#[instrument(level = "debug", skip_all, fields(targets = targets.len()))]
pub fn weekly_trend(articles: &[Article], tokenizer: &Tokenizer<'_>, targets: &[String]) -> Vec<TrendPoint> {
    let buckets: Vec<(String, FrequencyTable)> = group_by_week(articles)
        .into_iter()
        .map(|(label, members)| {
            let titles = members.iter().map(|a| a.title.as_str());
            let descriptions = members.iter().map(|a| a.description.as_str());
            let table = FrequencyTable::from_tokens(
                titles
                    .chain(descriptions)
                    .flat_map(|text| tokenizer.morphemes(&normalize(text))),
            );
            (label, table)
        })
        .collect();
    debug!(buckets = buckets.len(), "Bucketed articles by week");
    keyword_trend(&buckets, targets)
}

/// Noun counts over all titles followed by all descriptions.
#[instrument(level = "debug", skip_all)]
pub fn noun_frequencies(articles: &[Article], tokenizer: &Tokenizer<'_>) -> FrequencyTable {
    let titles = articles.iter().map(|a| a.title.as_str());
    let descriptions = articles.iter().map(|a| a.description.as_str());
    let table = FrequencyTable::from_tokens(titles.chain(descriptions).flat_map(|text| tokenizer.nouns(&normalize(text))));
    debug!(distinct = table.len(), total = table.total(), "Counted nouns");
    table
}

/// The `size` most frequent words, weighted against the most frequent one.
pub fn word_weights(table: &FrequencyTable, size: usize) -> Vec<WordWeight> {
    let top = table.most_common(size);
    let max = top.first().map(|(_, count)| *count).unwrap_or(0).max(1) as f64;
    top.into_iter()
        .map(|(keyword, count)| WordWeight {
            keyword,
            count,
            weight: count as f64 / max,
        })
        .collect()
}

/// Co-occurrence network over article descriptions, with centrality.
#[instrument(level = "info", skip_all, fields(min_weight = config.network.min_weight, node_cap = config.network.node_cap))]
pub fn keyword_network(articles: &[Article], tokenizer: &Tokenizer<'_>, config: &AnalysisConfig) -> NetworkReport {
    let mut counter = CooccurrenceCounter::new();
    for article in articles {
        counter.add_document(&tokenizer.unique_nouns(&normalize_hangul(&article.description)));
    }
    debug!(
        documents = counter.documents(),
        contributing = counter.contributing_documents(),
        pairs = counter.pairs().len(),
        "Counted keyword pairs"
    );

    match build_network(&counter, config.network.min_weight, config.network.node_cap) {
        NetworkOutcome::Built(graph) => NetworkReport::Built {
            min_weight: config.network.min_weight,
            node_cap: config.network.node_cap,
            contributing_documents: counter.contributing_documents(),
            centrality: compute_centrality(&graph, config.centrality_top_k),
            graph: graph.snapshot(),
        },
        NetworkOutcome::NoQualifyingNetwork {
            min_weight,
            max_observed_weight,
        } => NetworkReport::NoQualifyingNetwork {
            min_weight,
            max_observed_weight,
            guidance: guidance(min_weight, max_observed_weight),
        },
    }
}

fn guidance(min_weight: usize, max_observed_weight: usize) -> String {
    if max_observed_weight == 0 {
        "No description contains two qualifying keywords; a larger corpus is needed.".to_string()
    } else {
        format!(
            "No keyword pair co-occurs in {min_weight} or more articles (strongest pair: {max_observed_weight}). \
             Lower the minimum connection strength."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::sample_corpus;
    use crate::models::parse_timestamp;
    use crate::text::RuleAnalyzer;

    fn corpus(descriptions: &[(&str, &str)]) -> Corpus {
        Corpus {
            articles: descriptions
                .iter()
                .map(|(day, desc)| Article::new(parse_timestamp(day).unwrap(), "케이팝 데몬 헌터스", *desc))
                .collect(),
            source: CorpusSource::Sample,
        }
    }

    fn network_config(min_weight: usize) -> AnalysisConfig {
        let mut config = AnalysisConfig::default();
        config.network.min_weight = min_weight;
        config
    }

    #[test]
    fn test_end_to_end_network() {
        let corpus = corpus(&[
            ("2025-06-20", "노래 한국"),
            ("2025-06-21", "노래 한국 문화"),
            ("2025-06-22", "한국 문화"),
        ]);
        let result = compute(&corpus, &network_config(2), &RuleAnalyzer::new());

        let Some(NetworkReport::Built { graph, centrality, .. }) = result.network else {
            panic!("expected a network");
        };
        let nodes: Vec<&str> = graph.nodes.iter().map(|n| n.keyword.as_str()).collect();
        assert_eq!(nodes, vec!["노래", "한국", "문화"]);

        let edges: Vec<(&str, &str, usize)> = graph
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.weight))
            .collect();
        assert_eq!(edges, vec![("노래", "한국", 2), ("한국", "문화", 2)]);

        let Centrality::Ranked { degree, betweenness } = centrality else {
            panic!("expected rankings");
        };
        assert_eq!(degree[0].keyword, "한국");
        assert_eq!(degree[0].score, 1.0);
        assert_eq!(betweenness[0].keyword, "한국");
    }

    #[test]
    fn test_no_qualifying_network_carries_threshold() {
        let corpus = corpus(&[("2025-06-20", "노래 한국"), ("2025-06-21", "한국 문화")]);
        let result = compute(&corpus, &network_config(5), &RuleAnalyzer::new());

        match result.network {
            Some(NetworkReport::NoQualifyingNetwork {
                min_weight,
                max_observed_weight,
                guidance,
            }) => {
                assert_eq!(min_weight, 5);
                assert_eq!(max_observed_weight, 1);
                assert!(guidance.contains("Lower"));
            }
            other => panic!("unexpected network section: {other:?}"),
        }
    }

    #[test]
    fn test_frequency_and_word_cloud() {
        let corpus = corpus(&[
            ("2025-06-20", "노래 노래 한국"),
            ("2025-06-21", "<b>노래</b>가 좋다 문화"),
        ]);
        let result = compute(&corpus, &AnalysisConfig::default(), &RuleAnalyzer::new());

        let top = result.top_keywords.unwrap();
        // Each title contributes 케이팝 데몬 헌터스 once
        assert_eq!(top[0], KeywordCount { keyword: "노래".to_string(), count: 3 });
        assert_eq!(top[1].keyword, "케이팝");
        assert_eq!(top[1].count, 2);

        let cloud = result.word_cloud.unwrap();
        assert_eq!(cloud[0].weight, 1.0);
        assert!(cloud.iter().all(|w| w.weight > 0.0 && w.weight <= 1.0));
    }

    #[test]
    fn test_trend_counts_per_week() {
        let corpus = corpus(&[
            ("2025-06-15", "노래 한국"),
            ("2025-06-20", "노래"),
            ("2025-07-01", "문화"),
        ]);
        let mut config = AnalysisConfig::default();
        config.target_keywords = vec!["노래".to_string(), "응원".to_string()];
        let trend = compute(&corpus, &config, &RuleAnalyzer::new()).keyword_trend.unwrap();

        assert_eq!(
            trend,
            vec![
                TrendPoint { bucket: "06월 3주차".into(), keyword: "노래".into(), count: 2 },
                TrendPoint { bucket: "06월 3주차".into(), keyword: "응원".into(), count: 0 },
                TrendPoint { bucket: "07월 1주차".into(), keyword: "노래".into(), count: 0 },
                TrendPoint { bucket: "07월 1주차".into(), keyword: "응원".into(), count: 0 },
            ]
        );
    }

    #[test]
    fn test_disabled_sections_are_none() {
        let corpus = corpus(&[("2025-06-20", "노래 한국")]);
        let mut config = AnalysisConfig::default();
        config.sections = vec![Section::Timeseries];
        let result = compute(&corpus, &config, &RuleAnalyzer::new());

        assert!(result.daily_counts.is_some());
        assert!(result.keyword_trend.is_none());
        assert!(result.top_keywords.is_none());
        assert!(result.word_cloud.is_none());
        assert!(result.network.is_none());
        assert!(result.raw_preview.is_none());
    }

    #[test]
    fn test_raw_preview_limited() {
        let sample = sample_corpus();
        let mut config = AnalysisConfig::default();
        config.show_raw_data = true;
        config.sections.clear();
        let result = compute(&sample, &config, &RuleAnalyzer::new());
        assert_eq!(result.raw_preview.unwrap().len(), 20);
    }

    #[test]
    fn test_empty_corpus_degrades() {
        let empty = Corpus {
            articles: Vec::new(),
            source: CorpusSource::Sample,
        };
        let result = compute(&empty, &AnalysisConfig::default(), &RuleAnalyzer::new());
        assert_eq!(result.summary.article_count, 0);
        assert!(result.daily_counts.unwrap().is_empty());
        assert!(result.top_keywords.unwrap().is_empty());
        assert!(matches!(
            result.network,
            Some(NetworkReport::NoQualifyingNetwork { max_observed_weight: 0, .. })
        ));
    }

    #[test]
    fn test_sample_corpus_builds_network() {
        let result = compute(&sample_corpus(), &AnalysisConfig::default(), &RuleAnalyzer::new());
        let Some(NetworkReport::Built { graph, .. }) = result.network else {
            panic!("expected a network from the sample corpus");
        };
        assert!(graph.nodes.len() <= 50);
        assert!(graph.edges.iter().all(|e| e.weight >= 3));
    }

    #[test]
    fn test_result_serializes() {
        let corpus = corpus(&[("2025-06-20", "노래 한국")]);
        let json = serde_json::to_value(compute(&corpus, &AnalysisConfig::default(), &RuleAnalyzer::new())).unwrap();
        assert_eq!(json["summary"]["article_count"], 1);
        assert_eq!(json["network"]["status"], "no_qualifying_network");
        assert!(json.get("raw_preview").is_none());
    }
}
