//! Analysis configuration.
//!
//! [`AnalysisConfig`] is passed explicitly into every pipeline stage. It can
//! be loaded from a YAML file; any field the file omits keeps its default,
//! and CLI flags are applied on top by the driver.
//!
//! ```yaml
//! min_token_len: 2
//! word_cloud_size: 80
//! network:
//!   min_weight: 5
//!   node_cap: 50
//! sections: [frequency, network]
//! ```

use crate::error::ConfigError;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Stop words excluded from every frequency and network analysis.
pub const DEFAULT_STOP_WORDS: &str =
    "예정 에 가 이은 을 를 의 도 또한 더 를 위해 에게 에게서 에게로 부터 어 우선 간 이후 하는 입니다 할 합니다";

/// Keywords tracked week by week in the trend analysis.
pub const DEFAULT_TARGET_KEYWORDS: [&str; 10] = [
    "노래", "케이팝", "한국", "주말", "넷플릭스", "문화", "인기", "응원", "최고", "케데헌 효과",
];

/// Edge weight thresholds offered by the CLI.
pub const ALLOWED_MIN_WEIGHTS: [usize; 5] = [3, 5, 10, 15, 20];

/// Bounds for the number of words handed to the word cloud.
pub const WORD_CLOUD_RANGE: std::ops::RangeInclusive<usize> = 10..=100;

/// An analysis that can be switched on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Article counts per day.
    Timeseries,
    /// Target keyword counts per week bucket.
    Trend,
    /// Top keyword frequency table.
    Frequency,
    /// Word cloud weights.
    Wordcloud,
    /// Keyword co-occurrence network and centrality.
    Network,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Timeseries,
        Section::Trend,
        Section::Frequency,
        Section::Wordcloud,
        Section::Network,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Section::Timeseries => "timeseries",
            Section::Trend => "trend",
            Section::Frequency => "frequency",
            Section::Wordcloud => "wordcloud",
            Section::Network => "network",
        }
    }
}

/// Co-occurrence network settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Minimum number of shared documents for an edge to be kept.
    pub min_weight: usize,
    /// Maximum number of nodes kept after pruning.
    pub node_cap: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            min_weight: ALLOWED_MIN_WEIGHTS[0],
            node_cap: 50,
        }
    }
}

/// Everything the pipeline needs to know besides the corpus itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Tokens dropped from every analysis.
    pub stop_words: Vec<String>,
    /// Minimum noun length in characters.
    pub min_token_len: usize,
    /// Keywords tracked in the weekly trend.
    pub target_keywords: Vec<String>,
    /// Number of rows in the keyword frequency table.
    pub top_keywords: usize,
    /// Number of words handed to the word cloud.
    pub word_cloud_size: usize,
    /// Number of rows kept in each centrality ranking.
    pub centrality_top_k: usize,
    /// Number of raw articles included in the preview, when enabled.
    pub raw_preview_rows: usize,
    /// Include a preview of the raw articles in the result.
    pub show_raw_data: bool,
    /// Release date of the title, the reference point for daily phases.
    pub release_date: NaiveDate,
    pub network: NetworkConfig,
    /// Analyses to run.
    pub sections: Vec<Section>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.split(' ').map(str::to_string).collect(),
            min_token_len: 2,
            target_keywords: DEFAULT_TARGET_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            top_keywords: 20,
            word_cloud_size: 50,
            centrality_top_k: 10,
            raw_preview_rows: 20,
            show_raw_data: false,
            release_date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap_or_default(),
            network: NetworkConfig::default(),
            sections: Section::ALL.to_vec(),
        }
    }
}

impl AnalysisConfig {
    /// Whether the given analysis should run.
    pub fn enabled(&self, section: Section) -> bool {
        self.sections.contains(&section)
    }

    /// Switch a section on if it is off, off if it is on.
    pub fn toggle(&mut self, section: Section) -> bool {
        if let Some(pos) = self.sections.iter().position(|s| *s == section) {
            self.sections.remove(pos);
            false
        } else {
            self.sections.push(section);
            self.sections.sort();
            true
        }
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.min_weight == 0 {
            return Err(ConfigError::Invalid {
                field: "network.min_weight",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.network.node_cap < 2 {
            return Err(ConfigError::Invalid {
                field: "network.node_cap",
                reason: format!("{} leaves no room for an edge", self.network.node_cap),
            });
        }
        if !WORD_CLOUD_RANGE.contains(&self.word_cloud_size) {
            return Err(ConfigError::Invalid {
                field: "word_cloud_size",
                reason: format!(
                    "{} is outside {}..={}",
                    self.word_cloud_size,
                    WORD_CLOUD_RANGE.start(),
                    WORD_CLOUD_RANGE.end()
                ),
            });
        }
        if self.min_token_len == 0 {
            return Err(ConfigError::Invalid {
                field: "min_token_len",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Load a configuration file, or the defaults when no path is given.
///
/// An empty file also yields the defaults.
///
/// # Errors
///
/// [`ConfigError::Io`] when the file cannot be read, [`ConfigError::Yaml`]
/// when it does not parse, and [`ConfigError::Invalid`] when a value fails
/// [`AnalysisConfig::validate`].
#[instrument(level = "info")]
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, ConfigError> {
    let Some(path) = path else {
        debug!("No config file given; using defaults");
        return Ok(AnalysisConfig::default());
    };

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&raw).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    debug!(?config, "Loaded analysis config");
    Ok(config)
}

fn parse_config(raw: &str) -> Result<AnalysisConfig, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(AnalysisConfig::default());
    }
    serde_yaml::from_str(raw)
}

/// Parse a CLI `--min-weight` value, accepting only the offered thresholds.
pub fn parse_min_weight(raw: &str) -> Result<usize, String> {
    let value: usize = raw.parse().map_err(|e| format!("`{raw}` is not a number: {e}"))?;
    if ALLOWED_MIN_WEIGHTS.contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not one of {ALLOWED_MIN_WEIGHTS:?}"))
    }
}
