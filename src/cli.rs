//! Command-line interface definitions for Fandom Lens.
//!
//! This module defines the CLI subcommands and options using the `clap` crate.
//! Analysis options override the values loaded from `--config`; API
//! credentials can also come from environment variables.

use crate::collector::{SearchRequest, SortOrder};
use crate::config::{parse_min_weight, AnalysisConfig, Section};
use crate::corpus::DEFAULT_CORPUS_PATH;
use crate::text::AnalyzerKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default search query for `collect`.
pub const DEFAULT_QUERY: &str = "케이팝 데몬 헌터스";

/// Command-line arguments for Fandom Lens.
///
/// # Examples
///
/// ```sh
/// # Collect 1000 articles into data/naver_news.csv
/// NAVER_CLIENT_ID=... NAVER_CLIENT_SECRET=... fandom_lens collect
///
/// # Analyze and write reports
/// fandom_lens analyze -j ./json -m ./markdown --min-weight 5
///
/// # Tweak settings interactively
/// fandom_lens explore --sections network,frequency
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to an analysis config YAML file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect articles from the Naver news search API into a corpus file
    Collect(CollectArgs),
    /// Analyze a corpus and write JSON and Markdown reports
    Analyze(AnalyzeArgs),
    /// Analyze a corpus interactively, changing settings between runs
    Explore(ExploreArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    /// Naver API client ID
    #[arg(long, env = "NAVER_CLIENT_ID", hide_env_values = true)]
    pub client_id: String,

    /// Naver API client secret
    #[arg(long, env = "NAVER_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Search query
    #[arg(short, long, default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Number of articles to request (the API serves at most 1000)
    #[arg(long, default_value_t = 1000)]
    pub num_data: u32,

    /// Articles per request (at most 100)
    #[arg(long, default_value_t = 100)]
    pub display: u32,

    /// Result ordering
    #[arg(long, value_enum, default_value_t = SortOrder::Date)]
    pub sort: SortOrder,

    /// Corpus file to write (.csv or .json)
    #[arg(short, long, default_value = DEFAULT_CORPUS_PATH)]
    pub output: PathBuf,

    /// Retries per page on transient failures
    #[arg(long, default_value_t = 5)]
    pub max_retries: usize,
}

impl CollectArgs {
    pub fn search_request(&self) -> SearchRequest {
        SearchRequest {
            query: self.query.clone(),
            display: self.display,
            num_data: self.num_data,
            sort: self.sort,
        }
    }
}

/// Options shared by `analyze` and `explore`.
#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
    /// Corpus file to analyze (.csv or .json); falls back to sample data when missing
    #[arg(long, default_value = DEFAULT_CORPUS_PATH)]
    pub corpus: PathBuf,

    /// Minimum number of shared articles for a network connection (3, 5, 10, 15 or 20)
    #[arg(long, value_parser = parse_min_weight)]
    pub min_weight: Option<usize>,

    /// Number of words in the word cloud (10-100)
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Analyses to run, comma separated
    #[arg(long, value_enum, value_delimiter = ',')]
    pub sections: Option<Vec<Section>>,

    /// Morphological analyzer backend
    #[arg(long, value_enum, default_value_t = AnalyzerKind::Rule)]
    pub analyzer: AnalyzerKind,

    /// Include the first rows of the raw corpus in the result
    #[arg(long)]
    pub show_raw_data: bool,
}

impl AnalysisArgs {
    /// Apply the flags that were given on top of a loaded config.
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(min_weight) = self.min_weight {
            config.network.min_weight = min_weight;
        }
        if let Some(top_n) = self.top_n {
            config.word_cloud_size = top_n;
        }
        if let Some(sections) = &self.sections {
            let mut sections = sections.clone();
            sections.sort();
            sections.dedup();
            config.sections = sections;
        }
        if self.show_raw_data {
            config.show_raw_data = true;
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Output directory for the JSON result
    #[arg(short, long)]
    pub json_output_dir: PathBuf,

    /// Output directory for the Markdown report
    #[arg(short, long)]
    pub markdown_output_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ExploreArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,
}
