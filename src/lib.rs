//! # Fandom Lens
//!
//! Collects Korean news articles about a media title and computes the
//! analytics a fandom dashboard renders: article counts over time, weekly
//! keyword trends, keyword frequencies, word-cloud weights and a keyword
//! co-occurrence network ranked by centrality.
//!
//! ## Architecture
//!
//! The core is a pure, single-pass pipeline:
//! 1. **Normalization** ([`text::normalize`]): strip markup and punctuation
//! 2. **Tokenization** ([`text::Tokenizer`]): morphemes or nouns, filtered by stop words and length
//! 3. **Aggregation** ([`analysis`]): frequency tables, weekly trends, daily counts
//! 4. **Network** ([`graph`]): per-article noun sets → co-occurrence counts → pruned graph
//! 5. **Metrics** ([`graph::centrality`]): degree and betweenness centrality
//!
//! [`pipeline::compute`] runs the enabled stages over a [`corpus::Corpus`]
//! and returns an [`pipeline::AnalysisResult`]. Collection ([`collector`])
//! and the report writers ([`outputs`]) sit outside the core.
//!
//! ## Example
//!
//! ```
//! use fandom_lens::config::AnalysisConfig;
//! use fandom_lens::corpus::sample_corpus;
//! use fandom_lens::pipeline::compute;
//! use fandom_lens::text::RuleAnalyzer;
//!
//! let result = compute(&sample_corpus(), &AnalysisConfig::default(), &RuleAnalyzer::new());
//! assert!(result.summary.article_count > 0);
//! ```

pub mod analysis;
pub mod cli;
pub mod collector;
pub mod config;
pub mod corpus;
pub mod error;
pub mod explore;
pub mod graph;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod text;
pub mod utils;
