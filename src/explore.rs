//! Interactive exploration over stdin.
//!
//! Each settings command re-runs the pipeline against the cached corpus:
//!
//! ```text
//! > min-weight 5
//! > top-n 80
//! > toggle wordcloud
//! > reload        # drop the cached corpus and read the file again
//! > run
//! > quit
//! ```

use crate::config::{parse_min_weight, AnalysisConfig, Section};
use crate::corpus::CorpusCache;
use crate::graph::Centrality;
use crate::pipeline::{compute, AnalysisResult, NetworkReport};
use crate::text::MorphAnalyzer;
use crate::utils::truncate_for_log;
use clap::ValueEnum;
use itertools::Itertools;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, instrument};

const HELP: &str = "commands: min-weight N | top-n N | toggle SECTION | reload | run | show | help | quit";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExploreCommand {
    MinWeight(usize),
    TopN(usize),
    Toggle(Section),
    Reload,
    Run,
    Show,
    Help,
    Quit,
}

impl FromStr for ExploreCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = parts.next().ok_or_else(|| "empty command".to_string())?;
        let arg = parts.next();
        let need = |what: &str| arg.ok_or_else(|| format!("`{command}` needs {what}"));

        match command {
            "min-weight" => Ok(ExploreCommand::MinWeight(parse_min_weight(need("a weight")?)?)),
            "top-n" => need("a number")?
                .parse()
                .map(ExploreCommand::TopN)
                .map_err(|e| format!("invalid number: {e}")),
            "toggle" => {
                let name = need("a section")?;
                Section::from_str(name, true)
                    .map(ExploreCommand::Toggle)
                    .map_err(|_| format!("unknown section `{name}`"))
            }
            "reload" => Ok(ExploreCommand::Reload),
            "run" => Ok(ExploreCommand::Run),
            "show" => Ok(ExploreCommand::Show),
            "help" | "?" => Ok(ExploreCommand::Help),
            "quit" | "exit" | "q" => Ok(ExploreCommand::Quit),
            other => Err(format!("unknown command `{}`", truncate_for_log(other, 32))),
        }
    }
}

/// State carried between commands.
pub struct ExploreSession {
    config: AnalysisConfig,
    corpus_path: PathBuf,
    cache: CorpusCache,
    analyzer: Box<dyn MorphAnalyzer>,
}

/// What the loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Continue(String),
    Quit,
}

impl ExploreSession {
    pub fn new(config: AnalysisConfig, corpus_path: PathBuf, analyzer: Box<dyn MorphAnalyzer>) -> Self {
        Self {
            config,
            corpus_path,
            cache: CorpusCache::new(),
            analyzer,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Compute with the current settings and the cached corpus.
    pub fn run(&mut self) -> AnalysisResult {
        let corpus = self.cache.get_or_sample(&self.corpus_path);
        compute(&corpus, &self.config, self.analyzer.as_ref())
    }

    /// Apply a change, keeping the old settings if the new ones are invalid.
    fn update(&mut self, change: impl FnOnce(&mut AnalysisConfig)) -> Result<(), String> {
        let mut next = self.config.clone();
        change(&mut next);
        next.validate().map_err(|e| e.to_string())?;
        self.config = next;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn handle(&mut self, command: ExploreCommand) -> Reply {
        let changed = match command {
            ExploreCommand::Quit => return Reply::Quit,
            ExploreCommand::Help => return Reply::Continue(HELP.to_string()),
            ExploreCommand::Show => return Reply::Continue(describe_config(&self.config)),
            ExploreCommand::MinWeight(w) => self.update(|c| c.network.min_weight = w),
            ExploreCommand::TopN(n) => self.update(|c| c.word_cloud_size = n),
            ExploreCommand::Toggle(section) => {
                let on = self.config.toggle(section);
                debug!(section = section.name(), on, "Toggled section");
                Ok(())
            }
            ExploreCommand::Reload => {
                let dropped = self.cache.invalidate(&self.corpus_path);
                info!(dropped, "Reloading corpus");
                Ok(())
            }
            ExploreCommand::Run => Ok(()),
        };

        match changed {
            Ok(()) => Reply::Continue(summarize_result(&self.run())),
            Err(e) => Reply::Continue(format!("error: {e}")),
        }
    }
}

fn describe_config(config: &AnalysisConfig) -> String {
    format!(
        "min-weight {} · node cap {} · top-n {} · sections [{}] · raw data {}",
        config.network.min_weight,
        config.network.node_cap,
        config.word_cloud_size,
        config.sections.iter().map(Section::name).join(", "),
        if config.show_raw_data { "on" } else { "off" }
    )
}

/// Compact multi-line digest of a result for the terminal.
pub fn summarize_result(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let s = &result.summary;
    let _ = writeln!(
        out,
        "{} articles from {} ({} days, {:.1}/day)",
        s.article_count, result.source, s.period_days, s.daily_average
    );
    if let Some(daily) = &result.daily_counts {
        if let Some(peak) = daily.iter().max_by_key(|d| d.count) {
            let _ = writeln!(out, "busiest day: {} ({} articles)", peak.date, peak.count);
        }
    }
    if let Some(top) = &result.top_keywords {
        let words = top.iter().take(5).map(|k| format!("{} {}", k.keyword, k.count)).join(", ");
        let _ = writeln!(out, "top keywords: {words}");
    }
    if let Some(cloud) = &result.word_cloud {
        let _ = writeln!(out, "word cloud: {} words", cloud.len());
    }
    match &result.network {
        Some(NetworkReport::Built { graph, centrality, .. }) => {
            let _ = writeln!(out, "network: {} keywords, {} connections", graph.nodes.len(), graph.edges.len());
            if let Centrality::Ranked { degree, betweenness } = centrality {
                let fmt = |rows: &[crate::graph::CentralityRecord]| {
                    rows.iter().take(3).map(|r| format!("{} {:.3}", r.keyword, r.score)).join(", ")
                };
                let _ = writeln!(out, "degree: {}", fmt(degree.as_slice()));
                let _ = writeln!(out, "betweenness: {}", fmt(betweenness.as_slice()));
            }
        }
        Some(NetworkReport::NoQualifyingNetwork { guidance, .. }) => {
            let _ = writeln!(out, "network: {guidance}");
        }
        None => {}
    }
    out.trim_end().to_string()
}

/// Read commands until `quit` or end of input.
pub fn run_repl<R: BufRead, W: Write>(session: &mut ExploreSession, input: R, mut output: W) -> io::Result<()> {
    writeln!(output, "{HELP}")?;
    write!(output, "> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            write!(output, "> ")?;
            output.flush()?;
            continue;
        }
        let reply = match line.parse::<ExploreCommand>() {
            Ok(command) => session.handle(command),
            Err(e) => Reply::Continue(format!("error: {e}\n{HELP}")),
        };
        match reply {
            Reply::Quit => break,
            Reply::Continue(text) => writeln!(output, "{text}")?,
        }
        write!(output, "> ")?;
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}
