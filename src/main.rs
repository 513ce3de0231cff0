//! # Fandom Lens
//!
//! Collects Korean news articles about a title from the Naver search API and
//! turns them into dashboard analytics: daily article counts, weekly keyword
//! trends, keyword frequencies, word-cloud weights and a keyword
//! co-occurrence network with centrality rankings.
//!
//! ## Usage
//!
//! ```sh
//! fandom_lens collect --client-id ID --client-secret SECRET
//! fandom_lens analyze -j ./json -m ./markdown
//! fandom_lens explore --min-weight 5
//! ```

use clap::Parser;
use fandom_lens::cli::{AnalysisArgs, AnalyzeArgs, Cli, CollectArgs, Command, ExploreArgs};
use fandom_lens::collector::{collect_articles, Credentials, NaverClient, RetryFetch};
use fandom_lens::config::{load_config, AnalysisConfig};
use fandom_lens::corpus::{load_or_sample, write_corpus};
use fandom_lens::explore::{run_repl, ExploreCommand, ExploreSession, Reply};
use fandom_lens::outputs::{indexes, json, markdown, RunStamp};
use fandom_lens::pipeline::compute;
use fandom_lens::text::build_analyzer;
use fandom_lens::utils::{ensure_writable_dir, truncate_for_log};
use std::error::Error;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("fandom_lens starting up");

    let args = Cli::parse();

    let outcome = match args.command {
        Command::Collect(collect) => run_collect(collect).await,
        Command::Analyze(analyze) => {
            let config = analysis_config(args.config.as_deref(), &analyze.analysis)?;
            run_analyze(config, analyze).await
        }
        Command::Explore(explore) => {
            let config = analysis_config(args.config.as_deref(), &explore.analysis)?;
            run_explore(config, explore)
        }
    };

    let elapsed = start_time.elapsed();
    match &outcome {
        Ok(()) => info!(?elapsed, secs = elapsed.as_secs(), "Execution complete"),
        Err(e) => error!(?elapsed, error = %e, "Execution failed"),
    }
    outcome
}

/// Config file values with CLI flags applied on top.
fn analysis_config(path: Option<&Path>, flags: &AnalysisArgs) -> Result<AnalysisConfig, Box<dyn Error>> {
    let mut config = load_config(path).inspect_err(|e| error!(error = %e, "Failed to load config"))?;
    flags.apply(&mut config);
    config.validate()?;
    info!(
        min_weight = config.network.min_weight,
        node_cap = config.network.node_cap,
        word_cloud_size = config.word_cloud_size,
        sections = ?config.sections,
        "Analysis configuration ready"
    );
    Ok(config)
}

#[instrument(level = "info", skip_all, fields(query = %args.query, output = %args.output.display()))]
async fn run_collect(args: CollectArgs) -> Result<(), Box<dyn Error>> {
    let request = args.search_request();
    let starts = request.page_starts();
    let credentials = Credentials {
        client_id: args.client_id.clone(),
        client_secret: args.client_secret.clone(),
    };
    let client = NaverClient::new(credentials, request)?;
    let fetcher = RetryFetch::new(client, args.max_retries, Duration::from_secs(1));

    let articles = collect_articles(&fetcher, &starts).await;
    match articles.first() {
        Some(first) => debug!(title = %truncate_for_log(&first.title, 80), "Newest collected article"),
        None => warn!("No articles collected; check the credentials and query"),
    }

    write_corpus(&args.output, &articles)?;
    info!(count = articles.len(), path = %args.output.display(), "Saved corpus");
    Ok(())
}

#[instrument(level = "info", skip_all, fields(corpus = %args.analysis.corpus.display()))]
async fn run_analyze(config: AnalysisConfig, args: AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    // Early check: ensure output dirs are writable
    for dir in [&args.json_output_dir, &args.markdown_output_dir] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let analyzer = build_analyzer(args.analysis.analyzer)?;
    let corpus = load_or_sample(&args.analysis.corpus);
    let result = compute(&corpus, &config, analyzer.as_ref());
    let stamp = RunStamp::now();

    if let Err(e) = json::write_analysis(&result, &args.json_output_dir, &stamp).await {
        error!(error = %e, "Failed to write JSON");
        return Err(e);
    }
    if let Err(e) = markdown::write_report(&result, &args.markdown_output_dir, &stamp).await {
        error!(error = %e, "Failed to write Markdown");
        return Err(e);
    }
    if let Err(e) = indexes::update_report_index(&args.markdown_output_dir, &result, &stamp).await {
        error!(error = %e, "Failed to update report index");
    }
    Ok(())
}

fn run_explore(config: AnalysisConfig, args: ExploreArgs) -> Result<(), Box<dyn Error>> {
    let analyzer = build_analyzer(args.analysis.analyzer)?;
    let mut session = ExploreSession::new(config, args.analysis.corpus.clone(), analyzer);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Reply::Continue(text) = session.handle(ExploreCommand::Run) {
        writeln!(out, "{text}")?;
    }
    run_repl(&mut session, io::stdin().lock(), out)?;
    Ok(())
}
