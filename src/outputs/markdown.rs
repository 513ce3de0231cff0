//! Markdown report rendering.
//!
//! The report mirrors the dashboard: headline metrics, then one section per
//! enabled analysis. Sections that were not computed are omitted.

use super::RunStamp;
use crate::graph::Centrality;
use crate::pipeline::{AnalysisResult, NetworkReport};
use crate::text::normalize;
use itertools::Itertools;
use std::error::Error;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Strongest edges listed in the network section.
const LISTED_EDGES: usize = 20;

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render a result as a Markdown document.
pub fn render_report(result: &AnalysisResult, stamp: &RunStamp) -> Result<String, std::fmt::Error> {
    let mut md = String::new();
    let summary = &result.summary;

    writeln!(md, "# Fandom news analysis ({} {})\n", stamp.date, stamp.label)?;
    writeln!(md, "Corpus: {} · analyzer: `{}`\n", result.source, result.analyzer)?;

    writeln!(md, "| Metric | Value |")?;
    writeln!(md, "|---|---|")?;
    writeln!(md, "| Articles | {} |", summary.article_count)?;
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        writeln!(md, "| Period | {first} ~ {last} ({} days) |", summary.period_days)?;
    }
    writeln!(md, "| Daily average | {:.1} |\n", summary.daily_average)?;

    if let Some(daily) = &result.daily_counts {
        writeln!(md, "## Articles per day\n")?;
        let by_phase = daily.iter().chunk_by(|d| d.phase);
        writeln!(md, "| Phase | Days | Articles |")?;
        writeln!(md, "|---|---|---|")?;
        for (phase, days) in &by_phase {
            let (n, total) = days.fold((0, 0), |(n, total), d| (n + 1, total + d.count));
            writeln!(md, "| {} | {n} | {total} |", phase.label())?;
        }
        writeln!(md)?;
        writeln!(md, "| Date | Week | Articles | Phase |")?;
        writeln!(md, "|---|---|---|---|")?;
        for day in daily {
            writeln!(md, "| {} | {} | {} | {} |", day.date, day.iso_week, day.count, day.phase.label())?;
        }
        writeln!(md)?;
    }

    if let Some(trend) = &result.keyword_trend {
        writeln!(md, "## Keyword trend by week\n")?;
        let keywords: Vec<&str> = trend.iter().map(|p| p.keyword.as_str()).unique().collect();
        if keywords.is_empty() || trend.is_empty() {
            writeln!(md, "_No weekly data._\n")?;
        } else {
            writeln!(md, "| Week | {} |", keywords.iter().map(|k| cell(k)).join(" | "))?;
            writeln!(md, "|---|{}", "---|".repeat(keywords.len()))?;
            for (bucket, points) in &trend.iter().chunk_by(|p| p.bucket.as_str()) {
                writeln!(md, "| {bucket} | {} |", points.map(|p| p.count).join(" | "))?;
            }
            writeln!(md)?;
        }
    }

    if let Some(top) = &result.top_keywords {
        writeln!(md, "## Top keywords\n")?;
        writeln!(md, "| Rank | Keyword | Count |")?;
        writeln!(md, "|---|---|---|")?;
        for (rank, row) in top.iter().enumerate() {
            writeln!(md, "| {} | {} | {} |", rank + 1, cell(&row.keyword), row.count)?;
        }
        writeln!(md)?;
    }

    if let Some(cloud) = &result.word_cloud {
        writeln!(md, "## Word cloud\n")?;
        let words = cloud
            .iter()
            .map(|w| format!("{} ({:.2})", w.keyword, w.weight))
            .join(", ");
        writeln!(md, "{words}\n")?;
    }

    if let Some(network) = &result.network {
        writeln!(md, "## Keyword network\n")?;
        render_network(&mut md, network)?;
    }

    if let Some(raw) = &result.raw_preview {
        writeln!(md, "## Raw data (first {})\n", raw.len())?;
        writeln!(md, "| Date | Publisher | Title |")?;
        writeln!(md, "|---|---|---|")?;
        for article in raw {
            writeln!(
                md,
                "| {} | {} | {} |",
                article.date,
                article.publisher().unwrap_or_default(),
                cell(&normalize(&article.title))
            )?;
        }
        writeln!(md)?;
    }

    Ok(md)
}

fn render_network(md: &mut String, network: &NetworkReport) -> std::fmt::Result {
    match network {
        NetworkReport::NoQualifyingNetwork { guidance, .. } => {
            writeln!(md, "> {guidance}\n")?;
        }
        NetworkReport::Built {
            min_weight,
            node_cap,
            contributing_documents,
            graph,
            centrality,
        } => {
            writeln!(
                md,
                "{} keywords, {} connections (minimum strength {min_weight}, at most {node_cap} keywords, \
                 {contributing_documents} contributing articles)\n",
                graph.nodes.len(),
                graph.edges.len()
            )?;

            writeln!(md, "| Keyword | Keyword | Articles |")?;
            writeln!(md, "|---|---|---|")?;
            for edge in graph
                .edges
                .iter()
                .sorted_by(|a, b| b.weight.cmp(&a.weight))
                .take(LISTED_EDGES)
            {
                writeln!(md, "| {} | {} | {} |", cell(&edge.source), cell(&edge.target), edge.weight)?;
            }
            writeln!(md)?;

            match centrality {
                Centrality::Ranked { degree, betweenness } => {
                    writeln!(md, "### Centrality\n")?;
                    writeln!(md, "| Rank | Degree | Score | Betweenness | Score |")?;
                    writeln!(md, "|---|---|---|---|---|")?;
                    for (rank, (d, b)) in degree.iter().zip(betweenness).enumerate() {
                        writeln!(
                            md,
                            "| {} | {} | {:.3} | {} | {:.3} |",
                            rank + 1,
                            cell(&d.keyword),
                            d.score,
                            cell(&b.keyword),
                            b.score
                        )?;
                    }
                    writeln!(md)?;
                }
                Centrality::Vacuous { node_count } => {
                    writeln!(md, "_Centrality needs at least two keywords ({node_count} found)._\n")?;
                }
            }
        }
    }
    Ok(())
}

/// Write the report to `{markdown_output_dir}/{date}_{label}.md`.
#[instrument(level = "info", skip_all, fields(markdown_output_dir = %markdown_output_dir.display()))]
pub async fn write_report(
    result: &AnalysisResult,
    markdown_output_dir: &Path,
    stamp: &RunStamp,
) -> Result<PathBuf, Box<dyn Error>> {
    let markdown = render_report(result, stamp)?;
    fs::create_dir_all(markdown_output_dir).await?;
    let path = markdown_output_dir.join(stamp.markdown_filename());
    fs::write(&path, markdown).await?;
    info!(path = %path.display(), "Wrote Markdown report");
    Ok(path)
}
