//! Report index maintenance.
//!
//! `reports.md` lists every Markdown report, grouped under one heading per
//! run date, newest date first:
//!
//! ```text
//! # Reports
//!
//! ## 2025-09-21
//! - [093000](./2025-09-21_093000.md): 1834 articles, top keyword 케이팝
//! ```
//!
//! Re-running with the same stamp does not duplicate the entry.

use super::RunStamp;
use crate::pipeline::AnalysisResult;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument};

pub const INDEX_FILENAME: &str = "reports.md";

const INDEX_HEADER: &str = "# Reports";

fn entry_line(result: &AnalysisResult, stamp: &RunStamp) -> String {
    let mut line = format!(
        "- [{}](./{}): {} articles",
        stamp.label,
        stamp.markdown_filename(),
        result.summary.article_count
    );
    if let Some(top) = result.top_keywords.as_ref().and_then(|t| t.first()) {
        line.push_str(&format!(", top keyword {}", top.keyword));
    }
    line
}

/// Insert the entry for this run into an existing index text.
fn insert_entry(index: &str, stamp: &RunStamp, entry: &str) -> Option<String> {
    let mut lines: Vec<String> = index.lines().map(str::to_string).collect();
    let link = format!("- [{}](./{})", stamp.label, stamp.markdown_filename());
    if lines.iter().any(|l| l.starts_with(&link)) {
        return None;
    }
    if lines.is_empty() {
        lines.push(INDEX_HEADER.to_string());
    }

    let heading = format!("## {}", stamp.date);
    match lines.iter().position(|l| *l == heading) {
        Some(pos) => {
            let mut end = pos + 1;
            while end < lines.len() && lines[end].starts_with("- ") {
                end += 1;
            }
            lines.insert(end, entry.to_string());
        }
        None => {
            // Date headings are kept newest first, right after the title
            let insert_at = lines
                .iter()
                .position(|l| l.starts_with("## ") && l.as_str() < heading.as_str())
                .unwrap_or(lines.len());
            let block = [String::new(), heading, entry.to_string()];
            let at = if insert_at > 0 && lines[insert_at - 1].is_empty() {
                insert_at - 1
            } else {
                insert_at
            };
            lines.splice(at..at, block);
        }
    }
    Some(lines.join("\n") + "\n")
}

/// Add this run's report to `{markdown_output_dir}/reports.md`.
#[instrument(level = "info", skip_all, fields(markdown_output_dir = %markdown_output_dir.display(), date = %stamp.date))]
pub async fn update_report_index(
    markdown_output_dir: &Path,
    result: &AnalysisResult,
    stamp: &RunStamp,
) -> Result<(), Box<dyn Error>> {
    let index_path = markdown_output_dir.join(INDEX_FILENAME);
    let existing = if index_path.exists() {
        fs::read_to_string(&index_path).await?
    } else {
        String::new()
    };

    match insert_entry(&existing, stamp, &entry_line(result, stamp)) {
        Some(updated) => {
            fs::write(&index_path, updated).await?;
            info!(path = %index_path.display(), "Updated report index");
        }
        None => debug!("Report already indexed"),
    }
    Ok(())
}
