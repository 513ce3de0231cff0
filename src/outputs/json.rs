//! JSON output for renderers.
//!
//! Files are organized by run date:
//! ```text
//! json_output_dir/
//! └── 2025-09-21/
//!     └── 093000.json
//! ```

use super::RunStamp;
use crate::pipeline::AnalysisResult;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write an [`AnalysisResult`] to `{json_output_dir}/{date}/{label}.json`.
///
/// # Returns
///
/// The path written.
///
/// # Errors
///
/// Fails if the dated directory cannot be created or the file written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display()))]
pub async fn write_analysis(
    result: &AnalysisResult,
    json_output_dir: &Path,
    stamp: &RunStamp,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(result)?;

    let full_json_dir = json_output_dir.join(stamp.date.to_string());
    info!(dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = full_json_dir.join(format!("{}.json", stamp.label));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON analysis file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::corpus::sample_corpus;
    use crate::pipeline::compute;
    use crate::text::RuleAnalyzer;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_write_analysis_layout() {
        let dir = tempfile::tempdir().unwrap();
        let result = compute(&sample_corpus(), &AnalysisConfig::default(), &RuleAnalyzer::new());
        let stamp = RunStamp {
            date: NaiveDate::from_ymd_opt(2025, 9, 21).unwrap(),
            label: "093000".to_string(),
        };

        let path = write_analysis(&result, dir.path(), &stamp).await.unwrap();
        assert_eq!(path, dir.path().join("2025-09-21").join("093000.json"));

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["source"]["kind"], "sample");
        assert_eq!(written["analyzer"], "rule");
        let top = written["top_keywords"].as_array().unwrap();
        assert!(!top.is_empty() && top.len() <= 20);
    }
}
