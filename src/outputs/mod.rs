//! Output generation for analysis results.
//!
//! # Submodules
//!
//! - [`json`]: Writes [`AnalysisResult`](crate::pipeline::AnalysisResult) as JSON for renderers
//! - [`markdown`]: Renders the same result as a readable report
//! - [`indexes`]: Maintains the report index so runs can be browsed by date
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-09-21/
//!     ├── 093000.json
//!     └── 181500.json
//!
//! markdown_output_dir/
//! ├── 2025-09-21_093000.md
//! ├── 2025-09-21_181500.md
//! └── reports.md            # Index of every report
//! ```

pub mod indexes;
pub mod json;
pub mod markdown;

use chrono::{Local, NaiveDate};

/// Identifies one analysis run in output file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp {
    pub date: NaiveDate,
    /// Time of day as `HHMMSS`.
    pub label: String,
}

impl RunStamp {
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            date: now.date_naive(),
            label: now.format("%H%M%S").to_string(),
        }
    }

    pub fn markdown_filename(&self) -> String {
        format!("{}_{}.md", self.date, self.label)
    }
}
