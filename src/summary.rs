use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ConvertError;

/// A (category, file) pair left out of the tables.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRecord {
    pub file: String,
    pub category: String,
    pub reason: String,
}

/// What a conversion run did.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub project: Option<String>,
    pub input_dir: String,
    pub output_dir: String,

    pub files: Vec<String>,
    pub bands: usize,
    pub categories: usize,

    // rows per table, header rows excluded
    pub rows_written: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl RunSummary {
    pub fn new(input_dir: &Path, output_dir: &Path) -> Self {
        RunSummary {
            generated_at: Utc::now(),
            input_dir: input_dir.display().to_string(),
            output_dir: output_dir.display().to_string(),
            ..Default::default()
        }
    }

    /// Records a file dropped from a category block.
    pub fn skip(&mut self, file: &str, category: &str, err: &ConvertError) {
        self.skipped.push(SkippedRecord {
            file: file.to_string(),
            category: category.to_string(),
            reason: err.to_string(),
        });
    }

    /// Set the project the run belongs to
    pub fn with_project(mut self, project: &str) -> Self {
        self.project = Some(project.to_string());
        self
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}
