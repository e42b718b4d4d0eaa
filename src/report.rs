//! Assembles the third octave and octave tables from a directory of dumps.
//!
//! Each category is written as its own block: the header rows first, then one
//! row per source file in both tables.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::{info, warn};

use crate::error::{ConvertError, Result};
use crate::input::{list_dump_files, source_name};
use crate::octave::{format_level, octave_band, parse_levels};
use crate::output::ReportTables;
use crate::parser::{
    BandHeader, CATEGORIES, Category, CategoryValues, extract_band_header, scan_category,
};
use crate::summary::RunSummary;

/// What to do when a dump lacks a record some category needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MissingRecordPolicy {
    /// Stop the whole run.
    #[default]
    Abort,
    /// Log the file, leave it out of that category block and carry on.
    Skip,
}

#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Process dumps in file-name order instead of directory order.
    pub sorted: bool,
    pub missing_records: MissingRecordPolicy,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            sorted: true,
            missing_records: MissingRecordPolicy::Abort,
        }
    }
}

/// One row of the third octave table.
#[derive(Debug, Clone, PartialEq)]
pub struct ThirdOctaveRow {
    pub source: String,
    pub category: &'static str,
    pub dba: String,
    pub values: Vec<String>,
}

impl ThirdOctaveRow {
    pub fn to_record(&self) -> Vec<String> {
        let mut record = vec![self.source.clone(), self.category.to_string(), self.dba.clone()];
        record.extend(self.values.iter().cloned());
        record
    }
}

/// One row of the octave table.
#[derive(Debug, Clone, PartialEq)]
pub struct OctaveRow {
    pub source: String,
    pub category: &'static str,
    pub dba: String,
    pub values: Vec<f64>,
}

impl OctaveRow {
    pub fn to_record(&self) -> Vec<String> {
        let mut record = vec![self.source.clone(), self.category.to_string(), self.dba.clone()];
        record.extend(self.values.iter().map(|v| format_level(*v)));
        record
    }
}

/// Builds both rows for one file from its category records.
pub fn build_rows(
    source: &str,
    category: &Category,
    records: CategoryValues,
) -> Result<(ThirdOctaveRow, OctaveRow)> {
    let levels = parse_levels(records.values.as_slice())?;
    let octave = octave_band(&levels)?;

    let third_row = ThirdOctaveRow {
        source: source.to_string(),
        category: category.name,
        dba: records.dba.clone(),
        values: records.values,
    };
    let octave_row = OctaveRow {
        source: source.to_string(),
        category: category.name,
        dba: records.dba,
        values: octave,
    };
    Ok((third_row, octave_row))
}

/// Scans the dump at `path` and builds its rows for `category`.
pub fn convert_file(path: &Path, category: &Category) -> Result<(ThirdOctaveRow, OctaveRow)> {
    let records = scan_category(path, category)?;
    build_rows(&source_name(path), category, records)
}

/// Writes every category block for `files` into `tables`.
pub fn write_report<W: Write>(
    files: &[PathBuf],
    header: &BandHeader,
    tables: &mut ReportTables<W>,
    options: &ConvertOptions,
    summary: &mut RunSummary,
) -> Result<()> {
    for category in &CATEGORIES {
        info!(category = category.name, "Generating data");
        tables.write_headers(header)?;

        for path in files {
            let source = source_name(path);
            info!(file = %source, "Generating data from file");

            match convert_file(path, category) {
                Ok((third, octave)) => {
                    tables.write_rows(&third, &octave)?;
                    summary.rows_written += 1;
                }
                Err(err @ ConvertError::MissingRecord { .. })
                    if options.missing_records == MissingRecordPolicy::Skip =>
                {
                    warn!(file = %source, category = category.name, error = %err, "Skipping file");
                    summary.skip(&source, category.name, &err);
                }
                Err(err) => return Err(err),
            }
        }
    }

    summary.categories = CATEGORIES.len();
    Ok(())
}

/// Converts every dump in `input_dir` into the two tables in `output_dir`.
///
/// The band header comes from the first dump. Nothing is written when that
/// dump has no header line.
#[tracing::instrument(
    skip_all,
    fields(input_dir = %input_dir.display(), output_dir = %output_dir.display())
)]
pub fn convert_directory(
    input_dir: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
) -> Result<RunSummary> {
    let files = list_dump_files(input_dir, options.sorted)?;
    info!(count = files.len(), "Dump files found");

    let header = extract_band_header(&files[0])?;
    info!(bands = ?header.bands(), "Third octave band");

    let mut summary = RunSummary::new(input_dir, output_dir);
    summary.files = files.iter().map(|p| source_name(p)).collect();
    summary.bands = header.bands().len();

    let mut tables = ReportTables::create(output_dir)?;
    write_report(&files, &header, &mut tables, options, &mut summary)?;
    tables.flush()?;

    info!(
        rows = summary.rows_written,
        skipped = summary.skipped.len(),
        output_dir = %output_dir.display(),
        "Files written"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEQ: Category = CATEGORIES[0];

    fn records() -> CategoryValues {
        CategoryValues {
            values: ["40.1", "38.2", "41.0", "44.0", "44.0", "44.0"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            dba: "45.3".to_string(),
        }
    }

    #[test]
    fn test_build_rows() {
        let (third, octave) = build_rows("a.txt", &LEQ, records()).unwrap();

        assert_eq!(
            third.to_record(),
            vec!["a.txt", "Leq_third", "45.3", "40.1", "38.2", "41.0", "44.0", "44.0", "44.0"]
        );

        let expected = 10.0 * (10f64.powf(4.01) + 10f64.powf(3.82) + 10f64.powf(4.10)).log10();
        assert_eq!(octave.values.len(), 2);
        assert!((octave.values[0] - expected).abs() < 1e-9);
        assert_eq!(&octave.to_record()[..3], &["a.txt", "Leq_third", "45.3"]);
    }

    #[test]
    fn test_build_rows_rejects_bad_level() {
        let mut bad = records();
        bad.values[4] = "--".to_string();

        assert!(matches!(
            build_rows("a.txt", &LEQ, bad),
            Err(ConvertError::MalformedNumber(_))
        ));
    }

    #[test]
    fn test_build_rows_rejects_partial_triple() {
        let mut short = records();
        short.values.pop();

        assert!(matches!(
            build_rows("a.txt", &LEQ, short),
            Err(ConvertError::NotTriples(5))
        ));
    }

    #[test]
    fn test_default_options() {
        let options = ConvertOptions::default();

        assert!(options.sorted);
        assert_eq!(options.missing_records, MissingRecordPolicy::Abort);
    }
}
