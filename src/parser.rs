//! Line-marker parser for sound level meter text dumps.
//!
//! Every interesting line in a dump starts with a one-character prefix and a
//! numeric marker (`#174,...`). The marker alone decides what the line holds;
//! everything after the first comma is the payload.

use std::path::Path;

use tracing::{debug, trace};

use crate::error::{ConvertError, Result};
use crate::input::read_latin1;

/// Marker of the line that lists the third octave band centre frequencies.
pub const HEADER_MARKER: u16 = 174;

/// Columns that precede the band labels in the third octave table.
pub const LEADING_COLUMNS: [&str; 3] = ["", "", "dBA"];

/// One measurement category: where its band levels and its A-weighted level live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Marker of the line holding the third octave band levels.
    pub third_octave_marker: u16,
    /// Label written in the second column of every data row.
    pub name: &'static str,
    /// Marker of the line holding the single dBA level.
    pub dba_marker: u16,
}

/// The categories converted on every run, in output order.
pub const CATEGORIES: [Category; 3] = [
    Category {
        third_octave_marker: 172,
        name: "Leq_third",
        dba_marker: 11,
    },
    Category {
        third_octave_marker: 188,
        name: "Max_third",
        dba_marker: 19,
    },
    Category {
        third_octave_marker: 173,
        name: "Min_third",
        dba_marker: 17,
    },
];

/// Splits a dump line into tokens.
///
/// Drops line terminators and every `Hz`, turns `/ ` into a decimal point,
/// removes all spaces and splits on commas.
pub fn normalize(line: &str) -> Vec<String> {
    let flat = line
        .replace(['\r', '\n'], "")
        .replace("Hz", "")
        .replace("/ ", ".")
        .replace(' ', "");

    strip_units(flat)
        .split(',')
        .map(str::to_string)
        .collect()
}

// Dropping spaces or an inner `Hz` can join a new `Hz` ("H z", "HHzz").
fn strip_units(mut s: String) -> String {
    while s.contains("Hz") {
        s = s.replace("Hz", "");
    }
    s
}

/// Marker of `line`, or `None` when the line is not a record.
pub fn marker_of(line: &str) -> Option<f64> {
    let tokens = normalize(line);
    let first = tokens.first()?;

    let mut chars = first.chars();
    chars.next()?;
    chars.as_str().parse::<f64>().ok()
}

fn has_marker(line: &str, marker: u16) -> bool {
    marker_of(line) == Some(f64::from(marker))
}

/// Column labels of the third octave table.
#[derive(Debug, Clone, PartialEq)]
pub struct BandHeader {
    labels: Vec<String>,
}

impl BandHeader {
    /// Builds the header from the band labels of a header line.
    ///
    /// A single trailing empty label (from a trailing comma) is dropped when it
    /// is what breaks the triples. Returns `None` when the labels still cannot
    /// be grouped into octave triples.
    pub fn from_bands(mut bands: Vec<String>) -> Option<Self> {
        if bands.len() % 3 == 1 && bands.last().is_some_and(|b| b.is_empty()) {
            bands.pop();
        }
        if bands.len() % 3 != 0 {
            return None;
        }

        let mut labels: Vec<String> = LEADING_COLUMNS.iter().map(|s| s.to_string()).collect();
        labels.extend(bands);
        Some(Self { labels })
    }

    /// The full row: leading columns followed by every band label.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Band labels only.
    pub fn bands(&self) -> &[String] {
        &self.labels[LEADING_COLUMNS.len()..]
    }

    /// Header row for the octave table.
    ///
    /// Keeps the leading columns and takes the middle label of each band
    /// triple as the label of that octave.
    pub fn octave_labels(&self) -> Vec<String> {
        let mut labels = self.labels[..LEADING_COLUMNS.len()].to_vec();
        labels.extend(self.bands().chunks(3).map(|triple| triple[1].clone()));
        labels
    }
}

/// Band labels from the first header line in `text`.
pub fn find_band_labels(text: &str) -> Option<Vec<String>> {
    text.lines()
        .find(|line| has_marker(line, HEADER_MARKER))
        .map(|line| normalize(line).split_off(1))
}

/// Reads the band header from the dump at `path`.
#[tracing::instrument(skip_all, fields(file = %path.display()))]
pub fn extract_band_header(path: &Path) -> Result<BandHeader> {
    let text = read_latin1(path)?;

    let bands =
        find_band_labels(&text).ok_or_else(|| ConvertError::HeaderNotFound(path.to_path_buf()))?;
    let count = bands.len();

    BandHeader::from_bands(bands).ok_or_else(|| ConvertError::MisalignedHeader {
        file: path.to_path_buf(),
        bands: count,
    })
}

/// What one pass over a dump found for a category.
///
/// A record seen more than once keeps its last occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryScan {
    pub values: Option<Vec<String>>,
    pub dba: Option<String>,
}

/// The records a category needs, all present.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryValues {
    pub values: Vec<String>,
    pub dba: String,
}

impl CategoryScan {
    /// Scans `text` for the records of `category`.
    ///
    /// `file` only labels errors.
    pub fn scan(text: &str, category: &Category, file: &Path) -> Result<Self> {
        let mut scan = Self::default();

        for line in text.lines() {
            let Some(marker) = marker_of(line) else {
                continue;
            };

            if marker == f64::from(category.third_octave_marker) {
                scan.values = Some(normalize(line).split_off(1));
            }
            if marker == f64::from(category.dba_marker) {
                let dba = normalize(line).into_iter().nth(1).ok_or_else(|| {
                    ConvertError::MalformedRecord {
                        file: file.to_path_buf(),
                        marker: category.dba_marker,
                    }
                })?;
                scan.dba = Some(dba);
            }
        }

        trace!(
            values = scan.values.is_some(),
            dba = scan.dba.is_some(),
            "Scan finished"
        );
        Ok(scan)
    }

    /// Fails with [`ConvertError::MissingRecord`] for the first absent record.
    pub fn require(self, category: &Category, file: &Path) -> Result<CategoryValues> {
        let missing = |marker| ConvertError::MissingRecord {
            file: file.to_path_buf(),
            marker,
        };

        let values = self.values.ok_or_else(|| missing(category.third_octave_marker))?;
        let dba = self.dba.ok_or_else(|| missing(category.dba_marker))?;
        Ok(CategoryValues { values, dba })
    }
}

/// Reads the dump at `path` and collects the records of `category`.
#[tracing::instrument(skip_all, fields(file = %path.display(), category = category.name))]
pub fn scan_category(path: &Path, category: &Category) -> Result<CategoryValues> {
    let text = read_latin1(path)?;
    let scan = CategoryScan::scan(&text, category, path)?;
    let values = scan.require(category, path)?;

    debug!(bands = values.values.len(), dba = %values.dba, "Category records found");
    Ok(values)
}
