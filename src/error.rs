//! Error types for dump conversion.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input directory holds no dump files.
    #[error("no dump files found in {}", .0.display())]
    NoInputFiles(PathBuf),

    /// The band-definition line is absent from the first dump.
    #[error("line 174 not found in {} for definition of third octave band", .0.display())]
    HeaderNotFound(PathBuf),

    /// The band labels after the three leading columns do not form whole triples.
    #[error(
        "line 174 in {} has {bands} band labels, leaving a partial octave triple",
        file.display()
    )]
    MisalignedHeader { file: PathBuf, bands: usize },

    /// A per-category line was never seen while scanning a dump.
    #[error("line {marker} not found in {}", file.display())]
    MissingRecord { file: PathBuf, marker: u16 },

    /// A record line was found but lacks the field we need from it.
    #[error("line {marker} in {} has no value field", file.display())]
    MalformedRecord { file: PathBuf, marker: u16 },

    /// A band level token is not a number.
    #[error("'{0}' is not a decibel value")]
    MalformedNumber(String),

    /// Octave aggregation needs whole third-octave triples.
    #[error("{0} third octave values cannot be grouped into octave bands")]
    NotTriples(usize),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type for the conversion library.
pub type Result<T> = std::result::Result<T, ConvertError>;
