//! Locating and decoding dump files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConvertError, Result};

/// Lists the dump files in `dir`.
///
/// Subdirectories and dot-files are ignored. With `sorted` the paths come back
/// in lexicographic file-name order, otherwise in whatever order the
/// filesystem enumerates them.
pub fn list_dump_files(dir: &Path, sorted: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if hidden || !path.is_file() {
            debug!(path = %path.display(), "Skipping non-dump entry");
            continue;
        }

        files.push(path);
    }

    if files.is_empty() {
        return Err(ConvertError::NoInputFiles(dir.to_path_buf()));
    }

    if sorted {
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }

    Ok(files)
}

/// Decodes Latin-1 bytes. Every byte maps to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Reads a whole dump file as Latin-1 text.
pub fn read_latin1(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(decode_latin1(&bytes))
}

/// File name used to label rows coming from `path`.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
