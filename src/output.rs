//! CSV persistence for the third octave and octave tables.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{Terminator, Writer, WriterBuilder};
use tracing::{debug, info};

use crate::error::Result;
use crate::parser::BandHeader;
use crate::report::{OctaveRow, ThirdOctaveRow};
use crate::summary::RunSummary;

/// File name of the third octave table.
pub const THIRD_OCTAVE_FILE: &str = "third_octave.csv";

/// File name of the octave table.
pub const OCTAVE_FILE: &str = "octave.csv";

fn table_writer<W: Write>(inner: W) -> Writer<W> {
    WriterBuilder::new()
        .has_headers(false)
        .flexible(true) // header blocks and files may differ in band count
        .terminator(Terminator::CRLF)
        .from_writer(inner)
}

/// The pair of output tables, written strictly by append.
pub struct ReportTables<W: Write> {
    third: Writer<W>,
    octave: Writer<W>,
}

impl ReportTables<File> {
    /// Creates (or truncates) both tables inside `dir`.
    pub fn create(dir: &Path) -> Result<Self> {
        let third_path = dir.join(THIRD_OCTAVE_FILE);
        let octave_path = dir.join(OCTAVE_FILE);
        debug!(third = %third_path.display(), octave = %octave_path.display(), "Creating tables");

        Ok(Self::from_writers(
            File::create(third_path)?,
            File::create(octave_path)?,
        ))
    }
}

impl<W: Write> ReportTables<W> {
    pub fn from_writers(third: W, octave: W) -> Self {
        Self {
            third: table_writer(third),
            octave: table_writer(octave),
        }
    }

    /// Starts a category block with the header row of each table.
    pub fn write_headers(&mut self, header: &BandHeader) -> Result<()> {
        self.third.write_record(header.labels())?;
        self.octave.write_record(header.octave_labels())?;
        Ok(())
    }

    /// Appends the rows for one source file.
    pub fn write_rows(&mut self, third: &ThirdOctaveRow, octave: &OctaveRow) -> Result<()> {
        self.third.write_record(third.to_record())?;
        self.octave.write_record(octave.to_record())?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.third.flush()?;
        self.octave.flush()?;
        Ok(())
    }

    /// Flushes and hands back the underlying writers.
    pub fn into_inner(self) -> Result<(W, W)> {
        let third = self.third.into_inner().map_err(|e| e.into_error())?;
        let octave = self.octave.into_inner().map_err(|e| e.into_error())?;
        Ok((third, octave))
    }
}

/// Paths of both tables inside `dir`.
pub fn table_paths(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join(THIRD_OCTAVE_FILE), dir.join(OCTAVE_FILE))
}

/// Logs a run summary as pretty-printed JSON.
pub fn print_json(summary: &RunSummary) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> BandHeader {
        let bands = ["25", "31.5", "40", "50", "63", "80"];
        BandHeader::from_bands(bands.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn rows() -> (ThirdOctaveRow, OctaveRow) {
        let third = ThirdOctaveRow {
            source: "a.txt".to_string(),
            category: "Leq_third",
            dba: "45.3".to_string(),
            values: vec!["40.1".to_string(), "38.2".to_string(), "41.0".to_string()],
        };
        let octave = OctaveRow {
            source: "a.txt".to_string(),
            category: "Leq_third",
            dba: "45.3".to_string(),
            values: vec![44.5],
        };
        (third, octave)
    }

    #[test]
    fn test_headers_and_rows() {
        let mut tables = ReportTables::from_writers(Vec::new(), Vec::new());
        let (third, octave) = rows();

        tables.write_headers(&header()).unwrap();
        tables.write_rows(&third, &octave).unwrap();
        let (third_out, octave_out) = tables.into_inner().unwrap();

        assert_eq!(
            String::from_utf8(third_out).unwrap(),
            ",,dBA,25,31.5,40,50,63,80\r\na.txt,Leq_third,45.3,40.1,38.2,41.0\r\n"
        );
        assert_eq!(
            String::from_utf8(octave_out).unwrap(),
            ",,dBA,31.5,63\r\na.txt,Leq_third,45.3,44.5\r\n"
        );
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let mut tables = ReportTables::from_writers(Vec::new(), Vec::new());
        let (mut third, mut octave) = rows();
        third.source = "site 1, north.txt".to_string();
        octave.source = third.source.clone();

        tables.write_rows(&third, &octave).unwrap();
        let (third_out, _) = tables.into_inner().unwrap();

        assert!(
            String::from_utf8(third_out)
                .unwrap()
                .starts_with("\"site 1, north.txt\",Leq_third")
        );
    }

    #[test]
    fn test_create_truncates_existing_tables() {
        let dir = tempfile::tempdir().unwrap();
        let (third_path, _) = table_paths(dir.path());
        std::fs::write(&third_path, "stale\r\n").unwrap();

        let mut tables = ReportTables::create(dir.path()).unwrap();
        tables.write_headers(&header()).unwrap();
        tables.flush().unwrap();

        let content = std::fs::read_to_string(&third_path).unwrap();
        assert!(!content.contains("stale"));
        assert!(content.starts_with(",,dBA"));
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&RunSummary::default()).unwrap();
    }
}
