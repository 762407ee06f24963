//! CSV review dataset loading and result export.
//!
//! Datasets arrive in inconsistent shapes: some carry a named text column
//! (`content`, `Singlish`, `cleaned_review`), some are headerless single-column
//! dumps, and one export is UTF-16 with broken rows mixed in. This module
//! normalizes all of them to a plain list of review strings, and writes
//! analyzed results back out with an optional UTF-8 BOM so spreadsheet tools
//! render Sinhala script correctly.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// UTF-8 byte-order marker, expected by common spreadsheet tools.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Which column of the CSV holds the review text.
#[derive(Debug, Clone)]
pub enum TextColumn {
    /// A named column in a file with headers.
    Named(String),
    /// A zero-based column index in a headerless file.
    Index(usize),
}

impl TextColumn {
    /// Convenience constructor for [`TextColumn::Named`].
    pub fn named(name: &str) -> Self {
        TextColumn::Named(name.to_string())
    }
}

/// Input text encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 (with or without BOM).
    #[default]
    Utf8,
    /// UTF-16, BOM-aware (little-endian when no BOM is present).
    Utf16,
}

/// Options controlling how a review CSV is read.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Input encoding.
    pub encoding: Encoding,
    /// Whether the first row is a header row.
    pub has_headers: bool,
    /// Skip records that fail to parse instead of failing the whole load.
    pub skip_bad_rows: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            has_headers: true,
            skip_bad_rows: false,
        }
    }
}

/// One analyzed review as persisted to CSV.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzedRow {
    /// The review as it appeared in the input.
    pub text: String,
    /// The cleaned form that was classified.
    pub cleaned_text: String,
    /// Final sentiment label, e.g. `POSITIVE (Verified)`.
    pub sentiment: String,
}

fn decode(bytes: Vec<u8>, encoding: Encoding) -> String {
    match encoding {
        Encoding::Utf8 => {
            let mut text = String::from_utf8_lossy(&bytes).into_owned();
            if text.starts_with('\u{feff}') {
                text.remove(0);
            }
            text
        }
        Encoding::Utf16 => {
            let (body, big_endian) = match bytes.as_slice() {
                [0xfe, 0xff, rest @ ..] => (rest, true),
                [0xff, 0xfe, rest @ ..] => (rest, false),
                rest => (rest, false),
            };
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| {
                    if big_endian {
                        u16::from_be_bytes([pair[0], pair[1]])
                    } else {
                        u16::from_le_bytes([pair[0], pair[1]])
                    }
                })
                .collect();
            let mut text = String::from_utf16_lossy(&units);
            if body.len() % 2 != 0 {
                log::warn!("UTF-16 input ends in an odd trailing byte; file may be truncated");
                text.push('\u{fffd}');
            }
            text
        }
    }
}

fn read_to_string(path: &Path, encoding: Encoding) -> Result<String> {
    let mut file = File::open(path).map_err(|e| {
        PipelineError::Dataset(format!("Error loading file '{}': {e}", path.display()))
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(decode(bytes, encoding))
}

/// Load the text column of a review dataset.
///
/// Rows whose text cell is empty or whitespace-only are dropped.
/// A missing file, column name, or out-of-range column index is a terminal
/// [`PipelineError::Dataset`]; with
/// `skip_bad_rows` set, malformed records are skipped instead of aborting.
///
/// # Examples
///
/// ```rust,no_run
/// use singlish_sentiment::dataset::{load_reviews, ReadOptions, TextColumn};
///
/// # fn main() -> singlish_sentiment::error::Result<()> {
/// let reviews = load_reviews(
///     "Alibaba.csv".as_ref(),
///     &TextColumn::named("content"),
///     &ReadOptions::default(),
/// )?;
/// println!("loaded {} reviews", reviews.len());
/// # Ok(())
/// # }
/// ```
pub fn load_reviews(path: &Path, column: &TextColumn, options: &ReadOptions) -> Result<Vec<String>> {
    let content = read_to_string(path, options.encoding)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(options.has_headers)
        .from_reader(content.as_bytes());

    let column_index = match column {
        TextColumn::Named(name) => {
            if !options.has_headers {
                return Err(PipelineError::Dataset(format!(
                    "Column '{name}' requested but the file was read without headers"
                )));
            }
            let headers = reader.headers()?.clone();
            headers.iter().position(|h| h == name).ok_or_else(|| {
                PipelineError::Dataset(format!(
                    "Column '{}' not found. Available columns: [{}]",
                    name,
                    headers.iter().collect::<Vec<_>>().join(", ")
                ))
            })?
        }
        TextColumn::Index(i) => *i,
    };

    let mut reviews = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                if options.skip_bad_rows {
                    skipped += 1;
                    continue;
                }
                return Err(e.into());
            }
        };
        match record.get(column_index) {
            Some(cell) if !cell.trim().is_empty() => reviews.push(cell.to_string()),
            Some(_) => {}
            None => {
                return Err(PipelineError::Dataset(format!(
                    "Column index {column_index} out of range for a {}-column record",
                    record.len()
                )));
            }
        }
    }

    if skipped > 0 {
        log::warn!("skipped {skipped} malformed rows in {}", path.display());
    }
    log::info!("loaded {} reviews from {}", reviews.len(), path.display());

    Ok(reviews)
}

/// Write analyzed rows to CSV.
///
/// With `bom` set, a UTF-8 byte-order marker is prepended so the file opens
/// correctly in spreadsheet tools.
pub fn write_analyzed(path: &Path, rows: &[AnalyzedRow], bom: bool) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        PipelineError::Dataset(format!("Error creating file '{}': {e}", path.display()))
    })?;
    if bom {
        file.write_all(UTF8_BOM)?;
    }

    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    log::info!("wrote {} analyzed rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read back a CSV produced by [`write_analyzed`]. Tolerates a leading BOM.
pub fn read_analyzed(path: &Path) -> Result<Vec<AnalyzedRow>> {
    let content = read_to_string(path, Encoding::Utf8)?;
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_named_column_and_drops_blanks() {
        let file = write_temp(b"id,content\n1,niyamai app\n2,\n3,   \n4,slow delivery\n");
        let reviews = load_reviews(
            file.path(),
            &TextColumn::named("content"),
            &ReadOptions::default(),
        )
        .unwrap();
        assert_eq!(reviews, vec!["niyamai app", "slow delivery"]);
    }

    #[test]
    fn missing_column_lists_available_columns() {
        let file = write_temp(b"a,b\n1,2\n");
        let err = load_reviews(
            file.path(),
            &TextColumn::named("content"),
            &ReadOptions::default(),
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Column 'content' not found"), "{msg}");
        assert!(msg.contains("[a, b]"), "{msg}");
    }

    #[test]
    fn out_of_range_index_is_a_dataset_error() {
        let file = write_temp(b"only,two\ncolumns,here\n");
        let options = ReadOptions {
            has_headers: false,
            ..ReadOptions::default()
        };
        let err = load_reviews(file.path(), &TextColumn::Index(5), &options).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Column index 5 out of range"), "{msg}");
        assert!(msg.contains("2-column"), "{msg}");
    }

    #[test]
    fn odd_trailing_utf16_byte_becomes_replacement_char() {
        let mut bytes = vec![0xff, 0xfe];
        for unit in "ab".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.push(0x41); // stray half of a code unit
        let decoded = decode(bytes, Encoding::Utf16);
        assert_eq!(decoded, "ab\u{fffd}");
    }

    #[test]
    fn missing_file_is_a_dataset_error() {
        let err = load_reviews(
            "definitely-not-here.csv".as_ref(),
            &TextColumn::Index(0),
            &ReadOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Error loading file"));
    }

    #[test]
    fn loads_headerless_first_column() {
        let file = write_temp("app eka maru\n\u{0DC3}\u{0DD4}\u{0DB4}\u{0DBB}\n".as_bytes());
        let options = ReadOptions {
            has_headers: false,
            ..ReadOptions::default()
        };
        let reviews = load_reviews(file.path(), &TextColumn::Index(0), &options).unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0], "app eka maru");
    }

    #[test]
    fn reads_utf16_with_bom() {
        let text = "Singlish\nniyamai service\n";
        let mut bytes = vec![0xff, 0xfe];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let file = write_temp(&bytes);
        let options = ReadOptions {
            encoding: Encoding::Utf16,
            ..ReadOptions::default()
        };
        let reviews = load_reviews(file.path(), &TextColumn::named("Singlish"), &options).unwrap();
        assert_eq!(reviews, vec!["niyamai service"]);
    }

    #[test]
    fn skips_bad_rows_when_asked() {
        // Middle record has the wrong field count.
        let data = b"text,score\nfine,1\nbad,1,2,3\nalso fine,2\n";

        let strict = load_reviews(
            write_temp(data).path(),
            &TextColumn::named("text"),
            &ReadOptions::default(),
        );
        assert!(strict.is_err());

        let options = ReadOptions {
            skip_bad_rows: true,
            ..ReadOptions::default()
        };
        let reviews =
            load_reviews(write_temp(data).path(), &TextColumn::named("text"), &options).unwrap();
        assert_eq!(reviews, vec!["fine", "also fine"]);
    }

    #[test]
    fn round_trip_preserves_rows_and_sentiment() {
        let rows = vec![
            AnalyzedRow {
                text: "Delivery eka niyamai, thanks!".into(),
                cleaned_text: "delivery eka niyamai thanks".into(),
                sentiment: "POSITIVE (Verified)".into(),
            },
            AnalyzedRow {
                text: "it was okay I guess".into(),
                cleaned_text: "it was okay i guess".into(),
                sentiment: "NEUTRAL".into(),
            },
        ];

        let file = tempfile::NamedTempFile::new().unwrap();
        write_analyzed(file.path(), &rows, false).unwrap();
        let read_back = read_analyzed(file.path()).unwrap();

        assert_eq!(read_back.len(), rows.len());
        assert_eq!(read_back, rows);
    }

    #[test]
    fn bom_output_reads_back_unchanged() {
        let rows = vec![AnalyzedRow {
            text: "හොඳයි".into(),
            cleaned_text: "හොඳයි".into(),
            sentiment: "POSITIVE".into(),
        }];

        let file = tempfile::NamedTempFile::new().unwrap();
        write_analyzed(file.path(), &rows, true).unwrap();

        let mut raw = Vec::new();
        File::open(file.path()).unwrap().read_to_end(&mut raw).unwrap();
        assert!(raw.starts_with(UTF8_BOM));

        assert_eq!(read_analyzed(file.path()).unwrap(), rows);
    }
}
