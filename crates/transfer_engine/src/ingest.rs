use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use transfer_logging::{transfer_debug, transfer_trace};

use crate::{Batch, CsvRecord, COLUMN_COUNT};

const CSV_SUFFIX: &str = ".csv";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("CSV file is empty or has no header.")]
    EmptyFile,
    #[error("No valid data found in the CSV file.")]
    NoData,
    #[error("Expected 8 columns, but got {found} on line {line}.")]
    ColumnMismatch { line: u64, found: usize },
    #[error("Malformed CSV: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Error reading directory {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("Error reading CSV file {}: {source}", path.display())]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("Value error: {0}")]
    Parse(#[from] ParseError),
}

/// Returns the `*.csv` file in `dir` with the newest modification time.
///
/// Only immediate children are considered and the suffix match is
/// case-sensitive. When several files share the newest timestamp the winner
/// depends on directory listing order.
pub fn find_latest_csv(dir: &Path) -> Result<Option<PathBuf>, IngestError> {
    let entries = fs::read_dir(dir).map_err(|source| IngestError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let latest = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(CSV_SUFFIX))
        })
        .filter_map(|entry| {
            let path = entry.path();
            // Follows symlinks; entries that vanish mid-scan are skipped.
            let meta = fs::metadata(&path).ok()?;
            if !meta.is_file() {
                return None;
            }
            let modified = meta.modified().ok()?;
            Some((modified, path))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path);

    transfer_trace!("Latest CSV in {:?}: {:?}", dir, latest);
    Ok(latest)
}

/// Reads and parses `path` into a [`Batch`].
pub fn parse_csv_file(path: &Path) -> Result<Batch, IngestError> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => IngestError::NotFound {
            path: path.to_path_buf(),
        },
        _ => IngestError::ReadFile {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let modified = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .unwrap_or_else(|_| SystemTime::now());

    let records = parse_csv_str(&text)?;
    transfer_debug!("Parsed {} record(s) from {:?}", records.len(), path);
    Ok(Batch::new(path.to_path_buf(), modified, records))
}

/// Parses CSV text: the first line is a header and is discarded, even when
/// blank; each later row keeps its first [`COLUMN_COUNT`] fields, trimmed and
/// stripped of NUL characters. Rows that end up entirely empty are dropped.
pub fn parse_csv_str(text: &str) -> Result<Vec<CsvRecord>, ParseError> {
    if text.is_empty() {
        return Err(ParseError::EmptyFile);
    }
    // The reader skips empty lines, so the header line is cut off here.
    let body = text.split_once('\n').map_or("", |(_header, rest)| rest);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());
    let rows = reader.records();

    let mut records = Vec::new();
    for row in rows {
        let row = row.map_err(|err| ParseError::Malformed(err.to_string()))?;
        let cells: Vec<String> = row
            .iter()
            .take(COLUMN_COUNT)
            .map(|cell| cell.trim().replace('\0', ""))
            .collect();

        if cells.iter().all(String::is_empty) {
            continue;
        }

        let found = cells.len();
        let cells: [String; COLUMN_COUNT] =
            cells.try_into().map_err(|_| ParseError::ColumnMismatch {
                line: row.position().map_or(0, |pos| pos.line() + 1),
                found,
            })?;
        records.push(CsvRecord::new(cells));
    }

    if records.is_empty() {
        return Err(ParseError::NoData);
    }
    Ok(records)
}
