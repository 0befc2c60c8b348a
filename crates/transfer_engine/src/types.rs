use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

use crate::ingest::IngestError;

/// Number of positional fields every record carries.
pub const COLUMN_COUNT: usize = 8;

/// One cleaned CSV row: exactly [`COLUMN_COUNT`] trimmed cells without NUL bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    cells: [String; COLUMN_COUNT],
}

impl CsvRecord {
    pub fn new(cells: [String; COLUMN_COUNT]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[String; COLUMN_COUNT] {
        &self.cells
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(String::is_empty)
    }
}

impl<S: Into<String>> From<[S; COLUMN_COUNT]> for CsvRecord {
    fn from(cells: [S; COLUMN_COUNT]) -> Self {
        Self::new(cells.map(Into::into))
    }
}

/// Records parsed from one file, tied to that file and its modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    path: PathBuf,
    modified: SystemTime,
    records: Vec<CsvRecord>,
}

impl Batch {
    pub fn new(path: PathBuf, modified: SystemTime, records: Vec<CsvRecord>) -> Self {
        Self {
            path,
            modified,
            records,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn records(&self) -> &[CsvRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Connect,
    Encode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Connect => write!(f, "connection failed"),
            FailureKind::Encode => write!(f, "payload encoding failed"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error sending data to API ({kind}): {message}")]
pub struct TransferError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransferError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Connected,
    Disconnected,
}

/// Outcome of a reachability probe. `fault` is diagnostic only; callers that
/// only care about connectivity can ignore it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reachability {
    pub status: Connectivity,
    pub fault: Option<FailureKind>,
}

impl Reachability {
    pub fn connected() -> Self {
        Self {
            status: Connectivity::Connected,
            fault: None,
        }
    }

    pub fn disconnected(fault: FailureKind) -> Self {
        Self {
            status: Connectivity::Disconnected,
            fault: Some(fault),
        }
    }
}

/// A batch accepted by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub records: usize,
    pub response: String,
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

#[derive(Debug)]
pub enum EngineEvent {
    ScanCompleted {
        dir: PathBuf,
        result: Result<Option<PathBuf>, IngestError>,
    },
    /// Pretty JSON for a parsed file, sent just before it is posted.
    PayloadRendered { path: PathBuf, payload: String },
    IngestCompleted {
        path: PathBuf,
        result: Result<Submission, CycleError>,
    },
    ProbeCompleted(Reachability),
}
