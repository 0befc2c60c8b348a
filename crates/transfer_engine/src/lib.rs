//! Transfer engine: CSV ingestion, HTTP transfer, activity log and the
//! background worker that executes effects.
mod engine;
mod ingest;
mod logstore;
mod payload;
mod transfer;
mod types;

pub use engine::{ChannelEventSink, EngineError, EngineHandle, EventSink};
pub use ingest::{find_latest_csv, parse_csv_file, parse_csv_str, IngestError, ParseError};
pub use logstore::{
    partition_for, Clock, LogStore, LogStoreError, PartitionId, PruneReport, DEFAULT_RETENTION,
};
pub use payload::{render_payload, RecordPayload};
pub use transfer::{ReqwestTransport, TlsVerification, TransferSettings, Transport};
pub use types::{
    Batch, Connectivity, CsvRecord, CycleError, EngineEvent, FailureKind, Reachability,
    Submission, TransferError, COLUMN_COUNT,
};
