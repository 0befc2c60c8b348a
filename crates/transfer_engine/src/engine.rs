use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use thiserror::Error;
use transfer_logging::{transfer_debug, transfer_warn};

use crate::ingest::{find_latest_csv, parse_csv_file};
use crate::payload::render_payload;
use crate::transfer::{ReqwestTransport, TransferSettings, Transport};
use crate::{CycleError, EngineEvent, FailureKind, Submission, TransferError};

/// Receives engine results; implemented by the platform layer.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error(transparent)]
    Transport(#[from] TransferError),
}

enum EngineCommand {
    Scan { dir: PathBuf },
    Ingest { path: PathBuf },
    Probe,
}

/// Handle to the background worker. Commands run as independent tasks on a
/// tokio runtime; results are delivered to the [`EventSink`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: TransferSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let transport = Arc::new(ReqwestTransport::new(settings)?);
        Self::with_transport(transport, sink)
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let transport = transport.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    handle_command(transport.as_ref(), command, sink.as_ref()).await;
                });
            }
            transfer_debug!("Engine command channel closed");
        });

        Ok(Self { cmd_tx })
    }

    pub fn scan(&self, dir: impl Into<PathBuf>) {
        self.send(EngineCommand::Scan { dir: dir.into() });
    }

    pub fn ingest(&self, path: impl Into<PathBuf>) {
        self.send(EngineCommand::Ingest { path: path.into() });
    }

    pub fn probe(&self) {
        self.send(EngineCommand::Probe);
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            transfer_warn!("Engine worker is gone; command dropped");
        }
    }
}

async fn handle_command(transport: &dyn Transport, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::Scan { dir } => {
            let result = find_latest_csv(&dir);
            sink.emit(EngineEvent::ScanCompleted { dir, result });
        }
        EngineCommand::Ingest { path } => {
            let result = ingest_and_submit(transport, &path, sink).await;
            sink.emit(EngineEvent::IngestCompleted { path, result });
        }
        EngineCommand::Probe => {
            let reachability = transport.check_reachable().await;
            sink.emit(EngineEvent::ProbeCompleted(reachability));
        }
    }
}

/// Parses `path`, reports the rendered JSON, then submits it. The payload is
/// reported before the POST so it is logged whatever the outcome.
async fn ingest_and_submit(
    transport: &dyn Transport,
    path: &std::path::Path,
    sink: &dyn EventSink,
) -> Result<Submission, CycleError> {
    let batch = parse_csv_file(path)?;
    let payload = render_payload(batch.records())
        .map_err(|err| TransferError::new(FailureKind::Encode, err.to_string()))?;
    sink.emit(EngineEvent::PayloadRendered {
        path: path.to_path_buf(),
        payload,
    });
    let response = transport.submit(&batch).await?;
    Ok(Submission {
        records: batch.len(),
        response,
    })
}
