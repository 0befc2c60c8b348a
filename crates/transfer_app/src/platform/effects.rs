use std::sync::{mpsc, Arc};

use transfer_core::{CycleOutcome, Effect, Msg, NetworkStatus};
use transfer_engine::{Connectivity, EngineEvent, EngineHandle, EventSink, LogStore};
use transfer_logging::{transfer_info, transfer_warn};

use super::app::AppEvent;
use super::config::AppConfig;
use super::ticker::Ticker;

/// Executes core effects: engine work goes to the background worker, log
/// appends and tick-source changes happen on the control thread.
pub struct EffectRunner {
    engine: EngineHandle,
    log_store: LogStore,
    poller: Ticker,
}

impl EffectRunner {
    pub fn new(
        config: &AppConfig,
        log_store: LogStore,
        tx: mpsc::Sender<AppEvent>,
    ) -> anyhow::Result<Self> {
        let sink = Arc::new(MsgSink { tx: tx.clone() });
        let engine = EngineHandle::new(config.transfer_settings(), sink)?;
        Ok(Self::with_engine(config, engine, log_store, tx))
    }

    #[cfg(test)]
    pub fn with_transport(
        config: &AppConfig,
        transport: Arc<dyn transfer_engine::Transport>,
        log_store: LogStore,
        tx: mpsc::Sender<AppEvent>,
    ) -> anyhow::Result<Self> {
        let sink = Arc::new(MsgSink { tx: tx.clone() });
        let engine = EngineHandle::with_transport(transport, sink)?;
        Ok(Self::with_engine(config, engine, log_store, tx))
    }

    fn with_engine(
        config: &AppConfig,
        engine: EngineHandle,
        log_store: LogStore,
        tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        let poller = Ticker::new("poll", config.poll_interval(), Msg::PollTick, tx);
        Self {
            engine,
            log_store,
            poller,
        }
    }

    pub fn log_store(&self) -> &LogStore {
        &self.log_store
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartPolling => self.poller.start(),
                Effect::StopPolling => self.poller.stop(),
                Effect::ScanDirectory { dir } => self.engine.scan(dir),
                Effect::IngestFile { path } => {
                    transfer_info!("Ingesting {:?}", path);
                    self.engine.ingest(path);
                }
                Effect::CheckReachability => self.engine.probe(),
                Effect::AppendLog { message } => self.log_store.append(&message),
            }
        }
    }
}

/// Forwards engine results to the control thread as core messages.
struct MsgSink {
    tx: mpsc::Sender<AppEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(AppEvent::Core(map_event(event)));
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ScanCompleted { result, .. } => match result {
            Ok(found) => Msg::LatestFileFound(found),
            Err(err) => {
                transfer_warn!("Scan failed: {}", err);
                Msg::ScanFailed(err.to_string())
            }
        },
        EngineEvent::PayloadRendered { path, payload } => Msg::PayloadRendered { path, payload },
        EngineEvent::IngestCompleted { path, result } => {
            let outcome = match result {
                Ok(submission) => CycleOutcome::Transferred {
                    records: submission.records,
                    response: submission.response,
                },
                Err(err) => {
                    transfer_warn!("Cycle for {:?} failed: {}", path, err);
                    CycleOutcome::Failed(err.to_string())
                }
            };
            Msg::CycleFinished { path, outcome }
        }
        EngineEvent::ProbeCompleted(reachability) => Msg::ReachabilityChecked {
            status: map_connectivity(reachability.status),
            detail: reachability.fault.map(|fault| fault.to_string()),
        },
    }
}

fn map_connectivity(status: Connectivity) -> NetworkStatus {
    match status {
        Connectivity::Connected => NetworkStatus::Connected,
        Connectivity::Disconnected => NetworkStatus::Disconnected,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use transfer_engine::{CycleError, FailureKind, IngestError, Reachability, Submission};

    use super::*;

    #[test]
    fn successful_ingest_becomes_transferred() {
        let msg = map_event(EngineEvent::IngestCompleted {
            path: PathBuf::from("in/a.csv"),
            result: Ok(Submission {
                records: 3,
                response: "accepted".to_string(),
            }),
        });

        assert_eq!(
            msg,
            Msg::CycleFinished {
                path: PathBuf::from("in/a.csv"),
                outcome: CycleOutcome::Transferred {
                    records: 3,
                    response: "accepted".to_string(),
                },
            }
        );
    }

    #[test]
    fn ingest_error_keeps_its_message() {
        let msg = map_event(EngineEvent::IngestCompleted {
            path: PathBuf::from("gone.csv"),
            result: Err(CycleError::Ingest(IngestError::NotFound {
                path: PathBuf::from("gone.csv"),
            })),
        });

        assert_eq!(
            msg,
            Msg::CycleFinished {
                path: PathBuf::from("gone.csv"),
                outcome: CycleOutcome::Failed("File not found: gone.csv".to_string()),
            }
        );
    }

    #[test]
    fn probe_fault_is_reported_as_detail() {
        let msg = map_event(EngineEvent::ProbeCompleted(Reachability::disconnected(
            FailureKind::HttpStatus(503),
        )));

        assert_eq!(
            msg,
            Msg::ReachabilityChecked {
                status: NetworkStatus::Disconnected,
                detail: Some("http status 503".to_string()),
            }
        );
    }

    #[test]
    fn rendered_payload_is_forwarded() {
        let msg = map_event(EngineEvent::PayloadRendered {
            path: PathBuf::from("in/a.csv"),
            payload: "[]".to_string(),
        });
        assert_eq!(
            msg,
            Msg::PayloadRendered {
                path: PathBuf::from("in/a.csv"),
                payload: "[]".to_string(),
            }
        );
    }

    #[test]
    fn empty_scan_means_no_file() {
        let msg = map_event(EngineEvent::ScanCompleted {
            dir: PathBuf::from("in"),
            result: Ok(None),
        });
        assert_eq!(msg, Msg::LatestFileFound(None));
    }
}
