use std::fs;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use transfer_engine::{
    Batch, ChannelEventSink, Connectivity, CycleError, EngineEvent, EngineHandle, FailureKind,
    IngestError, ParseError, Reachability, TransferError, Transport,
};

#[derive(Default)]
struct FakeTransport {
    submitted: Mutex<Vec<Batch>>,
    reject: bool,
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn submit(&self, batch: &Batch) -> Result<String, TransferError> {
        self.submitted.lock().unwrap().push(batch.clone());
        if self.reject {
            Err(TransferError {
                kind: FailureKind::HttpStatus(503),
                message: "unavailable".to_string(),
            })
        } else {
            Ok(format!("accepted {}", batch.len()))
        }
    }

    async fn check_reachable(&self) -> Reachability {
        Reachability::disconnected(FailureKind::Timeout)
    }
}

fn engine_with(transport: Arc<FakeTransport>) -> (EngineHandle, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel();
    let engine =
        EngineHandle::with_transport(transport, Arc::new(ChannelEventSink::new(tx))).unwrap();
    (engine, rx)
}

fn next_event(rx: &mpsc::Receiver<EngineEvent>) -> EngineEvent {
    rx.recv_timeout(Duration::from_secs(5)).expect("engine event")
}

#[test]
fn scan_reports_latest_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("only.csv"), "h\n").unwrap();
    let (engine, rx) = engine_with(Arc::default());

    engine.scan(temp.path());

    match next_event(&rx) {
        EngineEvent::ScanCompleted { dir, result } => {
            assert_eq!(dir, temp.path());
            assert_eq!(result.unwrap(), Some(temp.path().join("only.csv")));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn ingest_parses_and_submits() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("b.csv");
    fs::write(&path, "h1,h2,h3,h4,h5,h6,h7,h8\n1,2,3,4,5,6,7,8\n,,,,,,,\n").unwrap();
    let transport = Arc::new(FakeTransport::default());
    let (engine, rx) = engine_with(transport.clone());

    engine.ingest(&path);

    match next_event(&rx) {
        EngineEvent::PayloadRendered {
            path: rendered,
            payload,
        } => {
            assert_eq!(rendered, path);
            assert!(payload.contains("\"column_1\": \"1\""));
            assert!(payload.contains("\"column_8\": \"8\""));
        }
        other => panic!("unexpected event {other:?}"),
    }
    match next_event(&rx) {
        EngineEvent::IngestCompleted { path: done, result } => {
            assert_eq!(done, path);
            let submission = result.unwrap();
            assert_eq!(submission.records, 1);
            assert_eq!(submission.response, "accepted 1");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(transport.submitted.lock().unwrap().len(), 1);
}

#[test]
fn parse_failure_skips_submission() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("header_only.csv");
    fs::write(&path, "h1,h2,h3,h4,h5,h6,h7,h8\n").unwrap();
    let transport = Arc::new(FakeTransport::default());
    let (engine, rx) = engine_with(transport.clone());

    engine.ingest(&path);

    match next_event(&rx) {
        EngineEvent::IngestCompleted { result, .. } => {
            assert!(matches!(
                result,
                Err(CycleError::Ingest(IngestError::Parse(ParseError::NoData)))
            ));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(transport.submitted.lock().unwrap().is_empty());
}

#[test]
fn transfer_failure_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("b.csv");
    fs::write(&path, "h\n1,2,3,4,5,6,7,8\n").unwrap();
    let transport = Arc::new(FakeTransport {
        reject: true,
        ..FakeTransport::default()
    });
    let (engine, rx) = engine_with(transport);

    engine.ingest(&path);

    // The payload is reported before the POST, so it survives the rejection.
    assert!(matches!(
        next_event(&rx),
        EngineEvent::PayloadRendered { .. }
    ));
    match next_event(&rx) {
        EngineEvent::IngestCompleted { result, .. } => match result {
            Err(CycleError::Transfer(err)) => assert_eq!(err.kind, FailureKind::HttpStatus(503)),
            other => panic!("unexpected result {other:?}"),
        },
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn probe_reports_reachability() {
    let (engine, rx) = engine_with(Arc::default());

    engine.probe();

    match next_event(&rx) {
        EngineEvent::ProbeCompleted(reachability) => {
            assert_eq!(reachability.status, Connectivity::Disconnected);
            assert_eq!(reachability.fault, Some(FailureKind::Timeout));
        }
        other => panic!("unexpected event {other:?}"),
    }
}
