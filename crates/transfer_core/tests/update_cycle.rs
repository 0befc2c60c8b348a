use std::path::PathBuf;

use pretty_assertions::assert_eq;
use transfer_core::{update, AppState, CycleOutcome, Effect, Msg, NetworkStatus, PollingState};

fn running(dir: &str) -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::DirectorySelected(Some(PathBuf::from(dir))),
    );
    let (state, _) = update(state, Msg::StartClicked);
    state
}

#[test]
fn tick_scans_then_ingests_new_file() {
    let state = running("/in");

    let (state, effects) = update(state, Msg::PollTick);
    assert_eq!(
        effects,
        vec![Effect::ScanDirectory {
            dir: PathBuf::from("/in")
        }]
    );
    assert!(state.is_cycle_in_flight());

    let (state, effects) = update(
        state,
        Msg::LatestFileFound(Some(PathBuf::from("/in/b.csv"))),
    );
    assert_eq!(
        effects,
        vec![
            Effect::AppendLog {
                message: "Latest CSV File: b.csv".to_string(),
            },
            Effect::IngestFile {
                path: PathBuf::from("/in/b.csv"),
            },
        ]
    );
    assert_eq!(state.view().file_notice, "Latest CSV File: b.csv");
    assert!(state.is_cycle_in_flight());

    let (state, effects) = update(
        state,
        Msg::CycleFinished {
            path: PathBuf::from("/in/b.csv"),
            outcome: CycleOutcome::Transferred {
                records: 1,
                response: "ok".to_string(),
            },
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::AppendLog {
                message: "Transferred 1 record(s) from b.csv".to_string(),
            },
            Effect::AppendLog {
                message: "Api Response: ok".to_string(),
            },
        ]
    );
    let view = state.view();
    assert!(!view.cycle_in_flight);
    assert_eq!(view.completed_cycles, 1);
    assert_eq!(view.status_message.as_deref(), Some("Api Response: ok"));
}

#[test]
fn same_file_is_suppressed_on_next_cycle() {
    let state = running("/in");
    let (state, _) = update(state, Msg::PollTick);
    let (state, _) = update(state, Msg::LatestFileFound(Some(PathBuf::from("/in/a.csv"))));
    let (state, _) = update(
        state,
        Msg::CycleFinished {
            path: PathBuf::from("/in/a.csv"),
            outcome: CycleOutcome::Transferred {
                records: 3,
                response: "ok".to_string(),
            },
        },
    );

    let (state, effects) = update(state, Msg::PollTick);
    assert_eq!(effects.len(), 1);
    let (state, effects) = update(state, Msg::LatestFileFound(Some(PathBuf::from("/in/a.csv"))));

    assert!(effects.is_empty());
    assert_eq!(state.view().file_notice, "No new CSV file found.");
    assert!(!state.is_cycle_in_flight());
    assert_eq!(state.last_file(), Some(PathBuf::from("/in/a.csv").as_path()));
}

#[test]
fn failed_file_is_not_retried() {
    let state = running("/in");
    let (state, _) = update(state, Msg::PollTick);
    let (state, _) = update(state, Msg::LatestFileFound(Some(PathBuf::from("/in/bad.csv"))));
    let (state, effects) = update(
        state,
        Msg::CycleFinished {
            path: PathBuf::from("/in/bad.csv"),
            outcome: CycleOutcome::Failed("Value error: no data rows".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::AppendLog {
            message: "Value error: no data rows".to_string(),
        }]
    );
    assert_eq!(state.view().polling, PollingState::Running);

    let (state, _) = update(state, Msg::PollTick);
    let (_state, effects) =
        update(state, Msg::LatestFileFound(Some(PathBuf::from("/in/bad.csv"))));
    assert!(effects.is_empty());
}

#[test]
fn newer_file_replaces_last_seen() {
    let state = running("/in");
    let (state, _) = update(state, Msg::PollTick);
    let (state, _) = update(state, Msg::LatestFileFound(Some(PathBuf::from("/in/a.csv"))));
    let (state, _) = update(
        state,
        Msg::CycleFinished {
            path: PathBuf::from("/in/a.csv"),
            outcome: CycleOutcome::Failed("boom".to_string()),
        },
    );

    let (state, _) = update(state, Msg::PollTick);
    let (_state, effects) =
        update(state, Msg::LatestFileFound(Some(PathBuf::from("/in/b.csv"))));
    assert!(effects.contains(&Effect::IngestFile {
        path: PathBuf::from("/in/b.csv")
    }));
}

#[test]
fn tick_during_cycle_is_dropped() {
    let state = running("/in");
    let (state, first) = update(state, Msg::PollTick);
    let (state, second) = update(state, Msg::PollTick);

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert!(state.is_cycle_in_flight());
}

#[test]
fn empty_directory_reports_no_csv() {
    let state = running("/in");
    let (state, _) = update(state, Msg::PollTick);
    let (state, effects) = update(state, Msg::LatestFileFound(None));

    assert!(effects.is_empty());
    assert_eq!(state.view().file_notice, "No CSV files found.");
    assert!(!state.is_cycle_in_flight());
}

#[test]
fn scan_failure_is_logged_and_polling_continues() {
    let state = running("/in");
    let (state, _) = update(state, Msg::PollTick);
    let (state, effects) = update(
        state,
        Msg::ScanFailed("Error reading directory /in: not found".to_string()),
    );

    assert_eq!(
        effects,
        vec![Effect::AppendLog {
            message: "Error reading directory /in: not found".to_string(),
        }]
    );
    assert_eq!(state.view().polling, PollingState::Running);

    let (_state, effects) = update(state, Msg::PollTick);
    assert_eq!(effects.len(), 1);
}

#[test]
fn result_after_stop_is_still_logged() {
    let state = running("/in");
    let (state, _) = update(state, Msg::PollTick);
    let (state, _) = update(state, Msg::LatestFileFound(Some(PathBuf::from("/in/a.csv"))));
    let (state, _) = update(state, Msg::StopClicked);
    let (state, effects) = update(
        state,
        Msg::CycleFinished {
            path: PathBuf::from("/in/a.csv"),
            outcome: CycleOutcome::Failed("timeout".to_string()),
        },
    );

    assert_eq!(effects.len(), 1);
    assert_eq!(state.view().polling, PollingState::Idle);
    assert!(!state.is_cycle_in_flight());
}

#[test]
fn poll_once_works_while_idle() {
    let (state, _) = update(
        AppState::new(),
        Msg::DirectorySelected(Some(PathBuf::from("/in"))),
    );
    let (state, effects) = update(state, Msg::PollOnceRequested);

    assert_eq!(state.view().polling, PollingState::Idle);
    assert_eq!(
        effects,
        vec![Effect::ScanDirectory {
            dir: PathBuf::from("/in")
        }]
    );
}

#[test]
fn poll_once_without_directory_reports_it() {
    let (state, effects) = update(AppState::new(), Msg::PollOnceRequested);

    assert!(effects.is_empty());
    assert_eq!(
        state.view().status_message.as_deref(),
        Some("No directory selected")
    );
}

#[test]
fn heartbeat_runs_regardless_of_polling_state() {
    let (state, effects) = update(AppState::new(), Msg::HeartbeatTick);
    assert_eq!(effects, vec![Effect::CheckReachability]);

    // A second tick before the probe returns is skipped.
    let (state, effects) = update(state, Msg::HeartbeatTick);
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::ReachabilityChecked {
            status: NetworkStatus::Connected,
            detail: None,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().network, NetworkStatus::Connected);
    assert!(!state.is_probe_in_flight());
}

#[test]
fn disconnected_probe_is_logged_with_detail() {
    let (state, _) = update(AppState::new(), Msg::HeartbeatTick);
    let (state, effects) = update(
        state,
        Msg::ReachabilityChecked {
            status: NetworkStatus::Disconnected,
            detail: Some("timeout".to_string()),
        },
    );

    assert_eq!(state.view().network, NetworkStatus::Disconnected);
    assert_eq!(
        effects,
        vec![Effect::AppendLog {
            message: "Network Status: Disconnected (timeout)".to_string(),
        }]
    );
}

#[test]
fn rendered_payload_is_logged_and_cycle_stays_open() {
    let state = running("/in");
    let (state, _) = update(state, Msg::PollTick);
    let (state, _) = update(
        state,
        Msg::LatestFileFound(Some(PathBuf::from("/in/b.csv"))),
    );

    let (state, effects) = update(
        state,
        Msg::PayloadRendered {
            path: PathBuf::from("/in/b.csv"),
            payload: "[\n    {\n        \"column_1\": \"1\"\n    }\n]".to_string(),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::AppendLog {
            message: "JSON Data:\n[\n    {\n        \"column_1\": \"1\"\n    }\n]".to_string(),
        }]
    );
    assert!(state.is_cycle_in_flight());
}

#[test]
fn connected_probe_while_idle_updates_status_silently() {
    let mut state = AppState::new();
    state.consume_dirty();

    let (mut state, effects) = update(
        state,
        Msg::ReachabilityChecked {
            status: NetworkStatus::Connected,
            detail: None,
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.polling(), PollingState::Idle);
    assert_eq!(state.view().network, NetworkStatus::Connected);
    assert!(state.consume_dirty());
}
