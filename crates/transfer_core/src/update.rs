use std::path::Path;

use crate::{AppState, CycleOutcome, Effect, Msg, NetworkStatus, PollingState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::DirectorySelected(dir) => {
            // Browsing is disabled while polling.
            if state.polling() == PollingState::Idle {
                state.set_selected_dir(dir);
            }
            Vec::new()
        }
        Msg::StartClicked => match (state.polling(), state.selected_dir().map(Path::to_path_buf)) {
            (PollingState::Running, _) => Vec::new(),
            (PollingState::Idle, None) => {
                state.set_status("No directory selected");
                Vec::new()
            }
            (PollingState::Idle, Some(dir)) => {
                let message = format!("Data transfer started: {}", dir.display());
                state.set_polling(PollingState::Running);
                state.set_status("Data transfer started");
                vec![Effect::StartPolling, Effect::AppendLog { message }]
            }
        },
        Msg::StopClicked => {
            if state.polling() == PollingState::Running {
                state.set_polling(PollingState::Idle);
                state.set_status("Data transfer stopped");
                vec![
                    Effect::StopPolling,
                    Effect::AppendLog {
                        message: "Data transfer stopped".to_string(),
                    },
                ]
            } else {
                Vec::new()
            }
        }
        Msg::PollTick => {
            if state.polling() == PollingState::Running {
                begin_cycle(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::PollOnceRequested => {
            if state.selected_dir().is_none() {
                state.set_status("No directory selected");
                Vec::new()
            } else {
                begin_cycle(&mut state)
            }
        }
        Msg::LatestFileFound(None) => {
            state.set_file_notice("No CSV files found.");
            state.end_cycle();
            Vec::new()
        }
        Msg::LatestFileFound(Some(path)) => {
            if state.note_file(&path) {
                let notice = format!("Latest CSV File: {}", display_name(&path));
                state.set_file_notice(notice.clone());
                vec![
                    Effect::AppendLog { message: notice },
                    Effect::IngestFile { path },
                ]
            } else {
                state.set_file_notice("No new CSV file found.");
                state.end_cycle();
                Vec::new()
            }
        }
        Msg::ScanFailed(message) => {
            state.set_status(message.clone());
            state.end_cycle();
            vec![Effect::AppendLog { message }]
        }
        Msg::PayloadRendered { payload, .. } => vec![Effect::AppendLog {
            message: format!("JSON Data:\n{payload}"),
        }],
        Msg::CycleFinished { path, outcome } => {
            state.finish_cycle();
            match outcome {
                CycleOutcome::Transferred { records, response } => {
                    let message = format!("Api Response: {response}");
                    state.set_status(message.clone());
                    vec![
                        Effect::AppendLog {
                            message: format!(
                                "Transferred {records} record(s) from {}",
                                display_name(&path)
                            ),
                        },
                        Effect::AppendLog { message },
                    ]
                }
                CycleOutcome::Failed(message) => {
                    state.set_status(message.clone());
                    vec![Effect::AppendLog { message }]
                }
            }
        }
        Msg::HeartbeatTick => {
            if state.begin_probe() {
                vec![Effect::CheckReachability]
            } else {
                Vec::new()
            }
        }
        Msg::ReachabilityChecked { status, detail } => {
            state.apply_reachability(status);
            match (status, detail) {
                (NetworkStatus::Disconnected, Some(detail)) => vec![Effect::AppendLog {
                    message: format!("{status} ({detail})"),
                }],
                (NetworkStatus::Disconnected, None) => vec![Effect::AppendLog {
                    message: status.to_string(),
                }],
                _ => Vec::new(),
            }
        }
    };

    (state, effects)
}

fn begin_cycle(state: &mut AppState) -> Vec<Effect> {
    let Some(dir) = state.selected_dir().map(Path::to_path_buf) else {
        return Vec::new();
    };
    if state.begin_cycle() {
        vec![Effect::ScanDirectory { dir }]
    } else {
        // Previous cycle still running; this tick is dropped.
        Vec::new()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
