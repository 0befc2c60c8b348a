use std::path::PathBuf;

use crate::NetworkStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a source directory, or cancelled the picker (`None`).
    DirectorySelected(Option<PathBuf>),
    /// User clicked Start.
    StartClicked,
    /// User clicked Stop.
    StopClicked,
    /// User asked for a single cycle outside the polling schedule.
    PollOnceRequested,
    /// Polling interval elapsed.
    PollTick,
    /// Heartbeat interval elapsed.
    HeartbeatTick,
    /// Directory scan finished; `None` when no CSV file exists.
    LatestFileFound(Option<PathBuf>),
    /// Directory scan failed.
    ScanFailed(String),
    /// A detected file was parsed and its JSON body is about to be posted.
    PayloadRendered { path: PathBuf, payload: String },
    /// Parse and submit of a detected file finished.
    CycleFinished { path: PathBuf, outcome: CycleOutcome },
    /// Reachability probe finished. `detail` names the fault, if any.
    ReachabilityChecked {
        status: NetworkStatus,
        detail: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Transferred { records: usize, response: String },
    Failed(String),
}
