use std::fmt;
use std::path::{Path, PathBuf};

use crate::view_model::AppViewModel;

const NO_FILE_NOTICE: &str = "Latest File: None";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollingState {
    #[default]
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkStatus {
    /// No probe has completed yet.
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkStatus::Unknown => write!(f, "Network Status: Unknown"),
            NetworkStatus::Connected => write!(f, "Network Status: Connected"),
            NetworkStatus::Disconnected => write!(f, "Network Status: Disconnected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    polling: PollingState,
    selected_dir: Option<PathBuf>,
    /// Last file handed to a cycle; used to suppress re-uploads.
    last_file: Option<PathBuf>,
    cycle_in_flight: bool,
    probe_in_flight: bool,
    file_notice: String,
    status_message: Option<String>,
    network: NetworkStatus,
    completed_cycles: u64,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            polling: PollingState::Idle,
            selected_dir: None,
            last_file: None,
            cycle_in_flight: false,
            probe_in_flight: false,
            file_notice: NO_FILE_NOTICE.to_string(),
            status_message: None,
            network: NetworkStatus::Unknown,
            completed_cycles: 0,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            polling: self.polling,
            selected_dir: self.selected_dir.clone(),
            file_notice: self.file_notice.clone(),
            status_message: self.status_message.clone(),
            network: self.network,
            cycle_in_flight: self.cycle_in_flight,
            completed_cycles: self.completed_cycles,
            dirty: self.dirty,
        }
    }

    pub fn polling(&self) -> PollingState {
        self.polling
    }

    pub fn selected_dir(&self) -> Option<&Path> {
        self.selected_dir.as_deref()
    }

    pub fn last_file(&self) -> Option<&Path> {
        self.last_file.as_deref()
    }

    pub fn is_cycle_in_flight(&self) -> bool {
        self.cycle_in_flight
    }

    pub fn is_probe_in_flight(&self) -> bool {
        self.probe_in_flight
    }

    /// Returns whether the state changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_selected_dir(&mut self, dir: Option<PathBuf>) {
        self.selected_dir = dir;
        self.status_message = None;
        self.mark_dirty();
    }

    pub(crate) fn set_polling(&mut self, polling: PollingState) {
        self.polling = polling;
        self.mark_dirty();
    }

    pub(crate) fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.mark_dirty();
    }

    pub(crate) fn set_file_notice(&mut self, notice: impl Into<String>) {
        let notice = notice.into();
        if self.file_notice != notice {
            self.file_notice = notice;
            self.mark_dirty();
        }
    }

    /// Marks a cycle as started. Returns `false` if one is already running.
    pub(crate) fn begin_cycle(&mut self) -> bool {
        if self.cycle_in_flight {
            return false;
        }
        self.cycle_in_flight = true;
        self.mark_dirty();
        true
    }

    pub(crate) fn end_cycle(&mut self) {
        self.cycle_in_flight = false;
        self.mark_dirty();
    }

    pub(crate) fn finish_cycle(&mut self) {
        self.completed_cycles += 1;
        self.end_cycle();
    }

    /// Records `path` as seen. Returns `false` if it was already the last file.
    pub(crate) fn note_file(&mut self, path: &Path) -> bool {
        if self.last_file.as_deref() == Some(path) {
            return false;
        }
        self.last_file = Some(path.to_path_buf());
        self.mark_dirty();
        true
    }

    pub(crate) fn begin_probe(&mut self) -> bool {
        if self.probe_in_flight {
            return false;
        }
        self.probe_in_flight = true;
        true
    }

    pub(crate) fn apply_reachability(&mut self, status: NetworkStatus) {
        self.probe_in_flight = false;
        if self.network != status {
            self.network = status;
            self.mark_dirty();
        }
    }
}
