use std::path::PathBuf;

use crate::{NetworkStatus, PollingState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub polling: PollingState,
    pub selected_dir: Option<PathBuf>,
    /// Latest-file line, e.g. `Latest CSV File: data.csv`.
    pub file_notice: String,
    /// Most recent status or error message.
    pub status_message: Option<String>,
    pub network: NetworkStatus,
    pub cycle_in_flight: bool,
    pub completed_cycles: u64,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn directory_label(&self) -> String {
        match &self.selected_dir {
            Some(dir) => format!("Selected Directory: {}", dir.display()),
            None => "Selected Directory: None".to_string(),
        }
    }
}
