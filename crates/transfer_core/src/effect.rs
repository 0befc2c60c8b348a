use std::path::PathBuf;

/// Side effects requested by [`crate::update`]; executed by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start the polling tick source.
    StartPolling,
    /// Halt the polling tick source. In-flight work is not cancelled.
    StopPolling,
    /// Look for the newest CSV file in `dir`.
    ScanDirectory { dir: PathBuf },
    /// Parse `path` and submit the resulting batch.
    IngestFile { path: PathBuf },
    /// Probe the endpoint for reachability.
    CheckReachability,
    /// Append a line to the activity log.
    AppendLog { message: String },
}
