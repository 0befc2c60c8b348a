use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use transfer_engine::{TlsVerification, TransferSettings};
use transfer_logging::{transfer_info, transfer_warn};

/// Settings read from the RON configuration file. Missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// REST endpoint that receives the JSON records and answers the probe.
    pub endpoint_url: String,
    pub poll_interval_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub tls: TlsVerification,
    pub log_dir: PathBuf,
    pub log_retention_days: u64,
    /// Directory selected at start-up, if any.
    pub source_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "https://localhost/api/csv".to_string(),
            poll_interval_ms: 1000,
            heartbeat_interval_ms: 5000,
            request_timeout_secs: 30,
            probe_timeout_secs: 3,
            tls: TlsVerification::Verify,
            log_dir: PathBuf::from("logs"),
            log_retention_days: 7,
            source_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                transfer_info!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config {path:?}"));
            }
        };

        let config = Self::from_ron(&content)
            .with_context(|| format!("failed to parse config {path:?}"))?;
        if config.tls == TlsVerification::AcceptInvalidCerts {
            transfer_warn!("Config {:?} disables TLS certificate verification", path);
        }
        transfer_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_ron(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
    }

    pub fn transfer_settings(&self) -> TransferSettings {
        TransferSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
            tls: self.tls,
            ..TransferSettings::new(self.endpoint_url.clone())
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms.max(1))
    }

    pub fn log_retention(&self) -> Duration {
        Duration::from_secs(self.log_retention_days * 24 * 60 * 60)
    }
}
