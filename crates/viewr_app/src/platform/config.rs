use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use viewr_core::{FormId, PageSettings};
use viewr_engine::TransportSettings;
use viewr_logging::viewr_info;

use super::app::RuntimeSettings;
use super::logging::LogDestination;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

/// Client settings, read from a RON file. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL that relative form actions resolve against.
    pub server_url: String,
    pub autosave_forms: Vec<String>,
    pub autosave_interval_ms: u64,
    pub feedback_display_ms: u64,
    pub feedback_fade_ms: u64,
    pub copy_restore_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_reply_bytes: u64,
    /// Where autosave fingerprints persist between runs.
    pub store_path: PathBuf,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let page = PageSettings::default();
        let transport = TransportSettings::default();
        Self {
            server_url: transport.base_url,
            autosave_forms: vec!["req_text_form".to_string()],
            autosave_interval_ms: millis(page.update_interval),
            feedback_display_ms: millis(page.feedback_display),
            feedback_fade_ms: millis(page.feedback_fade),
            copy_restore_ms: millis(page.copy_restore),
            connect_timeout_ms: millis(transport.connect_timeout),
            request_timeout_ms: millis(transport.request_timeout),
            max_reply_bytes: transport.max_reply_bytes,
            store_path: PathBuf::from(".viewr_store.json"),
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                viewr_info!("No config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Self::from_ron_str(&text)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
    }

    pub fn level(&self) -> Result<LevelFilter, ConfigError> {
        viewr_logging::parse_level(&self.log_level)
            .ok_or_else(|| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            update_interval: Duration::from_millis(self.autosave_interval_ms),
            feedback_display: Duration::from_millis(self.feedback_display_ms),
            feedback_fade: Duration::from_millis(self.feedback_fade_ms),
            copy_restore: Duration::from_millis(self.copy_restore_ms),
        }
    }

    pub fn runtime_settings(&self) -> RuntimeSettings {
        RuntimeSettings {
            page: self.page_settings(),
            autosave_forms: self.autosave_forms.iter().map(FormId::new).collect(),
        }
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            base_url: self.server_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_reply_bytes: self.max_reply_bytes,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
