//! Exporter configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! command-line flags. The result is validated once before any work starts.

mod cli;
mod labels;

pub use cli::Cli;
pub use labels::{is_valid_label_name, is_valid_metric_name, LabelSet};

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest accepted refresh interval or script timeout: one week.
pub const MAX_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Interval is zero or longer than [`MAX_DURATION_SECS`].
    #[error("refresh interval must be between one second and one week")]
    InvalidInterval,
    /// Timeout is zero or longer than [`MAX_DURATION_SECS`].
    #[error("script timeout must be between one second and one week")]
    InvalidTimeout,
    /// Prefix is not a valid metric name.
    #[error("invalid metric name prefix: {0:?}")]
    InvalidPrefix(String),
    /// A label is malformed, badly named or reserved.
    #[error("invalid label definition: {0:?}")]
    InvalidLabel(String),
    /// The same label name appears twice.
    #[error("label {0:?} given more than once")]
    DuplicateLabel(String),
    /// Extension is empty once the leading dot is removed.
    #[error("script extension must not be empty")]
    EmptyExtension,
    /// Interpreter is blank.
    #[error("script interpreter must not be empty")]
    EmptyInterpreter,
    /// `max_line_bytes` is zero.
    #[error("maximum output line length must be positive")]
    InvalidLineLimit,
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Runtime configuration of the exporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Seconds between refresh cycles.
    pub interval_secs: u64,
    /// Seconds a single script may run before it is killed.
    pub timeout_secs: u64,
    /// Root directory searched for scripts.
    pub path: PathBuf,
    /// Listening port.
    pub port: u16,
    /// Listening address.
    pub bind: IpAddr,
    /// Optional prefix for generated metric names.
    pub prefix: Option<String>,
    /// Extra labels as `name=value,name2=value2`.
    pub labels: String,
    /// File extension (without the dot) marking a script.
    pub extension: String,
    /// Program each script is handed to.
    pub interpreter: String,
    /// Longest accepted line of script output, in bytes.
    pub max_line_bytes: usize,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            timeout_secs: 200,
            path: PathBuf::from("/scripts"),
            port: 9000,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            prefix: None,
            labels: String::new(),
            extension: "sh".to_string(),
            interpreter: "bash".to_string(),
            max_line_bytes: 64 * 1024,
        }
    }
}

impl ExporterConfig {
    /// Loads configuration from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_DURATION_SECS).contains(&self.interval_secs) {
            return Err(ConfigError::InvalidInterval);
        }
        if !(1..=MAX_DURATION_SECS).contains(&self.timeout_secs) {
            return Err(ConfigError::InvalidTimeout);
        }
        if let Some(prefix) = self.prefix() {
            if !is_valid_metric_name(prefix) {
                return Err(ConfigError::InvalidPrefix(prefix.to_string()));
            }
        }
        self.label_set()?;
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::EmptyExtension);
        }
        if self.interpreter.trim().is_empty() {
            return Err(ConfigError::EmptyInterpreter);
        }
        if self.max_line_bytes == 0 {
            return Err(ConfigError::InvalidLineLimit);
        }
        Ok(())
    }

    /// Time between refresh cycles.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Time budget of one script run.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Address the HTTP listener binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// The metric name prefix, treating an empty string as unset.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref().filter(|p| !p.is_empty())
    }

    /// The extension without a leading dot.
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    /// Parses the configured extra labels.
    pub fn label_set(&self) -> Result<LabelSet, ConfigError> {
        LabelSet::parse(&self.labels)
    }
}
