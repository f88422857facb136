//! Command-line flags.

use super::{ConfigError, ExporterConfig};
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

/// Runs a directory of scripts periodically and serves their output as
/// Prometheus metrics.
#[derive(Debug, Default, Parser)]
#[command(name = "script-exporter", version, about)]
pub struct Cli {
    /// TOML configuration file; flags override its values.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Interval for metrics collection in seconds [default: 300].
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Timeout for a single script in seconds [default: 200].
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Directory searched recursively for scripts [default: /scripts].
    #[arg(long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Port on which to expose metrics, `9000` or `:9000` [default: 9000].
    #[arg(long, value_parser = parse_port)]
    pub port: Option<u16>,

    /// Address to listen on [default: 0.0.0.0].
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Prefix for generated metric names.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Additional labels for generated metrics, `name=value,...`.
    #[arg(long)]
    pub labels: Option<String>,

    /// Extension marking a script [default: sh].
    #[arg(long)]
    pub extension: Option<String>,

    /// Program used to run each script [default: bash].
    #[arg(long)]
    pub interpreter: Option<String>,
}

impl Cli {
    /// Builds the effective configuration: defaults, then the config file,
    /// then flags. The result is validated.
    pub fn load_config(&self) -> Result<ExporterConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ExporterConfig::from_file(path)?,
            None => ExporterConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut ExporterConfig) {
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(path) = &self.path {
            config.path = path.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(prefix) = &self.prefix {
            config.prefix = Some(prefix.clone());
        }
        if let Some(labels) = &self.labels {
            config.labels = labels.clone();
        }
        if let Some(extension) = &self.extension {
            config.extension = extension.clone();
        }
        if let Some(interpreter) = &self.interpreter {
            config.interpreter = interpreter.clone();
        }
    }
}

fn parse_port(raw: &str) -> Result<u16, String> {
    let digits = raw.strip_prefix(':').unwrap_or(raw);
    digits
        .parse::<u16>()
        .map_err(|e| format!("invalid port {raw:?}: {e}"))
}
