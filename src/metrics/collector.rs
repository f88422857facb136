//! Exporter self-metrics.

use crate::collection::RUN_OUTCOMES;
use crate::config::LabelSet;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registering or encoding a metric failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus registry describing the exporter's own collection activity.
pub struct ExporterMetrics {
    registry: Registry,

    cycles_total: IntCounter,
    scripts_discovered: IntGauge,
    access_errors: IntGauge,
    runs_total: IntCounterVec,
    last_cycle_timestamp: IntGauge,
}

impl ExporterMetrics {
    /// Creates the registry. `prefix` and `labels` are applied to every
    /// metric, matching the generated status lines.
    pub fn new(prefix: Option<&str>, labels: &LabelSet) -> Result<Self, MetricsError> {
        let const_labels = (!labels.is_empty()).then(|| labels.to_map());
        let registry = Registry::new_custom(prefix.map(str::to_string), const_labels)?;

        let cycles_total = IntCounter::new(
            "script_exporter_cycles_total",
            "Total number of refresh cycles started",
        )?;
        let scripts_discovered = IntGauge::new(
            "script_exporter_scripts_discovered",
            "Scripts found by the most recent directory walk",
        )?;
        let access_errors = IntGauge::new(
            "script_exporter_access_errors",
            "Paths that could not be accessed during the most recent directory walk",
        )?;
        let runs_total = IntCounterVec::new(
            Opts::new(
                "script_exporter_runs_total",
                "Script executions by outcome",
            ),
            &["outcome"],
        )?;
        let last_cycle_timestamp = IntGauge::new(
            "script_exporter_last_cycle_timestamp_seconds",
            "UNIX time the most recent refresh cycle started",
        )?;

        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(scripts_discovered.clone()))?;
        registry.register(Box::new(access_errors.clone()))?;
        registry.register(Box::new(runs_total.clone()))?;
        registry.register(Box::new(last_cycle_timestamp.clone()))?;

        // Expose every outcome from the start, at zero.
        for outcome in RUN_OUTCOMES {
            runs_total.with_label_values(&[outcome]);
        }

        Ok(Self {
            registry,
            cycles_total,
            scripts_discovered,
            access_errors,
            runs_total,
            last_cycle_timestamp,
        })
    }

    /// Records the start of a refresh cycle at `timestamp` (UNIX seconds).
    pub fn cycle_started(&self, timestamp: i64) {
        self.cycles_total.inc();
        self.last_cycle_timestamp.set(timestamp);
    }

    /// Records the size of the latest directory walk.
    pub fn discovered(&self, scripts: usize, access_errors: usize) {
        self.scripts_discovered.set(scripts as i64);
        self.access_errors.set(access_errors as i64);
    }

    /// Counts one finished script execution.
    pub fn record_run(&self, outcome: &str) {
        self.runs_total.with_label_values(&[outcome]).inc();
    }

    /// Number of cycles started so far.
    pub fn cycles(&self) -> u64 {
        self.cycles_total.get()
    }

    /// Number of runs recorded for `outcome`.
    pub fn runs(&self, outcome: &str) -> u64 {
        self.runs_total.with_label_values(&[outcome]).get()
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
