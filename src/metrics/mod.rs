//! Prometheus exposition for collected script results.
//!
//! The served document has two parts:
//!
//! ## Script results
//! For every script, three status lines labelled with the script name
//! (`script_exit_code`, `file_access_error`, `json_parse_error`) followed by
//! the script's own output lines, byte for byte.
//!
//! ## Exporter metrics
//! - `script_exporter_cycles_total` - Refresh cycles started
//! - `script_exporter_scripts_discovered` - Scripts found by the last walk
//! - `script_exporter_access_errors` - Inaccessible paths in the last walk
//! - `script_exporter_runs_total{outcome}` - Script executions by outcome
//! - `script_exporter_last_cycle_timestamp_seconds` - Start of the last cycle
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use script_exporter::cache::{ResultStore, SharedCache};
//! use script_exporter::collection::CollectionResult;
//! use script_exporter::config::LabelSet;
//! use script_exporter::metrics::{Exposition, ExporterMetrics, RenderOptions};
//!
//! let store = Arc::new(SharedCache::new());
//! store.put("disk.sh".to_string(), CollectionResult {
//!     metric_lines: vec!["disk_free_bytes 1024".into()],
//!     ..Default::default()
//! });
//!
//! let metrics = Arc::new(ExporterMetrics::new(None, &LabelSet::default()).unwrap());
//! let exposition = Exposition::new(store, RenderOptions::default(), metrics);
//! let document = exposition.render().unwrap();
//! println!("{}", String::from_utf8_lossy(&document));
//! ```

mod collector;
mod render;
mod server;

pub use collector::{ExporterMetrics, MetricsError};
pub use render::{render, Exposition, RenderOptions};
pub use server::{MetricsServer, MetricsServerConfig, ServerError, CONTENT_TYPE};
