//! Script Exporter Library
//!
//! Periodically runs a directory of scripts and exposes their standard output,
//! already in Prometheus text format, over HTTP for scraping.
//!
//! # Architecture
//!
//! Two independent flows share only the result cache:
//!
//! ```text
//! scheduler → locator → runner (one task per script) → cache
//!                                                        ↑
//!                      scrape request → renderer ────────┘
//! ```
//!
//! # Failure Handling
//!
//! - **Per-script failures stay local**: access errors, non-zero exits and
//!   overlong output lines become status metrics for that script only
//! - **Ambiguous failures keep old data**: a timeout, a signal or a failed
//!   spawn leaves the script's previous result in place
//! - **Only global preconditions are fatal**: no scripts at all, or the
//!   listener cannot bind
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use script_exporter::{
//!     cache::{ResultStore, SharedCache},
//!     config::ExporterConfig,
//!     metrics::{ExporterMetrics, Exposition, RenderOptions},
//!     scheduler::Scheduler,
//! };
//!
//! # async fn demo() {
//! let config = ExporterConfig::default();
//! let labels = config.label_set().unwrap();
//! let store: Arc<dyn ResultStore> = Arc::new(SharedCache::new());
//! let metrics = Arc::new(ExporterMetrics::new(config.prefix(), &labels).unwrap());
//!
//! let scheduler = Scheduler::from_config(&config, Arc::clone(&store), Arc::clone(&metrics));
//! scheduler.run_cycle().await.unwrap().wait().await;
//!
//! let exposition = Exposition::new(store, RenderOptions::new(config.prefix(), &labels), metrics);
//! let document = exposition.render().unwrap();
//! println!("{}", String::from_utf8_lossy(&document));
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod cache;
pub mod collection;
pub mod config;
pub mod metrics;
pub mod scheduler;

// Re-export commonly used types at crate root
pub use cache::{CacheSnapshot, ResultStore, SharedCache};
pub use collection::{CollectionResult, DiscoveryError, ScriptLocator, ScriptRunner};
pub use config::{Cli, ConfigError, ExporterConfig};
pub use metrics::{ExporterMetrics, Exposition, MetricsServer, MetricsServerConfig, RenderOptions};
pub use scheduler::{CycleHandle, Scheduler};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
