//! Script discovery and execution.
//!
//! The locator finds candidate scripts, the runner executes one of them and
//! turns its output into a [`CollectionResult`]. Neither touches shared
//! state; storing results is the scheduler's job.

mod locator;
mod output;
mod result;
mod runner;

pub use locator::{AccessFailure, Discovery, DiscoveryError, Located, ScriptLocator};
pub use output::{scan_lines, OutputError, ScannedOutput};
pub use result::CollectionResult;
pub use runner::{RunOutcome, ScriptRunner, RUN_OUTCOMES};

use std::path::Path;

/// Cache key of a script: its file name.
pub fn script_identity(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
