//! Per-script collection result.

use bytes::Bytes;

/// Last known outcome of collecting one script.
///
/// A result always describes a single attempt; a newer result for the same
/// script replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionResult {
    /// Non-empty output lines, in the order the script printed them, as raw
    /// bytes.
    pub metric_lines: Vec<Bytes>,
    /// Process exit code (0 = success).
    pub exit_status: i32,
    /// The script path could not be read during discovery.
    pub access_failed: bool,
    /// Reading the script's output failed part way.
    pub parse_failed: bool,
}

impl CollectionResult {
    /// Result recorded for a path the locator could not access.
    pub fn access_failure() -> Self {
        Self {
            access_failed: true,
            ..Default::default()
        }
    }
}
