//! Script output scanning.
//!
//! Output is treated as opaque, pre-formatted exposition text. The only
//! filtering applied is dropping empty lines; everything else, including
//! bytes that are not UTF-8, is passed through verbatim.

use bytes::Bytes;
use thiserror::Error;

/// Errors that stop scanning a script's output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    /// A single line exceeded the configured limit.
    #[error("line {line} is {len} bytes long (limit {limit})")]
    LineTooLong {
        /// 1-based line number.
        line: usize,
        /// Length of the offending line in bytes.
        len: usize,
        /// Configured maximum line length.
        limit: usize,
    },
}

/// Lines scanned from a script's standard output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedOutput {
    /// Non-empty lines read before scanning stopped.
    pub lines: Vec<Bytes>,
    /// Set if scanning stopped early.
    pub error: Option<OutputError>,
}

/// Splits raw output into non-empty lines.
///
/// Lines end at `\n`; a trailing `\r` is removed. Lines are slices of `raw`,
/// not copies. Scanning stops at the first line longer than
/// `max_line_bytes`; lines read up to that point are kept.
pub fn scan_lines(raw: &Bytes, max_line_bytes: usize) -> ScannedOutput {
    let mut scanned = ScannedOutput::default();

    let body = raw.strip_suffix(b"\n").unwrap_or(&raw[..]);
    if body.is_empty() {
        return scanned;
    }

    for (index, line) in body.split(|&b| b == b'\n').enumerate() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        if line.len() > max_line_bytes {
            scanned.error = Some(OutputError::LineTooLong {
                line: index + 1,
                len: line.len(),
                limit: max_line_bytes,
            });
            break;
        }
        if !line.is_empty() {
            scanned.lines.push(raw.slice_ref(line));
        }
    }

    scanned
}
