//! Exposition rendering.
//!
//! Every script contributes three status lines followed by its raw output:
//!
//! ```text
//! script_exporter_error{error_name="script_exit_code",script_name="S"} <int>
//! script_exporter_error{error_name="file_access_error",script_name="S"} <0|1>
//! script_exporter_error{error_name="json_parse_error",script_name="S"} <0|1>
//! <raw line 1 from S>
//! ...
//! ```

use super::{ExporterMetrics, MetricsError};
use crate::cache::{CacheSnapshot, ResultStore};
use crate::config::LabelSet;
use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::Arc;

const STATUS_METRIC: &str = "script_exporter_error";

/// Naming applied to generated status lines.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    metric_name: String,
    extra_labels: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(None, &LabelSet::default())
    }
}

impl RenderOptions {
    /// `prefix` becomes `prefix_script_exporter_error`; `labels` are appended
    /// after `script_name` in configuration order.
    pub fn new(prefix: Option<&str>, labels: &LabelSet) -> Self {
        let metric_name = match prefix {
            Some(prefix) => format!("{prefix}_{STATUS_METRIC}"),
            None => STATUS_METRIC.to_string(),
        };
        let mut extra_labels = String::new();
        for (name, value) in labels.iter() {
            let _ = write!(extra_labels, ",{}=\"{}\"", name, escape_label_value(value));
        }
        Self {
            metric_name,
            extra_labels,
        }
    }

    /// Full name of the generated status metric.
    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }
}

/// Renders a snapshot into exposition text.
///
/// Scripts appear in identity order; raw lines are copied byte for byte, so
/// the document is only as valid UTF-8 as the scripts' output.
pub fn render(snapshot: &CacheSnapshot, options: &RenderOptions) -> Vec<u8> {
    let mut out = Vec::new();

    for (identity, result) in snapshot.iter() {
        let script = escape_label_value(identity);
        let flags = [
            ("script_exit_code", i64::from(result.exit_status)),
            ("file_access_error", i64::from(result.access_failed)),
            ("json_parse_error", i64::from(result.parse_failed)),
        ];
        for (error_name, value) in flags {
            let _ = writeln!(
                out,
                "{}{{error_name=\"{}\",script_name=\"{}\"{}}} {}",
                options.metric_name, error_name, script, options.extra_labels, value
            );
        }
        for line in &result.metric_lines {
            out.extend_from_slice(line);
            out.push(b'\n');
        }
    }

    out
}

/// Escapes a label value per the text exposition format.
fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// The full document served on the metrics path: script results followed by
/// the exporter's own metrics.
pub struct Exposition {
    store: Arc<dyn ResultStore>,
    options: RenderOptions,
    metrics: Arc<ExporterMetrics>,
}

impl Exposition {
    /// Creates a document over `store`, followed by the encoded `metrics`.
    pub fn new(
        store: Arc<dyn ResultStore>,
        options: RenderOptions,
        metrics: Arc<ExporterMetrics>,
    ) -> Self {
        Self {
            store,
            options,
            metrics,
        }
    }

    /// Takes a fresh snapshot and renders the whole document.
    pub fn render(&self) -> Result<Vec<u8>, MetricsError> {
        let snapshot = self.store.snapshot();
        let mut document = render(&snapshot, &self.options);
        document.extend_from_slice(self.metrics.encode()?.as_bytes());
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SharedCache;
    use crate::collection::CollectionResult;
    use bytes::Bytes;

    fn render_text(snapshot: &CacheSnapshot, options: &RenderOptions) -> String {
        String::from_utf8(render(snapshot, options)).unwrap()
    }

    fn snapshot_of(entries: Vec<(&str, CollectionResult)>) -> CacheSnapshot {
        entries
            .into_iter()
            .map(|(name, result)| (name.to_string(), result))
            .collect()
    }

    #[test]
    fn test_clean_script_block() {
        let snapshot = snapshot_of(vec![(
            "disk.sh",
            CollectionResult {
                metric_lines: vec!["disk_free_bytes 42".into(), "disk_total_bytes 100".into()],
                ..Default::default()
            },
        )]);

        let output = render_text(&snapshot, &RenderOptions::default());
        assert_eq!(
            output,
            "script_exporter_error{error_name=\"script_exit_code\",script_name=\"disk.sh\"} 0\n\
             script_exporter_error{error_name=\"file_access_error\",script_name=\"disk.sh\"} 0\n\
             script_exporter_error{error_name=\"json_parse_error\",script_name=\"disk.sh\"} 0\n\
             disk_free_bytes 42\n\
             disk_total_bytes 100\n"
        );
    }

    #[test]
    fn test_error_flags_rendered() {
        let snapshot = snapshot_of(vec![
            ("gone.sh", CollectionResult::access_failure()),
            (
                "broken.sh",
                CollectionResult {
                    exit_status: 7,
                    parse_failed: true,
                    ..Default::default()
                },
            ),
        ]);

        let output = render_text(&snapshot, &RenderOptions::default());
        assert!(output.contains(
            "script_exporter_error{error_name=\"file_access_error\",script_name=\"gone.sh\"} 1\n"
        ));
        assert!(output.contains(
            "script_exporter_error{error_name=\"script_exit_code\",script_name=\"broken.sh\"} 7\n"
        ));
        assert!(output.contains(
            "script_exporter_error{error_name=\"json_parse_error\",script_name=\"broken.sh\"} 1\n"
        ));
        assert!(output.contains(
            "script_exporter_error{error_name=\"file_access_error\",script_name=\"broken.sh\"} 0\n"
        ));
    }

    #[test]
    fn test_prefix_and_labels() {
        let labels = LabelSet::parse("env=prod,dc=eu").unwrap();
        let options = RenderOptions::new(Some("team"), &labels);
        let snapshot = snapshot_of(vec![("a.sh", CollectionResult::default())]);

        let output = render_text(&snapshot, &options);
        assert!(output.starts_with(
            "team_script_exporter_error{error_name=\"script_exit_code\",script_name=\"a.sh\",env=\"prod\",dc=\"eu\"} 0\n"
        ));
    }

    #[test]
    fn test_label_values_escaped() {
        let snapshot = snapshot_of(vec![("we\"ird\\.sh", CollectionResult::default())]);
        let output = render_text(&snapshot, &RenderOptions::default());
        assert!(output.contains("script_name=\"we\\\"ird\\\\.sh\""));
    }

    #[test]
    fn test_raw_lines_untouched() {
        let raw = "# HELP custom_metric Something\ncustom_metric{path=\"/a b\"} 1.5e3";
        let snapshot = snapshot_of(vec![(
            "raw.sh",
            CollectionResult {
                metric_lines: raw.lines().map(|l| Bytes::from(l.to_string())).collect(),
                ..Default::default()
            },
        )]);
        let output = render_text(&snapshot, &RenderOptions::new(Some("p"), &LabelSet::default()));
        assert!(output.ends_with(&format!("{raw}\n")));
    }

    #[test]
    fn test_non_utf8_lines_copied_verbatim() {
        let line = Bytes::from_static(b"host_info{name=\"caf\xe9\"} 1");
        let snapshot = snapshot_of(vec![(
            "host.sh",
            CollectionResult {
                metric_lines: vec![line.clone(), "next_metric 2".into()],
                ..Default::default()
            },
        )]);

        let output = render(&snapshot, &RenderOptions::default());
        let mut expected = line.to_vec();
        expected.extend_from_slice(b"\nnext_metric 2\n");
        assert!(output.ends_with(&expected));
        assert!(String::from_utf8_lossy(&output)
            .contains("error_name=\"json_parse_error\",script_name=\"host.sh\"} 0\n"));
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(render(&CacheSnapshot::default(), &RenderOptions::default()).is_empty());
    }

    #[test]
    fn test_exposition_idempotent() {
        let store = Arc::new(SharedCache::new());
        store.put("b.sh".into(), CollectionResult::default());
        store.put(
            "a.sh".into(),
            CollectionResult {
                metric_lines: vec!["a 1".into()],
                exit_status: 2,
                ..Default::default()
            },
        );
        let metrics = Arc::new(ExporterMetrics::new(None, &LabelSet::default()).unwrap());
        let exposition = Exposition::new(store, RenderOptions::default(), metrics);

        let first = exposition.render().unwrap();
        let second = exposition.render().unwrap();
        assert_eq!(first, second);
        let first = String::from_utf8(first).unwrap();
        assert!(first.find("script_name=\"a.sh\"").unwrap() < first.find("script_name=\"b.sh\"").unwrap());
        assert!(first.contains("script_exporter_cycles_total 0"));
    }
}
