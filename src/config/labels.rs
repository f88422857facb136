//! Extra label parsing.
//!
//! Labels are given as a comma separated list of `name=value` pairs, e.g.
//! `env=prod,dc=eu-1`. They are attached to every status line the exporter
//! generates itself; raw script output is never rewritten.

use super::ConfigError;
use std::collections::HashMap;

/// Label names the exporter already uses on its own metrics.
const RESERVED_LABELS: [&str; 3] = ["script_name", "error_name", "outcome"];

/// Ordered set of constant labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    pairs: Vec<(String, String)>,
}

impl LabelSet {
    /// Parses a `name=value,name2=value2` list.
    ///
    /// Whitespace around names and values is ignored, as are surrounding
    /// double quotes on a value. An empty string yields an empty set.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut pairs: Vec<(String, String)> = Vec::new();

        for segment in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (name, value) = segment
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidLabel(segment.to_string()))?;
            let name = name.trim();
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);

            if !is_valid_label_name(name) || RESERVED_LABELS.contains(&name) {
                return Err(ConfigError::InvalidLabel(segment.to_string()));
            }
            if pairs.iter().any(|(existing, _)| existing == name) {
                return Err(ConfigError::DuplicateLabel(name.to_string()));
            }
            pairs.push((name.to_string(), value.to_string()));
        }

        Ok(Self { pairs })
    }

    /// True if no labels are configured.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Iterates pairs in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Converts into the map form `prometheus::Registry::new_custom` expects.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.pairs.iter().cloned().collect()
    }
}

/// Returns true if `name` is a valid Prometheus metric name.
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Returns true if `name` is a valid Prometheus label name.
pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
