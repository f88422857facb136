//! Script discovery.
//!
//! Walks the script root recursively. Per-path errors are reported as
//! entries of the walk and never end it.

use super::script_identity;
use ignore::{Walk, WalkBuilder};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that make discovery unusable.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The walk found neither scripts nor inaccessible paths.
    #[error("no scripts found in directory {}", .0.display())]
    NoScripts(PathBuf),

    /// The blocking walk task panicked or was cancelled.
    #[error("directory walk failed: {0}")]
    WalkFailed(#[from] tokio::task::JoinError),
}

/// A path the walk could not access.
#[derive(Debug, Clone)]
pub struct AccessFailure {
    /// Base name of the failing path.
    pub identity: String,
    /// Walker error text.
    pub message: String,
}

/// One entry produced by the walk.
#[derive(Debug, Clone)]
pub enum Located {
    /// A candidate script.
    Script(PathBuf),
    /// A path that could not be read.
    AccessFailed(AccessFailure),
}

/// Result of a complete walk.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Script paths in walk order.
    pub scripts: Vec<PathBuf>,
    /// Paths that could not be read.
    pub access_failures: Vec<AccessFailure>,
}

impl Discovery {
    /// Fails if the walk found neither scripts nor access errors.
    pub fn check(&self, root: &Path) -> Result<(), DiscoveryError> {
        if self.scripts.is_empty() && self.access_failures.is_empty() {
            return Err(DiscoveryError::NoScripts(root.to_path_buf()));
        }
        Ok(())
    }
}

/// Finds script files below a root directory.
#[derive(Debug, Clone)]
pub struct ScriptLocator {
    root: PathBuf,
    suffix: String,
}

impl ScriptLocator {
    /// Creates a locator for files ending in `.<extension>` below `root`.
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            root: root.into(),
            suffix: format!(".{}", extension.trim_start_matches('.')),
        }
    }

    /// Directory the walk starts from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walks the root.
    ///
    /// Every directory entry is visited: hidden files and ignore files get no
    /// special treatment and symlinks are not followed.
    pub fn walk(&self) -> impl Iterator<Item = Located> + '_ {
        let walk: Walk = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .build();

        walk.filter_map(move |entry| match entry {
            Ok(entry) => {
                let is_dir = entry.file_type().map_or(true, |ft| ft.is_dir());
                let matches = entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(&self.suffix));
                (!is_dir && matches).then(|| Located::Script(entry.into_path()))
            }
            Err(err) => {
                let identity = error_path(&err)
                    .map(script_identity)
                    .unwrap_or_else(|| script_identity(&self.root));
                tracing::warn!(path = %identity, error = %err, "File access error");
                Some(Located::AccessFailed(AccessFailure {
                    identity,
                    message: err.to_string(),
                }))
            }
        })
    }

    /// Walks the whole tree and collects the result.
    ///
    /// Blocks on filesystem calls; async callers run it on the blocking pool.
    pub fn discover(&self) -> Discovery {
        let mut discovery = Discovery::default();
        for located in self.walk() {
            match located {
                Located::Script(path) => discovery.scripts.push(path),
                Located::AccessFailed(failure) => discovery.access_failures.push(failure),
            }
        }
        tracing::debug!(
            root = %self.root.display(),
            scripts = discovery.scripts.len(),
            access_errors = discovery.access_failures.len(),
            "Script discovery finished"
        );
        discovery
    }
}

/// Digs the offending path out of a walker error.
fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } => error_path(err),
        ignore::Error::WithLineNumber { err, .. } => error_path(err),
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}
