//! Periodic refresh of the result cache.

use super::CycleHandle;
use crate::cache::ResultStore;
use crate::collection::{
    script_identity, CollectionResult, DiscoveryError, ScriptLocator, ScriptRunner,
};
use crate::config::ExporterConfig;
use crate::metrics::ExporterMetrics;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

/// Drives collection cycles.
///
/// Runners are fire-and-forget: a cycle never waits for the previous one.
/// If a script is still running when its next cycle starts, both runs write
/// to the cache and the last write wins.
pub struct Scheduler {
    locator: Arc<ScriptLocator>,
    runner: Arc<ScriptRunner>,
    store: Arc<dyn ResultStore>,
    metrics: Arc<ExporterMetrics>,
    interval: Duration,
}

impl Scheduler {
    /// Creates a scheduler writing into `store`, one cycle per `interval`.
    pub fn new(
        locator: ScriptLocator,
        runner: ScriptRunner,
        store: Arc<dyn ResultStore>,
        metrics: Arc<ExporterMetrics>,
        interval: Duration,
    ) -> Self {
        Self {
            locator: Arc::new(locator),
            runner: Arc::new(runner),
            store,
            metrics,
            interval,
        }
    }

    /// Creates a scheduler with locator, runner and interval taken from
    /// `config`.
    pub fn from_config(
        config: &ExporterConfig,
        store: Arc<dyn ResultStore>,
        metrics: Arc<ExporterMetrics>,
    ) -> Self {
        Self::new(
            ScriptLocator::new(&config.path, config.extension()),
            ScriptRunner::from_config(config),
            store,
            metrics,
            config.interval(),
        )
    }

    /// Runs one cycle: walks the script root, records access failures, and
    /// spawns one runner task per script.
    ///
    /// The walk runs on the blocking pool. Returns as soon as the runner
    /// tasks are spawned. Fails if the walk found neither scripts nor access
    /// errors. Must be called inside a tokio runtime.
    pub async fn run_cycle(&self) -> Result<CycleHandle, DiscoveryError> {
        self.metrics.cycle_started(chrono::Utc::now().timestamp());

        let locator = Arc::clone(&self.locator);
        let discovery = tokio::task::spawn_blocking(move || locator.discover()).await?;
        self.metrics
            .discovered(discovery.scripts.len(), discovery.access_failures.len());

        for failure in &discovery.access_failures {
            self.store
                .put(failure.identity.clone(), CollectionResult::access_failure());
        }
        discovery.check(self.locator.root())?;

        tracing::debug!(scripts = discovery.scripts.len(), "Starting refresh cycle");

        let tasks = discovery
            .scripts
            .into_iter()
            .map(|script| self.spawn_runner(script))
            .collect();

        Ok(CycleHandle::new(tasks))
    }

    fn spawn_runner(&self, script: PathBuf) -> tokio::task::JoinHandle<()> {
        let runner = Arc::clone(&self.runner);
        let store = Arc::clone(&self.store);
        let metrics = Arc::clone(&self.metrics);

        tokio::spawn(async move {
            let outcome = runner.run(&script).await;
            metrics.record_run(outcome.label());
            // Anything but a normal exit keeps the previous entry.
            if let Some(result) = outcome.into_result() {
                store.put(script_identity(&script), result);
            }
        })
    }

    /// Runs a cycle every interval, the first one interval from now.
    ///
    /// An interval too large to represent as a deadline never fires. Only
    /// returns if a cycle finds no scripts at all.
    pub async fn run(self) -> Result<(), DiscoveryError> {
        loop {
            time::sleep(self.interval).await;
            // Runners are detached; the next cycle does not wait for them.
            drop(self.run_cycle().await?);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::cache::SharedCache;
    use crate::config::LabelSet;
    use std::fs;

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<SharedCache>,
        metrics: Arc<ExporterMetrics>,
        scheduler: Scheduler,
    }

    fn fixture(scripts: &[(&str, &str)], timeout: Duration, interval: Duration) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in scripts {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let store = Arc::new(SharedCache::new());
        let metrics = Arc::new(ExporterMetrics::new(None, &LabelSet::default()).unwrap());
        let scheduler = Scheduler::new(
            ScriptLocator::new(dir.path(), "sh"),
            ScriptRunner::new("bash", timeout, 64 * 1024),
            Arc::clone(&store) as Arc<dyn ResultStore>,
            Arc::clone(&metrics),
            interval,
        );
        Fixture {
            _dir: dir,
            store,
            metrics,
            scheduler,
        }
    }

    #[tokio::test]
    async fn test_cycle_collects_every_script() {
        let f = fixture(
            &[("a.sh", "echo 'a 1'"), ("b.sh", "echo 'b 2'; exit 3")],
            Duration::from_secs(10),
            Duration::from_secs(60),
        );

        let handle = f.scheduler.run_cycle().await.unwrap();
        assert_eq!(handle.len(), 2);
        handle.wait().await;

        let a = f.store.get("a.sh").unwrap();
        assert_eq!(a.metric_lines, vec!["a 1"]);
        assert_eq!(a.exit_status, 0);
        let b = f.store.get("b.sh").unwrap();
        assert_eq!(b.exit_status, 3);
        assert_eq!(f.metrics.cycles(), 1);
        assert_eq!(f.metrics.runs("exited"), 2);
    }

    #[tokio::test]
    async fn test_timeout_preserves_previous_entry() {
        let f = fixture(
            &[("slow.sh", "exec sleep 30")],
            Duration::from_millis(200),
            Duration::from_secs(60),
        );
        let previous = CollectionResult {
            metric_lines: vec!["slow_metric 5".into()],
            ..Default::default()
        };
        f.store.put("slow.sh".into(), previous.clone());

        f.scheduler.run_cycle().await.unwrap().wait().await;

        assert_eq!(f.store.get("slow.sh"), Some(previous));
        assert_eq!(f.metrics.runs("timeout"), 1);
    }

    #[tokio::test]
    async fn test_timeout_on_first_cycle_leaves_no_entry() {
        let f = fixture(
            &[("slow.sh", "exec sleep 30"), ("fast.sh", "echo 'fast 1'")],
            Duration::from_millis(200),
            Duration::from_secs(60),
        );

        f.scheduler.run_cycle().await.unwrap().wait().await;

        assert!(f.store.get("slow.sh").is_none());
        assert!(f.store.get("fast.sh").is_some());
    }

    #[tokio::test]
    async fn test_no_scripts_is_an_error() {
        let f = fixture(
            &[("readme.txt", "nothing")],
            Duration::from_secs(1),
            Duration::from_secs(60),
        );
        assert!(matches!(
            f.scheduler.run_cycle().await,
            Err(DiscoveryError::NoScripts(_))
        ));
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn test_cycle_does_not_wait_for_runners() {
        let f = fixture(
            &[("slow.sh", "exec sleep 30")],
            Duration::from_secs(20),
            Duration::from_secs(60),
        );

        let started = std::time::Instant::now();
        let first = f.scheduler.run_cycle().await.unwrap();
        let second = f.scheduler.run_cycle().await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(f.metrics.cycles(), 2);

        assert_eq!(first.len() + second.len(), 2);
    }

    #[tokio::test]
    async fn test_run_repeats_cycles() {
        let f = fixture(
            &[("tick.sh", "echo 'tick 1'")],
            Duration::from_secs(5),
            Duration::from_secs(1),
        );
        let metrics = Arc::clone(&f.metrics);
        let store = Arc::clone(&f.store);

        let loop_task = tokio::spawn(f.scheduler.run());
        let deadline = std::time::Instant::now() + Duration::from_secs(15);
        while metrics.cycles() < 2 || store.get("tick.sh").is_none() {
            assert!(std::time::Instant::now() < deadline, "scheduler made no progress");
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        loop_task.abort();
    }

    #[tokio::test]
    async fn test_missing_root_recorded_as_access_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SharedCache::new());
        let metrics = Arc::new(ExporterMetrics::new(None, &LabelSet::default()).unwrap());
        let scheduler = Scheduler::new(
            ScriptLocator::new(dir.path().join("gone"), "sh"),
            ScriptRunner::new("bash", Duration::from_secs(1), 64 * 1024),
            Arc::clone(&store) as Arc<dyn ResultStore>,
            Arc::clone(&metrics),
            Duration::from_secs(60),
        );

        let handle = scheduler.run_cycle().await.unwrap();
        assert!(handle.is_empty());
        assert_eq!(store.get("gone"), Some(CollectionResult::access_failure()));
    }

    #[tokio::test]
    async fn test_access_failure_beside_valid_script() {
        use std::os::unix::fs::PermissionsExt;

        let f = fixture(
            &[("ok.sh", "echo 'ok 1'")],
            Duration::from_secs(10),
            Duration::from_secs(60),
        );
        let locked = f.scheduler.locator.root().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Permission bits do not bind root.
        if fs::read_dir(&locked).is_ok() {
            return;
        }

        let handle = f.scheduler.run_cycle().await.unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(handle.len(), 1);
        handle.wait().await;

        assert_eq!(f.store.get("locked"), Some(CollectionResult::access_failure()));
        let ok = f.store.get("ok.sh").unwrap();
        assert_eq!(ok.metric_lines, vec!["ok 1"]);
        assert!(!ok.access_failed);
    }

    #[tokio::test]
    async fn test_huge_interval_waits_without_panicking() {
        let f = fixture(
            &[("never.sh", "echo 'never 1'")],
            Duration::from_secs(1),
            Duration::MAX,
        );
        let metrics = Arc::clone(&f.metrics);

        let loop_task = tokio::spawn(f.scheduler.run());
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!loop_task.is_finished());
        assert_eq!(metrics.cycles(), 0);
        loop_task.abort();
    }
}
