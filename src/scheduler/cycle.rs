//! Handle on the runner tasks of one refresh cycle.

use tokio::task::JoinHandle;

/// The runner tasks spawned by one cycle.
///
/// Dropping the handle detaches the tasks; they keep running and still
/// write their results.
#[derive(Debug, Default)]
pub struct CycleHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl CycleHandle {
    pub(crate) fn new(tasks: Vec<JoinHandle<()>>) -> Self {
        Self { tasks }
    }

    /// Number of scripts launched.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if the cycle launched nothing.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits until every runner of the cycle has finished.
    pub async fn wait(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Script runner task failed");
            }
        }
    }
}
