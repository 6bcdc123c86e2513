use tokio::runtime::Handle;
use tracing::warn;

use petfinder_application::ports::outgoing::task_spawn::{SpawnedTask, TaskSpawnPort};

/// Spawns onto the tokio runtime the adapter was created in, so callbacks
/// fired from any thread still land on it.
pub struct TokioTaskSpawnAdapter {
    handle: Handle,
}

impl TokioTaskSpawnAdapter {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime of the calling context, if there is one.
    pub fn current() -> Option<Self> {
        match Handle::try_current() {
            Ok(handle) => Some(Self::new(handle)),
            Err(e) => {
                warn!("No tokio runtime available for task spawning: {}", e);
                None
            }
        }
    }
}

impl TaskSpawnPort for TokioTaskSpawnAdapter {
    fn spawn(&self, task: SpawnedTask) {
        self.handle.spawn(task);
    }
}
