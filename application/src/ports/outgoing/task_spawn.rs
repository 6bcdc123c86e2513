use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type SpawnedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Runs listener follow-up work (such as re-initializing the auth state)
/// outside the callback that triggered it.
pub trait TaskSpawnPort: Send + Sync {
    fn spawn(&self, task: SpawnedTask);
}

pub type DynTaskSpawnPort = Arc<dyn TaskSpawnPort>;
