use std::future::Future;

use tokio::sync::watch;

use petfinder_application::error::AppResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error(String),
}

/// Tracks the lifecycle of one triggerable operation.
pub struct MutationTracker {
    status: watch::Sender<MutationStatus>,
}

impl MutationTracker {
    pub fn new() -> Self {
        let (status, _) = watch::channel(MutationStatus::Idle);
        Self { status }
    }

    pub fn status(&self) -> MutationStatus {
        self.status.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        *self.status.borrow() == MutationStatus::Pending
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationStatus> {
        self.status.subscribe()
    }

    pub fn reset(&self) {
        self.status.send_replace(MutationStatus::Idle);
    }

    pub async fn track<T, F>(&self, operation: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.status.send_replace(MutationStatus::Pending);
        let result = operation.await;
        self.status.send_replace(match &result {
            Ok(_) => MutationStatus::Success,
            Err(e) => MutationStatus::Error(e.to_string()),
        });
        result
    }
}

impl Default for MutationTracker {
    fn default() -> Self {
        Self::new()
    }
}
