use std::fmt;
use std::sync::Arc;

use domain::events::AuthStateChange;

pub type AuthChangeCallback = Arc<dyn Fn(&AuthStateChange) + Send + Sync>;

/// Live registration on the auth change stream. Dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes the listener immediately"]
pub struct AuthSubscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl AuthSubscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A subscription with nothing to release.
    pub fn detached() -> Self {
        Self { unsubscribe: None }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for AuthSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSubscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
