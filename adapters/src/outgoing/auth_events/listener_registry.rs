use std::sync::{
    Arc, Weak,
    atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;
use tracing::debug;

use domain::events::AuthStateChange;
use petfinder_application::auth::subscription::{AuthChangeCallback, AuthSubscription};

type Listeners = DashMap<u64, AuthChangeCallback>;

/// Fan-out of auth change events to registered callbacks.
pub struct AuthListenerRegistry {
    listeners: Arc<Listeners>,
    next_id: AtomicU64,
}

impl AuthListenerRegistry {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self, callback: AuthChangeCallback) -> AuthSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.insert(id, callback);
        debug!(listener_id = id, "Auth listener registered");

        let listeners: Weak<Listeners> = Arc::downgrade(&self.listeners);
        AuthSubscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.remove(&id);
                debug!(listener_id = id, "Auth listener removed");
            }
        })
    }

    /// Callbacks run after the map guards are released, so a callback may
    /// subscribe or unsubscribe without deadlocking.
    pub fn emit(&self, change: &AuthStateChange) {
        let callbacks: Vec<AuthChangeCallback> = self
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        debug!(
            event = %change.event,
            listeners = callbacks.len(),
            "Emitting auth state change"
        );

        for callback in callbacks {
            callback(change);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for AuthListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
