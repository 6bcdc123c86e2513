use std::sync::Arc;

use tracing::{debug, info, warn};

use super::store::AuthStore;
use domain::auth_state::AuthTransition;
use domain::events::{AuthChangeEvent, AuthStateChange};
use petfinder_application::{
    auth::subscription::{AuthChangeCallback, AuthSubscription},
    ports::outgoing::task_spawn::{DynTaskSpawnPort, TaskSpawnPort},
};

impl AuthStore {
    /// Starts following the backend's auth change stream. The listener
    /// lives as long as the returned subscription.
    pub fn listen(self: &Arc<Self>, spawner: DynTaskSpawnPort) -> AuthSubscription {
        let store = Arc::downgrade(self);
        let callback: AuthChangeCallback = Arc::new(move |change: &AuthStateChange| {
            if let Some(store) = store.upgrade() {
                store.on_auth_change(change, spawner.as_ref());
            }
        });

        info!("Listening for auth state changes");
        self.auth_use_case.on_auth_state_change(callback)
    }

    fn on_auth_change(self: &Arc<Self>, change: &AuthStateChange, spawner: &dyn TaskSpawnPort) {
        match &change.event {
            AuthChangeEvent::SignedIn | AuthChangeEvent::TokenRefreshed => {
                debug!(event = %change.event, "Re-initializing auth state");
                let store = Arc::clone(self);
                spawner.spawn(Box::pin(async move {
                    if let Err(e) = store.initialize().await {
                        warn!(error = %e, "Re-initialization after auth change failed");
                    }
                }));
            }
            AuthChangeEvent::SignedOut => {
                self.apply(AuthTransition::ForcedSignOut);
            }
            other => debug!(event = %other, "Ignoring auth state change"),
        }
    }
}
