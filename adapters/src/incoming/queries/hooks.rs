use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;
use url::Url;

use super::cache::{CachedValue, QueryClient};
use super::keys::QueryKey;
use super::mutation::{MutationStatus, MutationTracker};
use crate::incoming::auth_store::store::AuthStore;
use domain::auth::{User, UserId};
use domain::profile::{AvatarFile, Profile, ProfileUpdate};
use domain::session::Session;
use petfinder_application::{error::AppResult, ports::incoming::auth::AuthUseCase};

/// Cached queries and tracked mutations over the auth store, the bindings
/// UI code calls instead of reaching into the store directly.
pub struct AuthQueries {
    store: Arc<AuthStore>,
    auth_use_case: Arc<dyn AuthUseCase>,
    client: Arc<QueryClient>,
}

impl AuthQueries {
    pub fn new(
        store: Arc<AuthStore>,
        auth_use_case: Arc<dyn AuthUseCase>,
        client: Arc<QueryClient>,
    ) -> Self {
        Self {
            store,
            auth_use_case,
            client,
        }
    }

    pub fn client(&self) -> &Arc<QueryClient> {
        &self.client
    }

    /// Disabled (returns `None`) until there is a user id to query for.
    pub async fn profile(&self, user_id: Option<&UserId>) -> AppResult<Option<Profile>> {
        let Some(user_id) = user_id else {
            return Ok(None);
        };

        let key = QueryKey::profile(user_id);
        if let Some(CachedValue::Profile(profile)) = self.client.get_fresh(&key) {
            debug!(key = %key, "Serving profile from cache");
            return Ok(Some(profile));
        }

        let profile = self.auth_use_case.get_profile(user_id.clone()).await?;
        self.client.set(key, CachedValue::Profile(profile.clone()));
        Ok(Some(profile))
    }

    pub async fn session(&self) -> AppResult<Option<Session>> {
        if let Some(CachedValue::Session(session)) = self.client.get_fresh(&QueryKey::Session) {
            return Ok(session);
        }

        let session = self.auth_use_case.get_session().await?;
        self.client
            .set(QueryKey::Session, CachedValue::Session(session.clone()));
        Ok(session)
    }

    pub fn sign_in(&self) -> Mutation<SignIn> {
        self.mutation()
    }

    pub fn sign_up(&self) -> Mutation<SignUp> {
        self.mutation()
    }

    pub fn sign_in_with_google(&self) -> Mutation<SignInWithGoogle> {
        self.mutation()
    }

    pub fn sign_out(&self) -> Mutation<SignOut> {
        self.mutation()
    }

    pub fn reset_password(&self) -> Mutation<ResetPassword> {
        self.mutation()
    }

    pub fn update_profile(&self) -> Mutation<UpdateProfile> {
        self.mutation()
    }

    pub fn upload_avatar(&self) -> Mutation<UploadAvatar> {
        self.mutation()
    }

    fn mutation<K>(&self) -> Mutation<K> {
        Mutation {
            store: Arc::clone(&self.store),
            client: Arc::clone(&self.client),
            tracker: MutationTracker::new(),
            kind: PhantomData,
        }
    }
}

pub struct SignIn;
pub struct SignUp;
pub struct SignInWithGoogle;
pub struct SignOut;
pub struct ResetPassword;
pub struct UpdateProfile;
pub struct UploadAvatar;

/// A store action bound to its own pending/success/error status. `K`
/// selects which action `mutate` runs.
pub struct Mutation<K> {
    store: Arc<AuthStore>,
    client: Arc<QueryClient>,
    tracker: MutationTracker,
    kind: PhantomData<fn() -> K>,
}

impl<K> Mutation<K> {
    pub fn status(&self) -> MutationStatus {
        self.tracker.status()
    }

    pub fn is_pending(&self) -> bool {
        self.tracker.is_pending()
    }

    pub fn tracker(&self) -> &MutationTracker {
        &self.tracker
    }

    fn refresh_cached_profile(&self, profile: Profile) {
        let key = QueryKey::profile(&profile.id);
        self.store.set_profile(profile);
        self.client.invalidate(&key);
    }
}

impl Mutation<SignIn> {
    pub async fn mutate(&self, email: &str, password: &str) -> AppResult<User> {
        self.tracker.track(self.store.sign_in(email, password)).await
    }
}

impl Mutation<SignUp> {
    pub async fn mutate(
        &self,
        email: &str,
        password: &str,
        name: &str,
        city: &str,
    ) -> AppResult<User> {
        self.tracker
            .track(self.store.sign_up(email, password, name, city))
            .await
    }
}

impl Mutation<SignInWithGoogle> {
    pub async fn mutate(&self) -> AppResult<Url> {
        self.tracker.track(self.store.sign_in_with_google()).await
    }
}

impl Mutation<SignOut> {
    pub async fn mutate(&self) -> AppResult<()> {
        self.tracker.track(self.store.sign_out()).await?;
        self.client.clear();
        Ok(())
    }
}

impl Mutation<ResetPassword> {
    pub async fn mutate(&self, email: &str) -> AppResult<()> {
        self.tracker.track(self.store.reset_password(email)).await
    }
}

impl Mutation<UpdateProfile> {
    pub async fn mutate(&self, updates: ProfileUpdate) -> AppResult<Profile> {
        let profile = self
            .tracker
            .track(self.store.update_profile(updates))
            .await?;
        self.refresh_cached_profile(profile.clone());
        Ok(profile)
    }
}

impl Mutation<UploadAvatar> {
    pub async fn mutate(&self, file: AvatarFile) -> AppResult<String> {
        let avatar_url = self.tracker.track(self.store.upload_avatar(file)).await?;
        if let Some(profile) = self.store.snapshot().profile {
            self.refresh_cached_profile(profile.with_avatar_url(avatar_url.clone()));
        }
        Ok(avatar_url)
    }
}
