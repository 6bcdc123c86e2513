use std::sync::Arc;

use url::Url;

use crate::auth::subscription::{AuthChangeCallback, AuthSubscription};
use crate::error::AppResult;
use domain::auth::{User, UserId};
use domain::profile::{AvatarFile, Profile, ProfileUpdate};
use domain::session::Session;

/// Everything the app needs from the auth/data backend.
#[async_trait::async_trait]
pub trait AuthRepositoryPort: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<User>;
    async fn sign_up(&self, email: &str, password: &str, name: &str, city: &str)
    -> AppResult<User>;
    /// Returns the provider URL the user has to be sent to.
    async fn sign_in_with_google(&self) -> AppResult<Url>;
    async fn exchange_code_for_session(&self, auth_code: &str) -> AppResult<Session>;
    async fn sign_out(&self) -> AppResult<()>;
    async fn reset_password(&self, email: &str) -> AppResult<()>;

    async fn get_profile(&self, user_id: &UserId) -> AppResult<Profile>;
    async fn update_profile(&self, user_id: &UserId, updates: &ProfileUpdate)
    -> AppResult<Profile>;
    async fn upload_avatar(&self, user_id: &UserId, file: &AvatarFile) -> AppResult<String>;

    async fn get_session(&self) -> AppResult<Option<Session>>;
    async fn refresh_session(&self) -> AppResult<Option<Session>>;
    fn on_auth_state_change(&self, callback: AuthChangeCallback) -> AuthSubscription;
}

pub type DynAuthRepositoryPort = Arc<dyn AuthRepositoryPort>;
