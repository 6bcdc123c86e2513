use url::Url;

use crate::auth::subscription::{AuthChangeCallback, AuthSubscription};
use crate::error::AppResult;
use crate::ports::incoming::auth::AuthUseCase;
use crate::ports::outgoing::auth_repository::DynAuthRepositoryPort;
use domain::auth::{User, UserId};
use domain::profile::{AvatarFile, Profile, ProfileUpdate};
use domain::session::Session;

/// Names the boundary between the state container and the backend. Every
/// method forwards to the repository unchanged.
pub struct AuthService {
    auth_repository: DynAuthRepositoryPort,
}

impl AuthService {
    pub fn new(auth_repository: DynAuthRepositoryPort) -> Self {
        Self { auth_repository }
    }
}

#[async_trait::async_trait]
impl AuthUseCase for AuthService {
    async fn sign_in(&self, email: String, password: String) -> AppResult<User> {
        self.auth_repository.sign_in(&email, &password).await
    }

    async fn sign_up(
        &self,
        email: String,
        password: String,
        name: String,
        city: String,
    ) -> AppResult<User> {
        self.auth_repository
            .sign_up(&email, &password, &name, &city)
            .await
    }

    async fn sign_in_with_google(&self) -> AppResult<Url> {
        self.auth_repository.sign_in_with_google().await
    }

    async fn exchange_code_for_session(&self, auth_code: String) -> AppResult<Session> {
        self.auth_repository
            .exchange_code_for_session(&auth_code)
            .await
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.auth_repository.sign_out().await
    }

    async fn reset_password(&self, email: String) -> AppResult<()> {
        self.auth_repository.reset_password(&email).await
    }

    async fn get_profile(&self, user_id: UserId) -> AppResult<Profile> {
        self.auth_repository.get_profile(&user_id).await
    }

    async fn update_profile(&self, user_id: UserId, updates: ProfileUpdate) -> AppResult<Profile> {
        self.auth_repository
            .update_profile(&user_id, &updates)
            .await
    }

    async fn upload_avatar(&self, user_id: UserId, file: AvatarFile) -> AppResult<String> {
        self.auth_repository.upload_avatar(&user_id, &file).await
    }

    async fn get_session(&self) -> AppResult<Option<Session>> {
        self.auth_repository.get_session().await
    }

    async fn refresh_session(&self) -> AppResult<Option<Session>> {
        self.auth_repository.refresh_session().await
    }

    fn on_auth_state_change(&self, callback: AuthChangeCallback) -> AuthSubscription {
        self.auth_repository.on_auth_state_change(callback)
    }
}
