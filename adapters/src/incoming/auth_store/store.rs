use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};
use url::Url;

use domain::auth::{User, UserId};
use domain::auth_state::{AuthState, AuthTransition};
use domain::profile::{AvatarFile, Profile, ProfileUpdate};
use domain::session::Session;
use petfinder_application::{
    error::{AppError, AppResult},
    ports::incoming::auth::AuthUseCase,
};

/// Single source of truth for what the UI shows about authentication.
///
/// Every action follows the same shape: mark loading and clear the previous
/// error, run the use case, merge the result (or record the error message),
/// then clear loading. Overlapping actions are not serialized; callers are
/// expected to keep controls disabled while `loading` is set.
pub struct AuthStore {
    pub(super) auth_use_case: Arc<dyn AuthUseCase>,
    state: watch::Sender<AuthState>,
}

impl AuthStore {
    pub fn new(auth_use_case: Arc<dyn AuthUseCase>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            auth_use_case,
            state,
        }
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Observers see each committed transition, never a half-applied one.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current_user_id(&self) -> Option<UserId> {
        self.state.borrow().user.as_ref().map(|user| user.id.clone())
    }

    pub(super) fn apply(&self, transition: AuthTransition) -> bool {
        let mut accepted = true;
        self.state
            .send_modify(|state| accepted = state.apply(transition));
        accepted
    }

    async fn run<T, F>(&self, action: &'static str, operation: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.apply(AuthTransition::ActionStarted);
        let result = operation.await;
        if let Err(e) = &result {
            warn!(action, error = %e, "Auth action failed");
            self.apply(AuthTransition::ActionFailed(e.to_string()));
        }
        self.apply(AuthTransition::ActionSettled);
        result
    }

    fn merge_profile(&self, profile: Profile) {
        let profile_id = profile.id.clone();
        if !self.apply(AuthTransition::ProfileLoaded(profile)) {
            warn!(profile_id = %profile_id, "Discarded profile that belongs to another user");
        }
    }

    pub async fn initialize(&self) -> AppResult<()> {
        self.run("initialize", async {
            let session = self.auth_use_case.get_session().await?;
            let user = session.as_ref().map(|session| session.user.clone());
            self.apply(AuthTransition::SessionLoaded(session));

            if let Some(user) = user {
                let user_id = user.id.clone();
                self.apply(AuthTransition::UserLoaded(user));

                match self.auth_use_case.get_profile(user_id.clone()).await {
                    Ok(profile) => self.merge_profile(profile),
                    Err(e) => warn!(user_id = %user_id, error = %e, "Error fetching profile"),
                }
            }
            Ok(())
        })
        .await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<User> {
        self.run("sign_in", async {
            let user = self
                .auth_use_case
                .sign_in(email.to_string(), password.to_string())
                .await?;
            self.apply(AuthTransition::UserLoaded(user.clone()));
            Ok(user)
        })
        .await
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
        city: &str,
    ) -> AppResult<User> {
        self.run("sign_up", async {
            let user = self
                .auth_use_case
                .sign_up(
                    email.to_string(),
                    password.to_string(),
                    name.to_string(),
                    city.to_string(),
                )
                .await?;
            self.apply(AuthTransition::UserLoaded(user.clone()));
            Ok(user)
        })
        .await
    }

    /// Returns the provider page to send the user to. State changes once
    /// the callback code is exchanged.
    pub async fn sign_in_with_google(&self) -> AppResult<Url> {
        self.run("sign_in_with_google", self.auth_use_case.sign_in_with_google())
            .await
    }

    pub async fn complete_google_sign_in(&self, auth_code: &str) -> AppResult<Session> {
        self.run("complete_google_sign_in", async {
            let session = self
                .auth_use_case
                .exchange_code_for_session(auth_code.to_string())
                .await?;
            self.apply(AuthTransition::SessionLoaded(Some(session.clone())));
            self.apply(AuthTransition::UserLoaded(session.user.clone()));
            Ok(session)
        })
        .await
    }

    pub async fn sign_out(&self) -> AppResult<()> {
        self.run("sign_out", async {
            self.auth_use_case.sign_out().await?;
            self.apply(AuthTransition::SignedOut);
            info!("Auth state cleared after sign out");
            Ok(())
        })
        .await
    }

    pub async fn reset_password(&self, email: &str) -> AppResult<()> {
        self.run(
            "reset_password",
            self.auth_use_case.reset_password(email.to_string()),
        )
        .await
    }

    pub async fn update_profile(&self, updates: ProfileUpdate) -> AppResult<Profile> {
        self.run("update_profile", async {
            let user_id = self.current_user_id().ok_or(AppError::NoUserLoggedIn)?;
            let profile = self
                .auth_use_case
                .update_profile(user_id, updates)
                .await?;
            self.merge_profile(profile.clone());
            Ok(profile)
        })
        .await
    }

    pub async fn upload_avatar(&self, file: AvatarFile) -> AppResult<String> {
        self.run("upload_avatar", async {
            let user_id = self.current_user_id().ok_or(AppError::NoUserLoggedIn)?;
            let avatar_url = self.auth_use_case.upload_avatar(user_id, file).await?;
            self.apply(AuthTransition::AvatarChanged(avatar_url.clone()));
            Ok(avatar_url)
        })
        .await
    }

    pub fn set_error(&self, error: Option<String>) {
        self.apply(AuthTransition::ErrorSet(error));
    }

    pub fn clear_error(&self) {
        self.apply(AuthTransition::ErrorSet(None));
    }

    /// Overwrites the profile outside of an action, as mutation hooks do.
    pub fn set_profile(&self, profile: Profile) {
        self.merge_profile(profile);
    }
}
