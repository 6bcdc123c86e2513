#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use time::macros::datetime;
use tokio::sync::Notify;
use url::Url;

use domain::auth::{User, UserId};
use domain::profile::{AvatarFile, Profile, ProfileUpdate, Role};
use domain::session::Session;
use petfinder_adapters::outgoing::auth_events::listener_registry::AuthListenerRegistry;
use petfinder_application::{
    auth::subscription::{AuthChangeCallback, AuthSubscription},
    error::{AppError, AppResult},
    ports::incoming::auth::AuthUseCase,
};

pub const AVATAR_URL: &str = "https://example.com/avatar.jpg";

pub fn user() -> User {
    User::new(UserId::from("u1"), "a@b.com", datetime!(2024-01-01 0:00 UTC))
}

pub fn profile() -> Profile {
    Profile {
        id: UserId::from("u1"),
        role: Role::Adoptante,
        name: "A".to_string(),
        city: "X".to_string(),
        avatar_url: None,
        verified: false,
        created_at: datetime!(2024-01-01 0:00 UTC),
        updated_at: datetime!(2024-01-01 0:00 UTC),
    }
}

pub fn session() -> Session {
    Session::new(
        SecretString::from("access-token"),
        SecretString::from("refresh-token"),
        datetime!(2999-01-01 0:00 UTC),
        user(),
    )
}

/// In-memory use case. Records every call and answers from canned data.
#[derive(Default)]
pub struct FakeAuthUseCase {
    calls: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
    profile_failure: Mutex<Option<String>>,
    session: Mutex<Option<Session>>,
    profile: Mutex<Option<Profile>>,
    gate: Mutex<Option<Arc<Notify>>>,
    pub listeners: AuthListenerRegistry,
}

impl FakeAuthUseCase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_session_and_profile() -> Arc<Self> {
        let fake = Self::new();
        fake.set_session(Some(session()));
        fake.set_profile(Some(profile()));
        fake
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_profile_with(&self, message: &str) {
        *self.profile_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn set_session(&self, session: Option<Session>) {
        *self.session.lock().unwrap() = session;
    }

    pub fn set_profile(&self, profile: Option<Profile>) {
        *self.profile.lock().unwrap() = profile;
    }

    /// Makes the next call wait until the returned handle is notified.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    fn record(&self, call: impl Into<String>) -> AppResult<()> {
        self.calls.lock().unwrap().push(call.into());
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(AppError::remote(Some(400), message)),
            None => Ok(()),
        }
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait::async_trait]
impl AuthUseCase for FakeAuthUseCase {
    async fn sign_in(&self, email: String, password: String) -> AppResult<User> {
        self.pass_gate().await;
        self.record(format!("sign_in {email} {password}"))?;
        Ok(User {
            email,
            ..user()
        })
    }

    async fn sign_up(
        &self,
        email: String,
        password: String,
        name: String,
        city: String,
    ) -> AppResult<User> {
        self.pass_gate().await;
        self.record(format!("sign_up {email} {password} {name} {city}"))?;
        Ok(User {
            email,
            ..user()
        })
    }

    async fn sign_in_with_google(&self) -> AppResult<Url> {
        self.pass_gate().await;
        self.record("sign_in_with_google")?;
        Ok(Url::parse("https://test.supabase.co/auth/v1/authorize?provider=google").unwrap())
    }

    async fn exchange_code_for_session(&self, auth_code: String) -> AppResult<Session> {
        self.pass_gate().await;
        self.record(format!("exchange {auth_code}"))?;
        Ok(session())
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.pass_gate().await;
        tokio::task::yield_now().await;
        self.record("sign_out")
    }

    async fn reset_password(&self, email: String) -> AppResult<()> {
        self.pass_gate().await;
        self.record(format!("reset_password {email}"))
    }

    async fn get_profile(&self, user_id: UserId) -> AppResult<Profile> {
        self.pass_gate().await;
        self.record(format!("get_profile {user_id}"))?;
        if let Some(message) = self.profile_failure.lock().unwrap().clone() {
            return Err(AppError::remote(Some(500), message));
        }
        self.profile
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::not_found("Profile"))
    }

    async fn update_profile(&self, user_id: UserId, updates: ProfileUpdate) -> AppResult<Profile> {
        self.pass_gate().await;
        self.record(format!("update_profile {user_id}"))?;
        let mut profile = self.profile.lock().unwrap().clone().unwrap_or_else(profile);
        if let Some(name) = updates.name {
            profile.name = name;
        }
        if let Some(city) = updates.city {
            profile.city = city;
        }
        *self.profile.lock().unwrap() = Some(profile.clone());
        Ok(profile)
    }

    async fn upload_avatar(&self, user_id: UserId, file: AvatarFile) -> AppResult<String> {
        self.pass_gate().await;
        self.record(format!("upload_avatar {user_id} {}", file.file_name))?;
        Ok(AVATAR_URL.to_string())
    }

    async fn get_session(&self) -> AppResult<Option<Session>> {
        self.pass_gate().await;
        self.record("get_session")?;
        Ok(self.session.lock().unwrap().clone())
    }

    async fn refresh_session(&self) -> AppResult<Option<Session>> {
        self.pass_gate().await;
        self.record("refresh_session")?;
        Ok(self.session.lock().unwrap().clone())
    }

    fn on_auth_state_change(&self, callback: AuthChangeCallback) -> AuthSubscription {
        self.listeners.subscribe(callback)
    }
}
