use oauth2::{PkceCodeChallenge, PkceCodeVerifier};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::dto::{
    PasswordGrant, PkceGrant, RecoverRequest, RefreshGrant, SessionResponse, SignUpMetadata,
    SignUpRequest, SignUpResponse, UploadResponse,
};
use super::http::{SupabaseHttp, SupabaseSettings};
use crate::outgoing::auth_events::listener_registry::AuthListenerRegistry;
use domain::auth::{AuthProvider, User, UserId};
use domain::events::{AuthChangeEvent, AuthStateChange};
use domain::profile::{AvatarFile, Profile, ProfileUpdate};
use domain::session::Session;
use petfinder_application::{
    auth::subscription::{AuthChangeCallback, AuthSubscription},
    error::{AppError, AppResult},
    ports::outgoing::auth_repository::AuthRepositoryPort,
};

const AUTH_CALLBACK_PATH: &str = "auth/callback";
const RESET_PASSWORD_PATH: &str = "auth/reset-password";
const AVATAR_FOLDER: &str = "avatars";

/// Supabase-backed repository. Holds the current session the way the
/// official JS client does and announces every change to registered
/// listeners.
pub struct SupabaseAuthAdapter {
    http: SupabaseHttp,
    avatar_bucket: String,
    profiles_table: String,
    site_url: Url,
    session: RwLock<Option<Session>>,
    pkce_verifier: Mutex<Option<PkceCodeVerifier>>,
    listeners: AuthListenerRegistry,
}

impl SupabaseAuthAdapter {
    pub fn new(settings: &SupabaseSettings) -> AppResult<Self> {
        Ok(Self {
            http: SupabaseHttp::new(settings)?,
            avatar_bucket: settings.avatar_bucket.clone(),
            profiles_table: settings.profiles_table.clone(),
            site_url: settings.site_url.clone(),
            session: RwLock::new(None),
            pkce_verifier: Mutex::new(None),
            listeners: AuthListenerRegistry::new(),
        })
    }

    /// Session currently held, without refreshing it.
    pub async fn current_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    fn auth_endpoint(&self, path: &str) -> AppResult<Url> {
        self.http.endpoint(["auth", "v1", path])
    }

    fn redirect_url(&self, path: &str) -> AppResult<Url> {
        self.site_url.join(path).map_err(|e| AppError::InvalidUrl {
            message: format!("Cannot build redirect URL for '{path}': {e}"),
        })
    }

    fn profiles_url(&self, user_id: &UserId) -> AppResult<Url> {
        let mut url = self.http.endpoint(["rest", "v1", self.profiles_table.as_str()])?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{user_id}"))
            .append_pair("select", "*");
        Ok(url)
    }

    fn avatar_object_path(user_id: &UserId, file: &AvatarFile, now: OffsetDateTime) -> String {
        let millis = now.unix_timestamp_nanos() / 1_000_000;
        format!(
            "{AVATAR_FOLDER}/{user_id}-{millis}.{}",
            file.extension()
        )
    }

    fn public_object_url(&self, object_path: &str) -> AppResult<Url> {
        let segments = ["storage", "v1", "object", "public", self.avatar_bucket.as_str()]
            .into_iter()
            .chain(object_path.split('/'));
        self.http.endpoint(segments)
    }

    async fn access_token(&self) -> Option<SecretString> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    async fn grant_token(&self, grant_type: &str, body: &impl serde::Serialize) -> AppResult<Session> {
        let mut url = self.auth_endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let response: SessionResponse = self
            .http
            .send_json(self.http.request(Method::POST, url, None).json(body))
            .await?;
        response.into_session(OffsetDateTime::now_utc())
    }

    async fn store_session(&self, session: Option<Session>, event: AuthChangeEvent) {
        {
            let mut slot = self.session.write().await;
            slot.clone_from(&session);
        }
        self.listeners.emit(&AuthStateChange::new(event, session));
    }
}

#[async_trait::async_trait]
impl AuthRepositoryPort for SupabaseAuthAdapter {
    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<User> {
        let session = self
            .grant_token("password", &PasswordGrant { email, password })
            .await?;
        let user = session.user.clone();

        info!(user_id = %user.id, "Signed in with password");
        self.store_session(Some(session), AuthChangeEvent::SignedIn)
            .await;
        Ok(user)
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
        city: &str,
    ) -> AppResult<User> {
        let request = SignUpRequest {
            email,
            password,
            data: SignUpMetadata { name, city },
        };
        let response: SignUpResponse = self
            .http
            .send_json(
                self.http
                    .request(Method::POST, self.auth_endpoint("signup")?, None)
                    .json(&request),
            )
            .await?;

        match response {
            SignUpResponse::Session(response) => {
                let session = response.into_session(OffsetDateTime::now_utc())?;
                let user = session.user.clone();
                info!(user_id = %user.id, "Signed up with immediate session");
                self.store_session(Some(session), AuthChangeEvent::SignedIn)
                    .await;
                Ok(user)
            }
            SignUpResponse::User(user) => {
                let user = user.into_user();
                info!(user_id = %user.id, "Signed up, awaiting email confirmation");
                Ok(user)
            }
        }
    }

    #[instrument(skip(self))]
    async fn sign_in_with_google(&self) -> AppResult<Url> {
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let redirect_to = self.redirect_url(AUTH_CALLBACK_PATH)?;

        let mut url = self.auth_endpoint("authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", AuthProvider::Google.as_str())
            .append_pair("redirect_to", redirect_to.as_str())
            .append_pair("code_challenge", challenge.as_str())
            .append_pair("code_challenge_method", "s256");

        *self.pkce_verifier.lock().await = Some(verifier);
        debug!(redirect_to = %redirect_to, "Prepared Google OAuth redirect");
        Ok(url)
    }

    #[instrument(skip(self, auth_code))]
    async fn exchange_code_for_session(&self, auth_code: &str) -> AppResult<Session> {
        let verifier = self
            .pkce_verifier
            .lock()
            .await
            .take()
            .ok_or_else(|| AppError::remote(None, "No OAuth sign-in in progress"))?;

        let session = self
            .grant_token(
                "pkce",
                &PkceGrant {
                    auth_code,
                    code_verifier: verifier.secret(),
                },
            )
            .await?;

        info!(user_id = %session.user.id, "Signed in with OAuth code");
        self.store_session(Some(session.clone()), AuthChangeEvent::SignedIn)
            .await;
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> AppResult<()> {
        if let Some(access_token) = self.access_token().await {
            let request =
                self.http
                    .request(Method::POST, self.auth_endpoint("logout")?, Some(&access_token));
            match self.http.send_empty(request).await {
                Ok(()) => {}
                // The token is already gone on the server; finish locally.
                Err(AppError::RemoteService {
                    status: Some(401 | 403 | 404),
                    message,
                }) => debug!(%message, "Session already invalid on server"),
                Err(e) => return Err(e),
            }
        }

        info!("Signed out");
        self.store_session(None, AuthChangeEvent::SignedOut).await;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn reset_password(&self, email: &str) -> AppResult<()> {
        let mut url = self.auth_endpoint("recover")?;
        url.query_pairs_mut().append_pair(
            "redirect_to",
            self.redirect_url(RESET_PASSWORD_PATH)?.as_str(),
        );

        self.http
            .send_empty(
                self.http
                    .request(Method::POST, url, None)
                    .json(&RecoverRequest { email }),
            )
            .await
    }

    #[instrument(skip(self))]
    async fn get_profile(&self, user_id: &UserId) -> AppResult<Profile> {
        let access_token = self.access_token().await;
        let rows: Vec<Profile> = self
            .http
            .send_json(self.http.request(
                Method::GET,
                self.profiles_url(user_id)?,
                access_token.as_ref(),
            ))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("Profile"))
    }

    #[instrument(skip(self, updates))]
    async fn update_profile(&self, user_id: &UserId, updates: &ProfileUpdate) -> AppResult<Profile> {
        let access_token = self.access_token().await;
        let request = self
            .http
            .request(
                Method::PATCH,
                self.profiles_url(user_id)?,
                access_token.as_ref(),
            )
            .header("Prefer", "return=representation")
            .json(updates);
        let rows: Vec<Profile> = self.http.send_json(request).await?;

        let profile = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("Profile"))?;
        info!(user_id = %profile.id, "Profile updated");
        Ok(profile)
    }

    #[instrument(skip(self, file), fields(file_name = %file.file_name, size = file.bytes.len()))]
    async fn upload_avatar(&self, user_id: &UserId, file: &AvatarFile) -> AppResult<String> {
        let object_path = Self::avatar_object_path(user_id, file, OffsetDateTime::now_utc());
        let upload_url = self.http.endpoint(
            ["storage", "v1", "object", self.avatar_bucket.as_str()]
                .into_iter()
                .chain(object_path.split('/')),
        )?;

        let access_token = self.access_token().await;
        let content_type = file
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");
        let request = self
            .http
            .request(Method::POST, upload_url, access_token.as_ref())
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(file.bytes.clone());
        let uploaded: UploadResponse = self.http.send_json(request).await?;
        debug!(key = ?uploaded.key, "Avatar stored");

        let public_url = self.public_object_url(&object_path)?;
        Ok(public_url.to_string())
    }

    async fn get_session(&self) -> AppResult<Option<Session>> {
        let expired = match self.session.read().await.as_ref() {
            None => return Ok(None),
            Some(session) => session.is_expired_at(OffsetDateTime::now_utc()),
        };

        if expired {
            debug!("Stored session expired, refreshing");
            return self.refresh_session().await;
        }
        Ok(self.current_session().await)
    }

    #[instrument(skip(self))]
    async fn refresh_session(&self) -> AppResult<Option<Session>> {
        let Some(refresh_token) = self
            .session
            .read()
            .await
            .as_ref()
            .map(|session| session.refresh_token.clone())
        else {
            return Ok(None);
        };

        let session = self
            .grant_token(
                "refresh_token",
                &RefreshGrant {
                    refresh_token: refresh_token.expose_secret(),
                },
            )
            .await
            .inspect_err(|e| warn!(error = %e, "Session refresh failed"))?;

        self.store_session(Some(session.clone()), AuthChangeEvent::TokenRefreshed)
            .await;
        Ok(Some(session))
    }

    fn on_auth_state_change(&self, callback: AuthChangeCallback) -> AuthSubscription {
        self.listeners.subscribe(callback)
    }
}
