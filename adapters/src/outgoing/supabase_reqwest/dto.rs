use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use domain::auth::{User, UserId};
use domain::session::Session;
use petfinder_application::error::{AppError, AppResult};

const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
pub(crate) struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: SignUpMetadata<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignUpMetadata<'a> {
    pub name: &'a str,
    pub city: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PkceGrant<'a> {
    pub auth_code: &'a str,
    pub code_verifier: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecoverRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoTrueUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl GoTrueUser {
    pub fn into_user(self) -> User {
        User::new(
            UserId::new(self.id),
            self.email.unwrap_or_default(),
            self.created_at,
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: Option<GoTrueUser>,
}

impl SessionResponse {
    pub fn into_session(self, now: OffsetDateTime) -> AppResult<Session> {
        let user = self.user.ok_or(AppError::NoUserReturned)?.into_user();
        let expires_at = match self
            .expires_at
            .and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok())
        {
            Some(expires_at) => expires_at,
            None => {
                let expires_in = self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
                now.checked_add(Duration::seconds(expires_in)).ok_or_else(|| {
                    AppError::remote(None, format!("Session expiry out of range: {expires_in}s"))
                })?
            }
        };

        Ok(Session::new(
            SecretString::from(self.access_token),
            SecretString::from(self.refresh_token),
            expires_at,
            user,
        ))
    }
}

/// Sign-up answers with a full session when email confirmation is off and
/// with the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignUpResponse {
    Session(SessionResponse),
    User(GoTrueUser),
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    #[serde(rename = "Key", default)]
    pub key: Option<String>,
}

/// Error shapes used across GoTrue, PostgREST and Storage.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.msg
            .or(self.error_description)
            .or(self.message)
            .or_else(|| match self.error {
                Some(serde_json::Value::String(error)) => Some(error),
                _ => None,
            })
            .filter(|message| !message.trim().is_empty())
    }
}
