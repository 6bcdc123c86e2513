use std::fmt;

use crate::session::Session;

/// Tag carried by the auth service's change stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthChangeEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
    Other(String),
}

impl AuthChangeEvent {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "SIGNED_IN" => Self::SignedIn,
            "SIGNED_OUT" => Self::SignedOut,
            "TOKEN_REFRESHED" => Self::TokenRefreshed,
            "USER_UPDATED" => Self::UserUpdated,
            "PASSWORD_RECOVERY" => Self::PasswordRecovery,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            Self::SignedIn => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::UserUpdated => "USER_UPDATED",
            Self::PasswordRecovery => "PASSWORD_RECOVERY",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for AuthChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[derive(Debug, Clone)]
pub struct AuthStateChange {
    pub event: AuthChangeEvent,
    pub session: Option<Session>,
}

impl AuthStateChange {
    pub fn new(event: AuthChangeEvent, session: Option<Session>) -> Self {
        Self { event, session }
    }
}
