use secrecy::SecretString;
use time::{Duration, OffsetDateTime};

use crate::auth::User;

/// Token bundle owned by the auth service. Callers only look at whether one
/// exists and at the user it was issued for.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: OffsetDateTime,
    pub user: User,
}

impl Session {
    pub fn new(
        access_token: SecretString,
        refresh_token: SecretString,
        expires_at: OffsetDateTime,
        user: User,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at,
            user,
        }
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }

    pub fn expires_within(&self, now: OffsetDateTime, margin: Duration) -> bool {
        self.expires_at
            .checked_sub(margin)
            .is_none_or(|refresh_at| refresh_at <= now)
    }
}
