use std::fmt;

use domain::auth::UserId;

/// Cache key for auth queries, scoped under `auth`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Profile(UserId),
    Session,
}

impl QueryKey {
    pub fn profile(user_id: &UserId) -> Self {
        Self::Profile(user_id.clone())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile(user_id) => write!(f, "auth/profile/{user_id}"),
            Self::Session => f.write_str("auth/session"),
        }
    }
}
