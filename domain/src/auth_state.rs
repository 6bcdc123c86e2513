use crate::auth::User;
use crate::profile::Profile;
use crate::session::Session;

/// Everything the UI renders about the signed-in user.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user: Option<User>,
    pub profile: Option<Profile>,
    pub session: Option<Session>,
    pub loading: bool,
    pub error: Option<String>,
}

/// A single state change. Actions are built from these so every observer
/// sees a whole transition or none of it.
#[derive(Debug, Clone)]
pub enum AuthTransition {
    ActionStarted,
    ActionSettled,
    ActionFailed(String),
    SessionLoaded(Option<Session>),
    UserLoaded(User),
    ProfileLoaded(Profile),
    AvatarChanged(String),
    SignedOut,
    ForcedSignOut,
    ErrorSet(Option<String>),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Applies `transition` in place. Returns `false` when the transition
    /// was rejected because it would pair a profile with another user.
    pub fn apply(&mut self, transition: AuthTransition) -> bool {
        match transition {
            AuthTransition::ActionStarted => {
                self.loading = true;
                self.error = None;
            }
            AuthTransition::ActionSettled => self.loading = false,
            AuthTransition::ActionFailed(message) | AuthTransition::ErrorSet(Some(message)) => {
                self.error = Some(message);
            }
            AuthTransition::ErrorSet(None) => self.error = None,
            AuthTransition::SessionLoaded(session) => self.session = session,
            AuthTransition::UserLoaded(user) => {
                if self.profile.as_ref().is_some_and(|p| p.id != user.id) {
                    self.profile = None;
                }
                self.user = Some(user);
            }
            AuthTransition::ProfileLoaded(profile) => {
                if self.user.as_ref().is_some_and(|u| u.id != profile.id) {
                    return false;
                }
                self.profile = Some(profile);
            }
            AuthTransition::AvatarChanged(url) => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.avatar_url = Some(url);
                }
            }
            AuthTransition::SignedOut => {
                self.user = None;
                self.profile = None;
                self.session = None;
            }
            AuthTransition::ForcedSignOut => {
                self.user = None;
                self.profile = None;
                self.session = None;
                self.error = None;
            }
        }
        true
    }

    #[must_use]
    pub fn applied(mut self, transition: AuthTransition) -> Self {
        self.apply(transition);
        self
    }
}
