use crate::models::User;

/// What an auth state change asks of the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthTransition {
    /// A user became signed in (or a different user replaced the previous
    /// one). The remote copy has to be pulled once.
    SignedIn(User),
    SignedOut,
    Unchanged,
}

/// Tracks the identity handed to us by the external auth provider.
#[derive(Debug, Default)]
pub struct AuthSession {
    current: Option<User>,
}

impl AuthSession {
    pub fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn transition(&mut self, next: Option<User>) -> AuthTransition {
        let previous_uid = self.current.as_ref().map(|user| user.uid.clone());
        self.current = next.clone();

        match (previous_uid, next) {
            (Some(prev), Some(user)) if prev == user.uid => AuthTransition::Unchanged,
            (_, Some(user)) => AuthTransition::SignedIn(user),
            (Some(_), None) => AuthTransition::SignedOut,
            (None, None) => AuthTransition::Unchanged,
        }
    }

    pub fn restore(&mut self, user: Option<User>) {
        self.current = user;
    }
}
