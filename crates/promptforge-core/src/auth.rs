//! Authentication collaborator interface.
//!
//! The engine itself is auth-agnostic; the library features (save, search,
//! history) consult this service and degrade to no-ops when nobody is
//! signed in.

use std::sync::Mutex;

/// The signed-in user, as far as the engine needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Stable user identifier used to key persisted records.
    pub id: String,
    /// Display name for the presentation layer.
    pub display_name: String,
}

/// Session/authentication service.
///
/// Implementations wrap whatever identity provider the host application
/// uses; the engine only needs the current user and a way to sign out.
pub trait AuthService: Send + Sync {
    /// Returns the signed-in user, or `None` for anonymous visitors.
    fn current_user(&self) -> Option<CurrentUser>;

    /// Ends the current session.
    fn sign_out(&self);
}

/// In-memory implementation holding a fixed user.
///
/// Suitable for tests and for single-user deployments.
#[derive(Debug, Default)]
pub struct StaticAuthService {
    user: Mutex<Option<CurrentUser>>,
}

impl StaticAuthService {
    /// Creates a service with nobody signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Creates a service with the given user signed in.
    pub fn signed_in(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user: Mutex::new(Some(CurrentUser {
                id: id.into(),
                display_name: display_name.into(),
            })),
        }
    }
}

impl AuthService for StaticAuthService {
    fn current_user(&self) -> Option<CurrentUser> {
        self.user.lock().expect("auth state poisoned").clone()
    }

    fn sign_out(&self) {
        *self.user.lock().expect("auth state poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_out_clears_user() {
        let auth = StaticAuthService::signed_in("u1", "Alice");
        assert!(auth.current_user().is_some());
        auth.sign_out();
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_anonymous_has_no_user() {
        assert!(StaticAuthService::anonymous().current_user().is_none());
    }
}
