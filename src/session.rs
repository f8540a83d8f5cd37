// 🔐 Session State - who is signed in, and with which role
//
// Credential checks are delegated to an `AuthBackend`. The session only moves
// between Anonymous and Authenticated through `login` and `logout`.

use crate::entities::{Role, User};
use crate::error::AuthError;
use crate::locale::LocaleCatalog;
use std::sync::Arc;
use tracing::{info, warn};

// ============================================================================
// AUTH CONTRACT
// ============================================================================

/// External credential verifier
pub trait AuthBackend: Send + Sync {
    fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AuthError>;
}

/// Demo verifier: any well-formed email with a non-empty password signs in.
/// Emails containing "admin" get the admin role.
#[derive(Debug, Clone, Default)]
pub struct DemoAuthenticator;

impl AuthBackend for DemoAuthenticator {
    fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();

        if email.is_empty() {
            return Err(AuthError::MissingEmail);
        }
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }
        if !email.contains('@') {
            return Err(AuthError::MalformedEmail(email.to_string()));
        }

        let is_admin = email.contains("admin");
        let (name, role) = if is_admin {
            ("Admin User", Role::Admin)
        } else {
            ("Demo Farmer", Role::Farmer)
        };

        Ok(User::new("1", name, email, role).with_region("North Region"))
    }
}

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated(User),
}

pub struct SessionState {
    current: Session,
    auth: Arc<dyn AuthBackend>,
}

impl SessionState {
    /// Start with nobody signed in
    pub fn anonymous(auth: Arc<dyn AuthBackend>) -> Self {
        SessionState {
            current: Session::Anonymous,
            auth,
        }
    }

    /// Start with the demo farmer already signed in
    pub fn with_demo_user(auth: Arc<dyn AuthBackend>) -> Self {
        let demo = User::new("1", "Demo Farmer", "farmer@agricure.com", Role::Farmer)
            .with_region("North Region");

        SessionState {
            current: Session::Authenticated(demo),
            auth,
        }
    }

    /// Verify credentials and replace the current user.
    /// On failure the previous session is left as it was.
    pub fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        match self.auth.verify_credentials(email, password) {
            Ok(user) => {
                info!(user_id = %user.id, role = %user.role, "login succeeded");
                self.current = Session::Authenticated(user.clone());
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                Err(e)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Session::Authenticated(user) = &self.current {
            info!(user_id = %user.id, "logout");
        }
        self.current = Session::Anonymous;
    }

    pub fn session(&self) -> &Session {
        &self.current
    }

    pub fn current_user(&self) -> Option<&User> {
        match &self.current {
            Session::Authenticated(user) => Some(user),
            Session::Anonymous => None,
        }
    }

    /// None when anonymous
    pub fn role(&self) -> Option<Role> {
        self.current_user().map(|u| u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.current, Session::Authenticated(_))
    }

    /// User name, or the translated "guest" label when anonymous
    pub fn display_name(&self, catalog: &LocaleCatalog) -> String {
        match self.current_user() {
            Some(user) => user.name.clone(),
            None => catalog.translate("guest"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;

    fn demo_auth() -> Arc<dyn AuthBackend> {
        Arc::new(DemoAuthenticator)
    }

    #[test]
    fn test_starts_anonymous() {
        let session = SessionState::anonymous(demo_auth());
        assert!(!session.is_authenticated());
        assert_eq!(session.role(), None);
    }

    #[test]
    fn test_demo_user_session() {
        let session = SessionState::with_demo_user(demo_auth());
        let user = session.current_user().unwrap();

        assert_eq!(user.name, "Demo Farmer");
        assert_eq!(session.role(), Some(Role::Farmer));
    }

    #[test]
    fn test_login_assigns_role_from_email() {
        let mut session = SessionState::anonymous(demo_auth());

        let user = session.login("admin@agricure.com", "secret").unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.name, "Admin User");
        assert_eq!(session.role(), Some(Role::Admin));

        let user = session.login("grower@example.com", "secret").unwrap();
        assert_eq!(user.role, Role::Farmer);
        assert_eq!(session.current_user().unwrap().email, "grower@example.com");
    }

    #[test]
    fn test_failed_login_keeps_previous_session() {
        let mut session = SessionState::anonymous(demo_auth());
        session.login("admin@agricure.com", "secret").unwrap();

        assert_eq!(session.login("admin@agricure.com", ""), Err(AuthError::MissingPassword));
        assert_eq!(session.login("", "secret"), Err(AuthError::MissingEmail));
        assert_eq!(
            session.login("not-an-email", "secret"),
            Err(AuthError::MalformedEmail("not-an-email".to_string()))
        );

        assert_eq!(session.role(), Some(Role::Admin));
    }

    #[test]
    fn test_logout_always_succeeds() {
        let mut session = SessionState::with_demo_user(demo_auth());
        session.logout();
        assert_eq!(session.session(), &Session::Anonymous);

        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_display_name_uses_guest_label() {
        let mut catalog = LocaleCatalog::new();
        let mut session = SessionState::anonymous(demo_auth());

        assert_eq!(session.display_name(&catalog), "Guest");
        catalog.set_locale(Locale::Es);
        assert_eq!(session.display_name(&catalog), "Invitado");

        session.login("farmer@agricure.com", "pw").unwrap();
        assert_eq!(session.display_name(&catalog), "Demo Farmer");
    }

    struct RejectAll;

    impl AuthBackend for RejectAll {
        fn verify_credentials(&self, _: &str, _: &str) -> Result<User, AuthError> {
            Err(AuthError::InvalidCredentials)
        }
    }

    #[test]
    fn test_custom_backend() {
        let mut session = SessionState::with_demo_user(Arc::new(RejectAll));
        assert_eq!(
            session.login("farmer@agricure.com", "pw"),
            Err(AuthError::InvalidCredentials)
        );
        assert!(session.is_authenticated());
    }
}
