//! Admin authentication.
//!
//! There is a single admin account, configured through `ADMIN_EMAIL` and
//! `ADMIN_PASSWORD_HASH`. Verification succeeds or fails as a whole: callers
//! never learn whether the login or the password was wrong.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::{AdminConfig, normalize_admin_login};
use crate::models::session::CurrentAdmin;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Admin authentication service.
pub struct AuthService<'a> {
    admin: &'a AdminConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(admin: &'a AdminConfig) -> Self {
        Self { admin }
    }

    /// Login with the admin credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the login or password is wrong.
    pub fn login(&self, login: &str, password: &str) -> Result<CurrentAdmin, AuthError> {
        // Verify the hash even for a wrong login so both paths cost the same.
        let password_ok = verify_password(password, self.admin.password_hash()).is_ok();

        if !self.admin.matches_login(login) || !password_ok {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(CurrentAdmin {
            email: normalize_admin_login(login),
        })
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id, producing a value for `ADMIN_PASSWORD_HASH`.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    validate_password(password)?;

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn admin(password: &str) -> AdminConfig {
        AdminConfig {
            email: "admin@simea.com".to_string(),
            password_hash: SecretString::from(hash_password(password).unwrap()),
        }
    }

    #[test]
    fn test_login_accepts_bare_username() {
        let config = admin("correct horse");
        let auth = AuthService::new(&config);

        let current = auth.login("Admin", "correct horse").unwrap();
        assert_eq!(current.email, "admin@simea.com");
    }

    #[test]
    fn test_login_rejects_wrong_password() {
        let config = admin("correct horse");
        let auth = AuthService::new(&config);

        assert!(matches!(
            auth.login("admin@simea.com", "battery staple"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_login_rejects_other_account() {
        let config = admin("correct horse");
        let auth = AuthService::new(&config);

        assert!(matches!(
            auth.login("someone@simea.com", "correct horse"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hash_password_rejects_short_password() {
        assert!(matches!(
            hash_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }
}
