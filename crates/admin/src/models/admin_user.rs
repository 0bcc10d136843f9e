//! Operator account model and password verification.
//!
//! Accounts are created by the CLI (`driftwell-cli admin create`); the
//! console itself has no signup surface. Passwords are stored as Argon2id
//! PHC strings.

use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use driftwell_core::{AdminUserId, Email};

/// Operator role. Roles are recorded at creation and shown in the console
/// header; every operator may currently perform every order action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Operator,
    SuperAdmin,
}

/// Error returned when a stored role string is unrecognized.
#[derive(Debug, Error)]
#[error("unknown admin role: {0}")]
pub struct RoleError(String);

impl AdminRole {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Operator => "operator",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Parse the database representation.
    ///
    /// # Errors
    ///
    /// Returns `RoleError` for anything other than the two known roles.
    pub fn parse(s: &str) -> Result<Self, RoleError> {
        match s {
            "operator" => Ok(Self::Operator),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(RoleError(other.to_string())),
        }
    }
}

/// An operator account as stored in `admin_users`.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    /// Argon2id PHC string. Never leaves this struct unverified.
    pub password_hash: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}

impl AdminUser {
    /// Check a login password against the stored hash.
    ///
    /// Returns `false` both for a wrong password and for an unparseable
    /// stored hash; a corrupt hash must not let anyone in.
    #[must_use]
    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            tracing::error!(email = %self.email, "stored password hash is not a valid PHC string");
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// The logged-in operator, as stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};

    use super::*;

    fn account_with_password(password: &str) -> AdminUser {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string();

        AdminUser {
            id: AdminUserId::new(1),
            email: Email::parse("ops@driftwell.shop").unwrap(),
            name: "Ops".to_string(),
            password_hash: hash,
            role: AdminRole::Operator,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_verify_password_roundtrip() {
        let user = account_with_password("hunter2hunter2");
        assert!(user.verify_password("hunter2hunter2"));
        assert!(!user.verify_password("hunter2hunter3"));
    }

    #[test]
    fn test_corrupt_hash_never_verifies() {
        let mut user = account_with_password("hunter2hunter2");
        user.password_hash = "not-a-phc-string".to_string();
        assert!(!user.verify_password("hunter2hunter2"));
    }

    #[test]
    fn test_role_parse_roundtrip() {
        assert_eq!(AdminRole::parse("operator").unwrap(), AdminRole::Operator);
        assert_eq!(
            AdminRole::parse("super_admin").unwrap(),
            AdminRole::SuperAdmin
        );
        assert!(AdminRole::parse("root").is_err());
    }
}
