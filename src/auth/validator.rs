//! Authentication validator
//!
//! Checks a username/password pair against the credential table.

use super::credentials::CredentialTable;
use crate::error::AuthError;

/// Validates that `password` matches the stored password for `username`.
pub fn validate_login(
    credentials: &CredentialTable,
    username: &str,
    password: &str,
) -> Result<(), AuthError> {
    match credentials.password_for(username) {
        Some(stored) if stored == password => Ok(()),
        Some(_) => Err(AuthError::InvalidPassword(username.to_string())),
        None => Err(AuthError::UserNotFound(username.to_string())),
    }
}
