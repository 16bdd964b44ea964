//! Credential storage
//!
//! A fixed username to password table, built once at startup and shared
//! read-only by every connection.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CredentialTable {
    users: HashMap<String, String>,
}

impl CredentialTable {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    /// Stored password for `username`, if the user exists.
    pub fn password_for(&self, username: &str) -> Option<&str> {
        self.users.get(username).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for CredentialTable {
    fn default() -> Self {
        Self::new(HashMap::from([(
            "alice".to_string(),
            "alicepass".to_string(),
        )]))
    }
}
