//! Authentication system
//!
//! Holds the credential table and validates LOGIN requests against it.

pub mod credentials;
pub mod validator;

pub use credentials::CredentialTable;
pub use validator::validate_login;
