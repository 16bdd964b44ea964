//! Error types
//!
//! Failed logins and flood bans are ordinary responses, not errors. What is
//! left is startup failure and per-connection transport failure.

use std::fmt;
use std::io;
use std::str::Utf8Error;
use std::time::Duration;

/// Credential check failures
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    UserNotFound(String),
    InvalidPassword(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::UserNotFound(u) => write!(f, "User not found: {}", u),
            AuthError::InvalidPassword(u) => write!(f, "Invalid password for user: {}", u),
        }
    }
}

impl std::error::Error for AuthError {}

/// Failures while reading a request or writing a response.
///
/// These never leave the connection handler.
#[derive(Debug)]
pub enum TransportError {
    Io(io::Error),
    Decode(Utf8Error),
    ReadTimeout(Duration),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Io(e) => write!(f, "I/O error: {}", e),
            TransportError::Decode(e) => write!(f, "Request is not valid UTF-8: {}", e),
            TransportError::ReadTimeout(d) => write!(f, "No request received within {:?}", d),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Io(e) => Some(e),
            TransportError::Decode(e) => Some(e),
            TransportError::ReadTimeout(_) => None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        TransportError::Io(error)
    }
}

impl From<Utf8Error> for TransportError {
    fn from(error: Utf8Error) -> Self {
        TransportError::Decode(error)
    }
}

/// Fatal server errors surfaced to whoever starts the server
#[derive(Debug)]
pub enum ServerError {
    Bind { addr: String, source: io::Error },
    Config(config::ConfigError),
    Io(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Bind { addr, source } => write!(f, "Failed to bind to {}: {}", addr, source),
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Bind { source, .. } => Some(source),
            ServerError::Config(e) => Some(e),
            ServerError::Io(e) => Some(e),
        }
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::Io(error)
    }
}
