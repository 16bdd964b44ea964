//! DOS guard server
//!
//! A small line-oriented TCP command server (LOGIN / PING) that tracks
//! per-source request rates and temporarily bans sources that flood it.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod protocol;
pub mod server;

pub use crate::config::ServerConfig;
pub use crate::error::ServerError;
pub use crate::server::{Server, ServerHandle};
