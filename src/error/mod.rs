//! Error handling
//!
//! Defines error types and handling for the DOS guard server.

pub mod handlers;
pub mod types;

pub use types::*;
