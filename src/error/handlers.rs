//! Error handlers
//!
//! Logging for errors that are recovered locally.

use crate::error::types::{ServerError, TransportError};
use log::{error, warn};
use std::io::ErrorKind;
use std::net::SocketAddr;

/// Handle a fatal server error
pub fn handle_error(err: &ServerError) {
    error!("DOS guard server error: {}", err);
}

/// Log a transport failure for one connection.
///
/// Peers hanging up or stalling are routine under flood load and only warn.
pub fn handle_transport_error(peer: SocketAddr, err: &TransportError) {
    match err {
        TransportError::Io(e)
            if matches!(
                e.kind(),
                ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
            ) =>
        {
            warn!("Client {} dropped the connection: {}", peer, e);
        }
        TransportError::ReadTimeout(_) | TransportError::Decode(_) => {
            warn!("Client {} error: {}", peer, err);
        }
        TransportError::Io(_) => {
            error!("Client {} error: {}", peer, err);
        }
    }
}
