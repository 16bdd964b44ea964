//! Logging middleware
//!
//! Logger setup and the per-connection log lines shared by the handler.

use env_logger::Env;
use log::{debug, info, warn};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Initialize `env_logger`, honouring `RUST_LOG` and defaulting to `info`.
pub fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Log a client connection
pub fn log_connection(peer: SocketAddr, open_from_source: usize) {
    debug!("Client connected: {} ({} open from this source)", peer, open_from_source);
}

/// Log a request refused because its source is banned
pub fn log_blocked(peer: SocketAddr) {
    info!("Refused {}: source is banned", peer);
}

/// Log a new ban
pub fn log_ban(ip: IpAddr, requests: usize, duration: Duration) {
    warn!(
        "[BLOCKED] {} banned for {} sec after {} requests",
        ip,
        duration.as_secs(),
        requests
    );
}

/// Log a served command
pub fn log_command(peer: SocketAddr, command: &str, response: &str) {
    info!("Client {} executed: {} -> {}", peer, command, response);
}
