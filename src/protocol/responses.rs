//! Response lines
//!
//! The exact literals written back to clients.

pub const LOGIN_SUCCESS: &str = "OK: Login successful";
pub const LOGIN_FAILED: &str = "ERROR: Wrong credentials";
pub const PONG: &str = "PONG";
pub const COMMAND_RECEIVED: &str = "OK: Command received";
pub const IP_BLOCKED: &str = "ERROR: Your IP is BLOCKED";
pub const DOS_DETECTED: &str = "ALERT: DOS detected → IP BLOCKED";

/// Frame a response line for the wire
pub fn format_response(message: &str) -> String {
    format!("{}\n", message)
}
