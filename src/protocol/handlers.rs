//! Command processor
//!
//! Turns a request line into its response. Stateless: it reads the
//! credential table and nothing else. Ban and rate decisions are made by
//! the caller before a line ever gets here.

use log::debug;
use std::net::IpAddr;

use crate::auth::{CredentialTable, validate_login};
use crate::protocol::commands::{Command, parse_command};
use crate::protocol::responses;

/// Processes one request line from `source`.
///
/// Returns `None` for a blank line, meaning the connection is closed
/// without a response.
pub fn process(source: IpAddr, raw: &str, credentials: &CredentialTable) -> Option<&'static str> {
    let response = match parse_command(raw) {
        Command::Empty => return None,
        Command::Login { username, password } => {
            match validate_login(credentials, &username, &password) {
                Ok(()) => responses::LOGIN_SUCCESS,
                Err(e) => {
                    debug!("Login from {} rejected: {}", source, e);
                    responses::LOGIN_FAILED
                }
            }
        }
        Command::Ping => responses::PONG,
        Command::Unknown(_) => responses::COMMAND_RECEIVED,
    };

    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const SOURCE: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    fn run(line: &str) -> Option<&'static str> {
        process(SOURCE, line, &CredentialTable::default())
    }

    #[test]
    fn login_outcomes() {
        assert_eq!(run("LOGIN alice alicepass"), Some("OK: Login successful"));
        assert_eq!(run("LOGIN alice wrongpass"), Some("ERROR: Wrong credentials"));
        assert_eq!(run("LOGIN bob x"), Some("ERROR: Wrong credentials"));
        assert_eq!(run("login alice alicepass"), Some("OK: Login successful"));
    }

    #[test]
    fn ping_and_fallback() {
        assert_eq!(run("PING"), Some("PONG"));
        assert_eq!(run("FAKECMD anything"), Some("OK: Command received"));
        assert_eq!(run("LOGIN alice"), Some("OK: Command received"));
    }

    #[test]
    fn blank_line_produces_no_response() {
        assert_eq!(run(""), None);
        assert_eq!(run("   "), None);
    }
}
