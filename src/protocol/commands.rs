//! Module `commands`
//!
//! Parses a raw request line into a `Command`.

/// A parsed request line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// `LOGIN <user> <pass>`; tokens past the third are ignored.
    Login { username: String, password: String },
    Ping,
    /// Any other first token, or `LOGIN` without both arguments.
    Unknown(String),
    /// Blank line, nothing to answer.
    Empty,
}

impl Command {
    /// Name used in logs. Never includes credentials.
    pub fn name(&self) -> &str {
        match self {
            Command::Login { .. } => "LOGIN",
            Command::Ping => "PING",
            Command::Unknown(verb) => verb,
            Command::Empty => "<empty>",
        }
    }
}

/// Splits `raw` on whitespace and dispatches on the first token,
/// case-insensitively.
pub fn parse_command(raw: &str) -> Command {
    let mut parts = raw.split_whitespace();
    let Some(verb) = parts.next() else {
        return Command::Empty;
    };

    if verb.eq_ignore_ascii_case("LOGIN") {
        if let (Some(username), Some(password)) = (parts.next(), parts.next()) {
            return Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            };
        }
    } else if verb.eq_ignore_ascii_case("PING") {
        return Command::Ping;
    }

    Command::Unknown(verb.to_string())
}
