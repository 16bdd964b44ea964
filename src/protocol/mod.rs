//! Wire protocol
//!
//! One newline-terminated text request per connection, answered by at most
//! one newline-terminated text line.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{Command, parse_command};
pub use handlers::process;
