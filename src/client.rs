//! One-shot client
//!
//! Sends a single request line and collects the reply, the way launchers,
//! dashboards and load generators talk to the server.

use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

/// Connects to `addr`, sends `line` newline-terminated and returns the
/// response with its line ending stripped.
///
/// The server closes every connection after at most one line, so an empty
/// string means it closed without answering.
pub async fn send_command<A: ToSocketAddrs>(addr: A, line: &str) -> io::Result<String> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(format!("{}\n", line).as_bytes()).await?;
    stream.flush().await?;

    let mut response = String::new();
    stream.read_to_string(&mut response).await?;
    Ok(response.trim_end_matches(['\r', '\n']).to_string())
}
