use log::debug;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::auth::CredentialTable;
use crate::error::TransportError;
use crate::error::handlers::handle_transport_error;
use crate::middleware::logging::{log_ban, log_blocked, log_command, log_connection};
use crate::protocol::responses::{DOS_DETECTED, IP_BLOCKED, format_response};
use crate::protocol::{parse_command, process};
use crate::server::state::{GuardState, Verdict};

/// Everything a connection handler needs, shared by all handlers.
pub struct ConnectionContext {
    pub state: Arc<GuardState>,
    pub credentials: Arc<CredentialTable>,
    pub max_request_bytes: usize,
    pub read_timeout: Option<Duration>,
}

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// No usable text arrived; closed without a response.
    Empty,
    /// Source was banned; answered with the blocked line.
    Blocked,
    /// Request tripped the flood threshold; source banned.
    Throttled,
    /// Command processed and answered.
    Served,
    /// Transport failure, logged and swallowed.
    Failed,
}

/// Handles one accepted connection end to end: one read, at most one
/// response line, then close.
///
/// Order of checks: empty input first, then the ban, then the rate window.
/// So a banned source sending a blank line is closed silently, and blank
/// lines never count toward the window.
///
/// The source's connection count is held for the whole call and released
/// exactly once on every exit path.
pub async fn handle_connection<S>(
    mut stream: S,
    peer: SocketAddr,
    ctx: Arc<ConnectionContext>,
) -> ConnectionOutcome
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let tracked = ctx.state.track_connection(peer.ip());
    log_connection(peer, tracked.open_at_start());

    let outcome = match serve(&mut stream, peer, &ctx).await {
        Ok(outcome) => outcome,
        Err(e) => {
            handle_transport_error(peer, &e);
            ConnectionOutcome::Failed
        }
    };

    if let Err(e) = stream.shutdown().await {
        debug!("Error closing connection to {}: {}", peer, e);
    }
    drop(tracked);

    debug!("Client {} finished: {:?}", peer, outcome);
    outcome
}

async fn serve<S>(
    stream: &mut S,
    peer: SocketAddr,
    ctx: &ConnectionContext,
) -> Result<ConnectionOutcome, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let Some(line) = read_request(stream, ctx).await? else {
        return Ok(ConnectionOutcome::Empty);
    };

    match ctx.state.admit(peer.ip(), Instant::now()) {
        Verdict::Blocked => {
            log_blocked(peer);
            write_line(stream, IP_BLOCKED).await?;
            Ok(ConnectionOutcome::Blocked)
        }
        Verdict::Throttled { requests, .. } => {
            log_ban(peer.ip(), requests, ctx.state.block_duration());
            write_line(stream, DOS_DETECTED).await?;
            Ok(ConnectionOutcome::Throttled)
        }
        Verdict::Allowed => match process(peer.ip(), &line, &ctx.credentials) {
            Some(response) => {
                log_command(peer, parse_command(&line).name(), response);
                write_line(stream, response).await?;
                Ok(ConnectionOutcome::Served)
            }
            None => Ok(ConnectionOutcome::Empty),
        },
    }
}

/// Single bounded read, decoded as UTF-8 and trimmed. `None` when nothing
/// usable arrived.
async fn read_request<S>(
    stream: &mut S,
    ctx: &ConnectionContext,
) -> Result<Option<String>, TransportError>
where
    S: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; ctx.max_request_bytes];

    let n = match ctx.read_timeout {
        Some(limit) => timeout(limit, stream.read(&mut buffer))
            .await
            .map_err(|_| TransportError::ReadTimeout(limit))??,
        None => stream.read(&mut buffer).await?,
    };

    let text = std::str::from_utf8(&buffer[..n])?.trim();
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text.to_string()))
    }
}

async fn write_line<S>(stream: &mut S, message: &str) -> Result<(), TransportError>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(format_response(message).as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}
