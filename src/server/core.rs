use log::{debug, error, info};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::auth::CredentialTable;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::server::handler::{ConnectionContext, handle_connection};
use crate::server::state::{BannedSource, GuardState, StatusSnapshot};

/// Listener lifecycle as seen by collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Socket bound, accept loop not started yet.
    Bound,
    Running,
    Stopped,
}

pub struct Server {
    listener: TcpListener,
    context: Arc<ConnectionContext>,
    handle: ServerHandle,
    sweep_interval: Option<Duration>,
}

/// Cloneable control and status handle for a `Server`.
#[derive(Clone)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    state: Arc<GuardState>,
    lifecycle: Arc<watch::Sender<Lifecycle>>,
}

impl Server {
    /// Binds the listening socket. Failure here is fatal and returned as is.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;

        let addr = config.listen_addr();
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(source) => {
                error!("Failed to bind to {}: {}", addr, source);
                return Err(ServerError::Bind { addr, source });
            }
        };
        let local_addr = listener.local_addr()?;
        info!("Server bound to {}", local_addr);

        let credentials = CredentialTable::new(config.users.clone());
        info!("Loaded {} user credential(s)", credentials.len());

        let state = Arc::new(GuardState::new(config.guard_limits()));
        let context = Arc::new(ConnectionContext {
            state: Arc::clone(&state),
            credentials: Arc::new(credentials),
            max_request_bytes: config.max_request_bytes,
            read_timeout: config.read_timeout(),
        });
        let (lifecycle, _) = watch::channel(Lifecycle::Bound);

        Ok(Self {
            listener,
            context,
            handle: ServerHandle {
                local_addr,
                state,
                lifecycle: Arc::new(lifecycle),
            },
            sweep_interval: config.sweep_interval(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.handle.local_addr
    }

    pub fn handle(&self) -> ServerHandle {
        self.handle.clone()
    }

    /// Accepts connections until `ServerHandle::stop` is called, spawning
    /// one task per connection. Accept rate itself is not limited.
    ///
    /// Handlers already running are left to finish on their own.
    pub async fn run(self) {
        let Server {
            listener,
            context,
            handle,
            sweep_interval,
        } = self;

        let started = handle.lifecycle.send_if_modified(|state| {
            if *state == Lifecycle::Bound {
                *state = Lifecycle::Running;
                true
            } else {
                false
            }
        });
        if !started {
            info!("Server on {} stopped before it started", handle.local_addr);
            return;
        }

        let threshold = context.state.threshold();
        info!(
            "[SERVER STARTED] Listening on {} (ban after {} requests per window)",
            handle.local_addr, threshold
        );

        let sweeper = sweep_interval
            .map(|period| tokio::spawn(sweep_loop(Arc::clone(&handle.state), period)));

        let mut lifecycle = handle.lifecycle.subscribe();
        loop {
            if *lifecycle.borrow_and_update() != Lifecycle::Running {
                break;
            }

            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let context = Arc::clone(&context);
                        tokio::spawn(async move {
                            handle_connection(stream, peer, context).await;
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                },
                changed = lifecycle.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
        drop(listener);
        handle.lifecycle.send_replace(Lifecycle::Stopped);
        info!("[SERVER STOPPED] {}", handle.local_addr);
    }
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting new connections. The accept loop exits promptly and
    /// closes the listening socket.
    pub fn stop(&self) {
        let previous = self.lifecycle.send_replace(Lifecycle::Stopped);
        if previous != Lifecycle::Stopped {
            info!("Stop requested for {}", self.local_addr);
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle() == Lifecycle::Running
    }

    /// Total open connections over all sources.
    pub fn active_connections(&self) -> usize {
        self.state.active_connections()
    }

    pub fn connections_for(&self, ip: IpAddr) -> usize {
        self.state.connections_for(ip)
    }

    /// Currently banned sources with their remaining ban time.
    pub fn banned_sources(&self) -> Vec<BannedSource> {
        self.state.banned_sources(Instant::now())
    }

    pub fn is_banned(&self, ip: IpAddr) -> bool {
        self.state.is_banned(ip, Instant::now())
    }

    pub fn status(&self) -> StatusSnapshot {
        self.state.status(Instant::now())
    }
}

async fn sweep_loop(state: Arc<GuardState>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let report = state.sweep(Instant::now());
        if !report.is_empty() {
            debug!(
                "Swept {} expired bans and {} idle windows",
                report.expired_bans, report.idle_windows
            );
        }
    }
}
