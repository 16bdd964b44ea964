//! DOS guard server - Entry Point
//!
//! Loads configuration, binds the listener and serves until Ctrl-C.

use log::{error, info};
use std::process::ExitCode;

use dos_guard_server::error::handlers::handle_error;
use dos_guard_server::middleware::logging::init_logging;
use dos_guard_server::{Server, ServerConfig, ServerError};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    info!("Launching DOS guard server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            handle_error(&ServerError::from(e));
            return ExitCode::FAILURE;
        }
    };

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            handle_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let handle = server.handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                handle.stop();
            }
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    server.run().await;
    ExitCode::SUCCESS
}
