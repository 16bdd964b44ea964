use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use dos_guard_server::client::send_command;
use dos_guard_server::server::Lifecycle;
use dos_guard_server::{Server, ServerConfig, ServerError, ServerHandle};

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn test_config() -> ServerConfig {
    ServerConfig {
        port: 0,
        read_timeout_secs: 2,
        sweep_interval_secs: 0,
        ..ServerConfig::default()
    }
}

// Start a server on an ephemeral port and wait until it accepts.
async fn start_test_server(config: ServerConfig) -> (ServerHandle, SocketAddr, JoinHandle<()>) {
    let server = Server::bind(config).await.unwrap();
    let handle = server.handle();
    let addr = server.local_addr();
    let task = tokio::spawn(server.run());
    wait_for(|| handle.is_running()).await;
    (handle, addr, task)
}

async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn test_login_ping_and_fallback() {
    let (handle, addr, _task) = start_test_server(test_config()).await;

    assert_eq!(
        send_command(addr, "LOGIN alice alicepass").await.unwrap(),
        "OK: Login successful"
    );
    assert_eq!(
        send_command(addr, "LOGIN alice wrongpass").await.unwrap(),
        "ERROR: Wrong credentials"
    );
    assert_eq!(
        send_command(addr, "LOGIN bob x").await.unwrap(),
        "ERROR: Wrong credentials"
    );
    assert_eq!(send_command(addr, "PING").await.unwrap(), "PONG");
    assert_eq!(
        send_command(addr, "FAKECMD anything").await.unwrap(),
        "OK: Command received"
    );

    handle.stop();
}

#[tokio::test]
async fn test_empty_request_gets_no_response() {
    let (handle, addr, _task) = start_test_server(test_config()).await;

    assert_eq!(send_command(addr, "").await.unwrap(), "");
    wait_for(|| handle.active_connections() == 0).await;

    handle.stop();
}

#[tokio::test]
async fn test_flood_is_detected_and_blocked() {
    let (handle, addr, _task) = start_test_server(test_config()).await;

    for i in 0..20 {
        let expected = if i % 2 == 0 { "PONG" } else { "OK: Login successful" };
        let line = if i % 2 == 0 { "PING" } else { "LOGIN alice alicepass" };
        assert_eq!(send_command(addr, line).await.unwrap(), expected);
    }

    assert_eq!(
        send_command(addr, "FAKECMD attack").await.unwrap(),
        "ALERT: DOS detected → IP BLOCKED"
    );
    assert_eq!(
        send_command(addr, "PING").await.unwrap(),
        "ERROR: Your IP is BLOCKED"
    );

    assert!(handle.is_banned(LOCALHOST));
    let banned = handle.banned_sources();
    assert_eq!(banned.len(), 1);
    assert_eq!(banned[0].ip, LOCALHOST);
    assert!(banned[0].remaining <= Duration::from_secs(20));
    assert!(banned[0].remaining > Duration::from_secs(15));

    wait_for(|| handle.active_connections() == 0).await;
    handle.stop();
}

#[tokio::test]
async fn test_ban_expires_and_service_resumes() {
    let config = ServerConfig {
        request_window_secs: 1,
        request_threshold: 2,
        block_duration_secs: 1,
        ..test_config()
    };
    let (handle, addr, _task) = start_test_server(config).await;

    assert_eq!(send_command(addr, "PING").await.unwrap(), "PONG");
    assert_eq!(send_command(addr, "PING").await.unwrap(), "PONG");
    assert_eq!(
        send_command(addr, "PING").await.unwrap(),
        "ALERT: DOS detected → IP BLOCKED"
    );
    assert_eq!(
        send_command(addr, "PING").await.unwrap(),
        "ERROR: Your IP is BLOCKED"
    );

    sleep(Duration::from_millis(1200)).await;

    assert!(!handle.is_banned(LOCALHOST));
    assert!(handle.banned_sources().is_empty());
    assert_eq!(send_command(addr, "PING").await.unwrap(), "PONG");

    handle.stop();
}

#[tokio::test]
async fn test_connection_count_tracks_open_connections() {
    let (handle, addr, _task) = start_test_server(test_config()).await;

    let idle = TcpStream::connect(addr).await.unwrap();
    wait_for(|| handle.connections_for(LOCALHOST) == 1).await;
    assert_eq!(handle.status().active_connections, 1);

    // Hanging up without sending anything ends the handler.
    drop(idle);
    wait_for(|| handle.active_connections() == 0).await;

    let mut silent = TcpStream::connect(addr).await.unwrap();
    wait_for(|| handle.active_connections() == 1).await;
    // The read deadline releases a client that never sends.
    wait_for_secs(3, || handle.active_connections() == 0).await;
    let _ = silent.shutdown().await;

    handle.stop();
}

async fn wait_for_secs(secs: u64, mut condition: impl FnMut() -> bool) {
    for _ in 0..secs * 100 {
        if condition() {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in {} s", secs);
}

#[tokio::test]
async fn test_concurrent_clients_are_all_answered() {
    let (handle, addr, _task) = start_test_server(test_config()).await;

    let tasks: Vec<_> = (0..10)
        .map(|_| tokio::spawn(async move { send_command(addr, "PING").await }))
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), "PONG");
    }

    wait_for(|| handle.active_connections() == 0).await;
    handle.stop();
}

#[tokio::test]
async fn test_stop_closes_listener() {
    let (handle, addr, task) = start_test_server(test_config()).await;

    handle.stop();
    timeout(Duration::from_secs(2), task).await.unwrap().unwrap();

    assert_eq!(handle.lifecycle(), Lifecycle::Stopped);
    assert!(!handle.is_running());
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_stop_before_run_never_starts() {
    let server = Server::bind(test_config()).await.unwrap();
    let handle = server.handle();
    assert_eq!(handle.lifecycle(), Lifecycle::Bound);

    handle.stop();
    timeout(Duration::from_secs(2), server.run()).await.unwrap();
    assert_eq!(handle.lifecycle(), Lifecycle::Stopped);
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    let (handle, addr, _task) = start_test_server(test_config()).await;

    let config = ServerConfig {
        port: addr.port(),
        ..test_config()
    };
    match Server::bind(config).await {
        Err(ServerError::Bind { addr: failed, .. }) => {
            assert_eq!(failed, format!("127.0.0.1:{}", addr.port()));
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("second bind on the same port succeeded"),
    }

    handle.stop();
}

#[tokio::test]
async fn test_invalid_config_is_rejected_at_bind() {
    let config = ServerConfig {
        request_threshold: 0,
        ..test_config()
    };
    assert!(matches!(
        Server::bind(config).await,
        Err(ServerError::Config(_))
    ));
}
