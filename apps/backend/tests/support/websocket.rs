// WebSocket test utilities

use std::net::TcpListener;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use shed_backend::middleware::request_trace::RequestTrace;
use shed_backend::middleware::structured_logger::StructuredLogger;
use shed_backend::routes;
use shed_backend::state::app_state::AppState;
use shed_backend::ws::games::GameRegistry;
use shed_backend::ws::hub::ConnectionRegistry;

pub const RSA_PUBLIC_PEM: &str = include_str!("../fixtures/rsa_public.pem");
pub const RSA_PRIVATE_PEM: &str = include_str!("../fixtures/rsa_private.pem");
pub const EC_PUBLIC_PEM: &str = include_str!("../fixtures/ec_public.pem");
pub const RSA512_PUBLIC_PEM: &str = include_str!("../fixtures/rsa512_public.pem");

pub type ServerParts = (
    actix_web::dev::ServerHandle,
    std::net::SocketAddr,
    tokio::task::JoinHandle<Result<(), std::io::Error>>,
);

/// Waits until `expected` session actors are attached to the registry.
pub async fn wait_for_connections(
    registry: &ConnectionRegistry,
    expected: usize,
    timeout: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = tokio::time::Instant::now();
    loop {
        if registry.attached_len() == expected && registry.len() == expected {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(format!(
                "timeout waiting for attached connections == {expected} (got {})",
                registry.attached_len()
            )
            .into());
        }
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Waits until the registry holds `expected` games.
pub async fn wait_for_games(
    games: &GameRegistry,
    expected: usize,
    timeout: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = tokio::time::Instant::now();
    while games.len() != expected {
        if start.elapsed() >= timeout {
            return Err(format!("timeout waiting for games == {expected} (got {})", games.len()).into());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    Ok(())
}

/// Start a real HTTP server with every route on an ephemeral port.
///
/// Returns (server_handle, socket_addr, join_handle); stop the server with
/// `server_handle.stop(true)` and await the join handle.
pub async fn start_test_server(state: AppState) -> Result<ServerParts, Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let state_data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .configure(routes::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let server_handle = server.handle();
    let join = tokio::spawn(server);

    Ok((server_handle, addr, join))
}

pub fn ws_url(addr: std::net::SocketAddr, query: &str) -> String {
    format!("ws://{addr}/ws?{query}")
}
