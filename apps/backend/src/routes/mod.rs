use actix_web::web;

pub mod health;
pub mod realtime;

/// Registers every route; shared by `main.rs` and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Websocket upgrade: /ws
    cfg.service(web::scope("/ws").configure(realtime::configure_routes));
}
