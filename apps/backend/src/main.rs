use actix_web::{web, App, HttpServer};
use shed_backend::middleware::request_trace::RequestTrace;
use shed_backend::middleware::structured_logger::StructuredLogger;
use shed_backend::routes;
use shed_backend::{AppState, ServerConfig};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        host = %config.host,
        port = config.port,
        require_public_key = config.require_public_key,
        "Starting shed backend"
    );

    let data = web::Data::new(AppState::new(&config));

    HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
