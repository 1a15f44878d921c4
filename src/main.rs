use actix_web::{web, App, HttpResponse, HttpServer};
use tracing::info;

use spades_server::config::{cors_middleware, ServerConfig};
use spades_server::services::game_flow::GameFlowService;
use spades_server::telemetry;
use spades_server::ws::session;

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();
    let service = GameFlowService::new();

    info!(port = config.port, production = config.production, "Starting spades server");

    let cors_config = config.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&cors_config))
            .app_data(web::Data::new(service.clone()))
            .route("/health", web::get().to(health))
            .route("/ws", web::get().to(session::upgrade))
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
