use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod response;
mod routes;
mod service;
mod utils;

use config::Config;
use db::Tenants;

use crate::docs::ApiDoc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let tenants = Data::new(
        Tenants::connect(&config)
            .await
            .expect("Failed to connect branch databases"),
    );

    // Warm the display-name cache per branch in the background
    for (branch_id, pool) in tenants.iter() {
        let branch_id = branch_id.clone();
        let pool = pool.clone();
        actix_web::rt::spawn(async move {
            if let Err(e) = utils::name_cache::warmup_name_cache(&pool, &branch_id, 250).await {
                tracing::warn!(branch = %branch_id, error = %e, "name cache warmup failed");
            }
        });
    }

    // Month-end attendance batch
    actix_web::rt::spawn(service::scheduler::run(tenants.clone()));

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        // Malformed input surfaces as a Validation envelope, not an HTTP 4xx.
        let json_cfg = actix_web::web::JsonConfig::default().error_handler(|err, _req| {
            response::AppError::Validation(err.to_string()).into()
        });
        let query_cfg = actix_web::web::QueryConfig::default().error_handler(|err, _req| {
            response::AppError::Validation(err.to_string()).into()
        });
        let path_cfg = actix_web::web::PathConfig::default().error_handler(|err, _req| {
            response::AppError::Validation(err.to_string()).into()
        });

        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(json_cfg)
            .app_data(query_cfg)
            .app_data(path_cfg)
            .app_data(tenants.clone())
            .app_data(Data::new(config_data.clone()))
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
