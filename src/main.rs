pub mod config;
pub mod db;
pub mod handlers;
pub mod service;
pub mod models;
pub mod dto;
pub mod errors;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use log::{error, info};
use sqlx::{postgres::Postgres, Pool};

use config::Config;
use db::{init_db_pool, PgStore, Store};
use service::{auth::AuthMiddleware, log::{init_logger, LoggerMiddleware}};

type PGPool = Pool<Postgres>;

/// Route table plus the extractor error handlers shared by every route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(errors::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(errors::path_error_handler))
        .service(handlers::auth::health)
        .service(web::scope("/api").configure(handlers::auth::init_routes))
        .service(web::scope("/events").configure(handlers::event::init_routes))
        .service(web::scope("/payment").configure(handlers::payment::init_routes));
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logger();
    let config = Config::from_env().map_err(|err| {
        error!("invalid configuration: {}", err);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err)
    })?;

    let pool: PGPool = init_db_pool(&config.database_url, config.max_connections)
        .await
        .map_err(|err| {
            error!("failed to initialise database: {}", err);
            std::io::Error::new(std::io::ErrorKind::Other, err)
        })?;
    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool.clone()));

    let bind = (config.host.clone(), config.port);
    info!("listening on {}:{}", bind.0, bind.1);
    let app_config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(Arc::clone(&store)))
            .app_data(app_config.clone())
            .wrap(AuthMiddleware {
                store: Arc::clone(&store),
            })
            .wrap(LoggerMiddleware)
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await?;

    pool.close().await;
    info!("database pool closed");
    Ok(())
}
