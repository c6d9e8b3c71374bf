mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;
#[cfg(test)]
mod test_support;

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;

use crate::config::AppConfig;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| io::Error::other(e.to_string()))?;

    log::info!("Connecting to database...");
    let db = db::establish_connection(&config)
        .await
        .map_err(|e| io::Error::other(format!("Failed to connect to database: {}", e)))?;
    log::info!("Database connected");

    if config.create_schema {
        db::create_schema(&db)
            .await
            .map_err(|e| io::Error::other(format!("Failed to create schema: {}", e)))?;
        log::info!("Schema ready");
    }

    tokio::fs::create_dir_all(&config.media_root).await?;

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server on http://{}:{}", bind.0, bind.1);

    let db = web::Data::new(db);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(config.clone())
            .configure(routes::configure_routes)
    })
        .bind(bind)?
        .run()
        .await
}
