mod config;
mod db;
mod error;
mod middleware;
mod migrations;
mod models;
mod routes;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use std::io;
use std::sync::Arc;

use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use config::AppConfig;
use services::email_service::{LogMailer, Mailer, SmtpMailer};
use services::match_import_service::MatchImportService;

#[cfg(not(test))]
#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Connecting to database...");
    let db = db::establish_connection(&config.database_url)
        .await
        .map_err(|e| {
            error!("Database connection failed: {}", e);
            io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string())
        })?;
    info!("Database connected");

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(
            SmtpMailer::new(smtp).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?,
        ),
        None => Arc::new(LogMailer),
    };

    std::fs::create_dir_all(&config.upload_dir)?;

    let importer = MatchImportService::new(config.football_data.clone());
    importer.clone().spawn_poller(db.clone());

    let bind_address = (config.host.clone(), config.port);
    info!("Starting server on http://{}:{}", bind_address.0, bind_address.1);

    let db_data = web::Data::new(db);
    let config_data = web::Data::new(config);
    let mailer_data: web::Data<dyn Mailer> = web::Data::from(mailer);
    let importer_data = web::Data::new(importer);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .app_data(mailer_data.clone())
            .app_data(importer_data.clone())
            .configure(routes::configure_routes)
            .service(Files::new("/uploads", config_data.upload_dir.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
