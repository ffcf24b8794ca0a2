use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod config;
mod docs;
mod error;
mod ledger;
mod model;
mod report;
mod routes;
mod scanner;
mod storage;
mod utils;

use config::Config;
use ledger::{LiveFeed, SessionLedger};
use report::ReportAggregator;
use storage::daily_log::DailyLogStore;
use storage::directory::UserDirectory;
use storage::guard::StorageGuard;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;

#[get("/")]
async fn index() -> impl Responder {
    "RFID Access Control"
}

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
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let storage = Arc::new(StorageGuard::new(
        PathBuf::from(&config.data_dir),
        Duration::from_millis(config.storage_wait_ms),
    )?);
    let directory = Arc::new(UserDirectory::new(storage.clone()));
    directory
        .load()
        .await
        .expect("failed to load user directory");

    let ledger = Arc::new(SessionLedger::new(
        directory.clone(),
        DailyLogStore::new(storage.clone()),
    ));
    let reports = ReportAggregator::new(DailyLogStore::new(storage.clone()));
    let feed = Arc::new(LiveFeed::default());

    // hardware scan source, concurrent with the HTTP server below
    let scanner_addr = config.scanner_addr.clone();
    let scanner_ledger = ledger.clone();
    let scanner_feed = feed.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = scanner::run(scanner_addr, scanner_ledger, scanner_feed).await {
            eprintln!("Scan listener failed: {:?}", e);
        }
    });

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    let directory_data = Data::from(directory);
    let ledger_data = Data::from(ledger);
    let feed_data = Data::from(feed);
    let reports_data = Data::new(reports);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(directory_data.clone())
            .app_data(ledger_data.clone())
            .app_data(feed_data.clone())
            .app_data(reports_data.clone())
            .app_data(Data::new(config_data.clone()))
            .service(index)
            // scan + user + report routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
