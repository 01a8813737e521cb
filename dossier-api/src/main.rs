use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use dossier_api::config::ApiConfig;
use dossier_api::helpers::auth::{hash_password, SessionStore};
use dossier_api::helpers::database::{get_db_path, get_objects_dir, initialize_database};
use dossier_api::jobs::dossier_manager::DossierManager;
use dossier_api::jobs::upload_tracker::UploadTracker;
use dossier_api::storage::{LocalObjectStore, ObjectStore};
use std::sync::Arc;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to the user config dir)
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[arg(long)]
    log_file_path: Option<String>,

    /// Print the salted hash to put in `auth.advisors` and exit
    #[arg(long, value_name = "PASSWORD")]
    hash_password: Option<String>,
}

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    if let Some(password) = args.hash_password {
        println!("{}", hash_password(&password));
        return Ok(());
    }

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = args.log_file_path {
        let log_path = std::path::Path::new(&log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("dossier-api.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter.clone())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    // Load config
    let (config, config_path) = match args.config {
        Some(path) => (ApiConfig::load_from(&path).map_err(io_error)?, path),
        None => ApiConfig::load().map_err(io_error)?,
    };
    tracing::info!("Using config file {}", config_path.display());

    // Initialize database
    let db = initialize_database(&config.storage).map_err(io_error)?;
    tracing::info!(
        "Database initialized at: {}",
        get_db_path(&config.storage).map_err(io_error)?.display()
    );

    // Attachment storage
    let objects_dir = get_objects_dir(&config.storage).map_err(io_error)?;
    let store: Arc<dyn ObjectStore> = Arc::new(
        LocalObjectStore::new(&objects_dir, &config.storage.public_base_url).map_err(io_error)?,
    );
    tracing::info!("Attachments stored under {}", objects_dir.display());

    let manager = Arc::new(DossierManager::new(
        db.async_connection.clone(),
        store,
        UploadTracker::new(),
        config.storage.upload_concurrency,
    ));

    let sessions = Arc::new(SessionStore::new(&config.auth));
    if !sessions.has_advisors() {
        tracing::warn!(
            "No advisor accounts configured in {}; the dashboard endpoints will reject every request",
            config_path.display()
        );
    }

    let host = config.server.host.clone();
    let port = config.server.port;
    tracing::info!("Starting server on {}:{}", host, port);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in &config.cors.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
        let cors = cors
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(manager.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .configure(dossier_api::handlers::configure_routes)
    })
    .bind((host.as_str(), port))?
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }

        tracing::info!("Ctrl+C received, shutting down...");
        handle.stop(true).await;
    });

    server.await
}
