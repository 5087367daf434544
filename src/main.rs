use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use maternal_risk::config::{LogFormat, LoggingSettings, Settings};
use maternal_risk::core::PredictionService;
use maternal_risk::routes::{self, AppState};
use maternal_risk::services::ModelStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use validator::Validate;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration; logging is set up from it before anything is reported
    let settings = Settings::load();

    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default()
        .with_env_overrides();
    init_tracing(&logging);

    info!("Starting maternal risk prediction service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    if let Err(e) = settings.validate() {
        error!("Invalid configuration: {}", e);
        return Err(std::io::Error::other(format!("Configuration error: {}", e)));
    }

    info!("Configuration loaded successfully");

    // Load both models once; they are shared read-only by every worker
    let store = ModelStore::load(&settings.models).map_err(|e| {
        error!("Failed to load models: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    let predictor = Arc::new(PredictionService::new(
        store.gdm_classifier(),
        store.child_classifier(),
    ));

    info!("Prediction service initialized");

    // Build application state
    let app_state = AppState {
        predictor,
        frontend_dir: Arc::new(PathBuf::from(&settings.assets.frontend_dir)),
        strict_not_found: settings.assets.strict_not_found,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);
    let cors_origins = settings.server.cors_origins.clone();

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = if cors_origins.is_empty() {
            Cors::permissive()
        } else {
            cors_origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
                .allow_any_method()
                .allow_any_header()
                .supports_credentials()
        };

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

/// `RUST_LOG` wins over the configured filter when set
fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format {
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Compact => subscriber.compact().init(),
    }
}
