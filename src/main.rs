use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use cablib_match::config::Settings;
use cablib_match::core::Matcher;
use cablib_match::routes::{self, auth::TokenVerifier, handle_json_payload_error, handle_query_payload_error, AppState};
use cablib_match::services::{BackendClient, CacheManager, PostgresClient};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(default_level: &str, default_format: &str) {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| default_level.to_string());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| default_format.to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn config_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, format!("Configuration error: {}", e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(config_error)?;

    init_tracing(&settings.logging.level, &settings.logging.format);

    info!("Starting Cablib matching service...");

    let (weights, policy) = settings.matching_setup().map_err(|e| {
        error!("Invalid matching configuration: {}", e);
        config_error(e)
    })?;

    let matcher = Matcher::new(weights, policy);

    info!("Matcher initialized with weights: {:?}", weights);

    // Marketplace backend
    let backend = Arc::new(
        BackendClient::new(
            settings.backend.base_url.clone(),
            Duration::from_secs(settings.backend.timeout_secs.unwrap_or(10)),
        )
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?,
    );

    info!("Backend client initialized ({})", backend.base_url());

    // Cache (optional - falls back to the in-process tier)
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);

    let cache = match (&settings.cache.redis_url, settings.cache.enabled) {
        (Some(redis_url), true) => match CacheManager::connect(redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to connect to Redis ({}), using in-process cache only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        (_, true) => CacheManager::in_memory(l1_cache_size, cache_ttl),
        (_, false) => {
            info!("Caching disabled");
            CacheManager::disabled()
        }
    };
    let cache = Arc::new(cache);

    info!("Cache manager initialized ({:?})", cache.stats());

    // PostgreSQL (search history)
    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            Some(db_max_conn),
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            io::Error::new(io::ErrorKind::Other, e)
        })?,
    );

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    let app_state = AppState {
        backend,
        cache,
        postgres,
        matcher,
        verifier: Arc::new(TokenVerifier::new(&settings.auth.jwt_secret)),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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
