use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use swipe_match::config::{CacheBackend, CacheSettings, LoggingSettings, Settings};
use swipe_match::core::{MatchingEngine, SwipeQuota};
use swipe_match::routes::{self, AppState};
use swipe_match::services::{
    MemoryRelationCache, PostgresDirectory, RedisRelationCache, RelationCache,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.json().init(),
    }
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

async fn build_relation_cache(cache: &CacheSettings) -> std::io::Result<Arc<dyn RelationCache>> {
    match cache.backend {
        CacheBackend::Redis => {
            let relations = RedisRelationCache::new(
                &cache.redis_url,
                cache.history_ttl_secs,
                cache.atomic_quota,
            )
            .await
            .map_err(|e| startup_error("Failed to connect to Redis", e))?;

            info!(
                "Redis relation cache initialized (TTL: {}s, atomic quota: {})",
                relations.ttl_secs(),
                cache.atomic_quota
            );
            Ok(Arc::new(relations))
        }
        CacheBackend::Memory => {
            warn!("Using in-process relation cache; histories are not shared between instances");
            info!(
                "Memory relation cache initialized (TTL: {}s)",
                cache.history_ttl_secs
            );
            Ok(Arc::new(MemoryRelationCache::with_ttl(Duration::from_secs(
                cache.history_ttl_secs,
            ))))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging);

    info!("Starting Swipe Match service...");

    let directory = Arc::new(
        PostgresDirectory::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?,
    );

    info!(
        "PostgreSQL directory initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    let relations = build_relation_cache(&settings.cache).await?;

    let quota = SwipeQuota::new(settings.matching.swipe_limit);
    let engine = MatchingEngine::new(directory.clone(), relations.clone(), quota);

    info!("Matching engine initialized with swipe limit {}", quota.limit());

    let app_state = AppState {
        engine,
        directory: directory.clone(),
        relations,
        subscriptions: directory,
        request_timeout: Duration::from_secs(settings.matching.request_timeout_secs),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
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
