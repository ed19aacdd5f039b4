use std::sync::Arc;
use std::net::SocketAddr;
use anyhow::Context;
use chrono::Duration;
use skyseat_api::{app, metrics::Metrics, state::{AppState, AuthConfig}};
use skyseat_booking::{BookingEngine, EngineDeps, EngineSettings};
use skyseat_core::notify::BookingNotifier;
use skyseat_core::SystemClock;
use skyseat_store::app_config::Config;
use skyseat_store::{DbClient, PgBookingRepository, PgCatalogRepository, PgSeatRepository, RedisClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyseat_api=debug,skyseat_booking=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting SkySeat API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to Postgres")?;
    if config.database.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
    }

    let catalog = Arc::new(PgCatalogRepository::new(db.pool.clone()));
    let deps = EngineDeps {
        seats: Arc::new(PgSeatRepository::new(db.pool.clone())),
        ledger: Arc::new(PgBookingRepository::new(db.pool.clone())),
        flights: catalog.clone(),
        services: catalog.clone(),
        discounts: catalog,
        notifier: build_notifier(&config)?,
        clock: Arc::new(SystemClock),
    };

    let settings = EngineSettings {
        cancellation_window: Duration::hours(config.business_rules.cancellation_window_hours),
        page_size: config.business_rules.page_size,
    };

    // Rate limiting is optional; a bad URL only disables it
    let redis = match config.redis.as_ref() {
        Some(redis) => match RedisClient::new(&redis.url) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!("Redis unavailable, rate limiting disabled: {}", e);
                None
            }
        },
        None => None,
    };

    let app_state = AppState {
        engine: Arc::new(BookingEngine::new(deps, settings)),
        redis,
        metrics: Arc::new(Metrics::new()?),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
        business_rules: config.business_rules.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>()
    ).await?;

    Ok(())
}

#[cfg(feature = "kafka")]
fn build_notifier(config: &Config) -> anyhow::Result<Arc<dyn BookingNotifier>> {
    match config.kafka.as_ref() {
        Some(kafka) => {
            let producer = skyseat_store::EventProducer::new(&kafka.brokers)
                .context("Failed to create Kafka producer")?;
            Ok(Arc::new(producer))
        }
        None => Ok(Arc::new(skyseat_store::LogNotifier)),
    }
}

#[cfg(not(feature = "kafka"))]
fn build_notifier(_config: &Config) -> anyhow::Result<Arc<dyn BookingNotifier>> {
    Ok(Arc::new(skyseat_store::LogNotifier))
}
