use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::{anyhow, Context};
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, EnvFilter};

use vx_api::{create_app, AppState, Repositories};
use vx_infra::{LogOtpNotifier, MemoryStore};
use vx_shared::config::{AppConfig, LogFormat, LoggingConfig, ServerConfig};

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = fmt().with_env_filter(filter).with_target(true);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

async fn serve<P: Repositories>(state: AppState<P>, server: &ServerConfig) -> anyhow::Result<()> {
    let authorizer = web::Data::from(state.authorizer());
    let state = web::Data::new(state);
    let max_payload_size = server.max_payload_size;
    let bind_address = server.bind_address();

    info!(%bind_address, "Starting Volumx API server");

    let mut http = HttpServer::new(move || {
        create_app(state.clone(), authorizer.clone(), max_payload_size)
            .wrap(TracingLogger::default())
    });
    if server.workers > 0 {
        http = http.workers(server.workers);
    }

    http.bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await
        .context("server terminated with an error")
}

#[cfg(feature = "mysql")]
async fn serve_mysql(config: &AppConfig) -> anyhow::Result<()> {
    use vx_infra::database::{
        DatabasePool, MySqlBusinessRepository, MySqlRightsRepository, MySqlUserRepository,
    };

    let pool = DatabasePool::new(config.database.clone())
        .await
        .context("failed to connect to the database")?;
    if !pool.health_check().await.context("database health check failed")? {
        return Err(anyhow!("database health check returned an unexpected value"));
    }
    if config.database.run_migrations {
        pool.run_migrations().await.context("failed to run migrations")?;
    }

    let db = pool.get_pool().clone();
    let state = AppState::<vx_api::MySql>::new(
        Arc::new(MySqlUserRepository::new(db.clone())),
        Arc::new(MySqlBusinessRepository::new(db.clone())),
        Arc::new(MySqlRightsRepository::new(db)),
        Arc::new(LogOtpNotifier::new()),
        &config.auth,
    );

    let result = serve(state, &config.server).await;
    pool.close().await;
    result
}

#[cfg(not(feature = "mysql"))]
async fn serve_mysql(_config: &AppConfig) -> anyhow::Result<()> {
    Err(anyhow!("built without MySQL support; set DATABASE_URL=memory://"))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);
    config.validate().map_err(|e| anyhow!("invalid configuration: {}", e))?;

    info!(environment = ?config.environment, "Configuration loaded");

    if config.database.is_memory() {
        info!("Using in-memory storage; OTP codes are written to the debug log");
        let notifier = Arc::new(LogOtpNotifier::revealing());
        let state = AppState::in_memory(MemoryStore::new(), notifier, &config.auth);
        serve(state, &config.server).await
    } else {
        serve_mysql(&config).await
    }
}
