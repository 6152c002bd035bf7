use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use defaultdesk_infra::config::AppConfig;
use defaultdesk_infra::db;
use defaultdesk_infra::repository::{InMemoryStore, PostgresStore, UnitOfWorkFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the process environment still applies.
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env().context("invalid configuration")?;
    defaultdesk_observability::init(config.log_format);
    info!(?config, "starting");
    if config.uses_dev_secret() {
        warn!("JWT_SECRET not set; using insecure dev default");
    }

    let store: Arc<dyn UnitOfWorkFactory> = match &config.database_url {
        Some(url) => {
            let pool = db::connect(url, config.max_db_connections).await?;
            db::migrate(&pool).await?;
            Arc::new(PostgresStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store (data is lost on exit)");
            Arc::new(InMemoryStore::new())
        }
    };

    let app = defaultdesk_api::app::build_app(store, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
