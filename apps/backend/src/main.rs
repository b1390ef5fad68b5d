use std::sync::Arc;

use backend::config::Config;
use backend::state::app_state::AppState;
use backend::state::security_config::SecurityConfig;
use backend::store::redis_store::RedisSessionStore;
use backend::store::SessionStore;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "fatal startup failure");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let security = SecurityConfig::from_env()?;

    let db = backend::db::connect(&config.database_url).await?;
    migration::migrate(&db, migration::MigrationCommand::Up).await?;

    let redis_client = redis::Client::open(config.redis_url.clone())?;
    let conn = redis_client.get_connection_manager().await?;
    let store: Arc<dyn SessionStore> = Arc::new(RedisSessionStore::new(conn));

    let state = AppState::new(Some(db), security, store);

    backend::run(state, &config.bind_host, config.bind_port).await?;
    Ok(())
}
