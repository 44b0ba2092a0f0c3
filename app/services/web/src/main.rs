mod handlers;
mod routings;

use app_config::AppConfig;
use app_error::AppError;
use app_log::init_tracing;
use app_redis::Redis;
use app_state::AppState;
use app_store::PgStore;
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::*;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    let config = AppConfig::new()?;
    init_tracing(config.log_level);
    debug!("{:#?}", &config);

    let pg = PgPoolOptions::new()
        .max_connections(config.pg_connection as u32)
        .connect(&AppConfig::database_url()?)
        .await?;
    sqlx::migrate!("../../SQL/migrations").run(&pg).await?;
    let redis = Redis::new(&config.redis_url)?;

    let bind = config.backend_bind.clone();
    let state = Arc::new(AppState::new(
        config,
        Arc::new(PgStore::new(pg)),
        Arc::new(redis),
    ));
    let app = routings::router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Listening on {}", &bind);
    axum::serve(listener, app).await?;
    Ok(())
}
