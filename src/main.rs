use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use matchmaking_api::{
    api::{create_router, AppState},
    config::Config,
    db::{self, Cache, PgInteractionStore, PgUserDirectory},
    services::{EngineSettings, MatchingEngine},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("matchmaking_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let users = PgUserDirectory::new(pool.clone());
    db::seed_users(&users, config.seed_users).await?;

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let cache = Cache::new(redis_client).await?;

    let engine = MatchingEngine::new(
        Arc::new(users),
        Arc::new(PgInteractionStore::new(pool)),
        Arc::new(cache),
        EngineSettings {
            max_daily_views: config.max_daily_views,
            session_ttl: config.session_ttl(),
        },
    );

    let app = create_router(AppState::new(engine, config.request_timeout()));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        address = %addr,
        max_daily_views = config.max_daily_views,
        "Server listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
