use std::{sync::Arc, time::Duration};

use sqlx::{Pool, Postgres};
use tracing::info;

use crate::{
    common::{
        error::ServerError,
        rate_limiter::{RateLimiter, TokenBucketLimiter},
    },
    config::config::CONFIG,
    game::{db::PgStore, engine::GameEngine, shuffle::Randomizer},
    system_log::builder::SystemLogBuilder,
};

pub struct AppState {
    pool: Pool<Postgres>,
    engine: GameEngine<PgStore>,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    pub async fn from_connection_string(connection_string: &str) -> Result<Arc<Self>, ServerError> {
        let pool = Pool::<Postgres>::connect(connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to run migrations: {}", e)))?;
        info!("Database migrations are up to date");

        let randomizer = Randomizer::from_config(CONFIG.game.shuffle_seed);
        let engine = GameEngine::new(PgStore::new(&pool), randomizer);

        let limiter = TokenBucketLimiter::new(CONFIG.rate_limit.per_second, CONFIG.rate_limit.burst);
        limiter.spawn_cleanup(Duration::from_secs(3600));

        let state = Arc::new(Self {
            pool,
            engine,
            rate_limiter: Arc::new(limiter),
        });

        Ok(state)
    }

    pub fn get_pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub fn get_engine(&self) -> &GameEngine<PgStore> {
        &self.engine
    }

    pub fn get_rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }

    pub fn syslog(&self) -> SystemLogBuilder {
        SystemLogBuilder::new(&self.pool)
    }
}
