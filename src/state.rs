use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::auth::repo::{MemoryUserRepo, PgUserRepo, UserRepo};
use crate::config::{AppConfig, JwtConfig, StoreBackend};
use crate::transactions::repo::{MemoryTransactionRepo, PgTransactionRepo, TransactionRepo};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub transactions: Arc<dyn TransactionRepo>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        match config.store {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is not set")?;
                let db = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("run migrations")?;

                info!("using postgres store");
                Ok(Self::from_parts(
                    config,
                    Arc::new(PgUserRepo::new(db.clone())),
                    Arc::new(PgTransactionRepo::new(db)),
                ))
            }
            StoreBackend::Memory => {
                warn!("using in-memory store; all data is lost on shutdown");
                Ok(Self::from_parts(
                    config,
                    Arc::new(MemoryUserRepo::new()),
                    Arc::new(MemoryTransactionRepo::new()),
                ))
            }
        }
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        transactions: Arc<dyn TransactionRepo>,
    ) -> Self {
        Self {
            config,
            users,
            transactions,
        }
    }

    /// In-memory state with a fixed signing key, for tests.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store: StoreBackend::Memory,
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
        });
        Self::from_parts(
            config,
            Arc::new(MemoryUserRepo::new()),
            Arc::new(MemoryTransactionRepo::new()),
        )
    }
}
