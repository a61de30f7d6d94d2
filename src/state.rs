use std::sync::Arc;

use crate::{
    auth::{
        jwt::JwtKeys,
        password::{Argon2Hasher, CredentialHasher},
        repo::{PgUserRepo, UserRepo},
    },
    config::AppConfig,
    db,
    hangouts::repo::{HangoutRepo, PgHangoutRepo},
    memory::MemoryStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserRepo>,
    pub hangouts: Arc<dyn HangoutRepo>,
    pub hasher: Arc<dyn CredentialHasher>,
}

impl AppState {
    /// Connects to Postgres and applies pending migrations.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let jwt = JwtKeys::from_config(&config.jwt)?;
        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;

        Ok(Self {
            config: Arc::new(config),
            jwt,
            users: Arc::new(PgUserRepo::new(pool.clone())),
            hangouts: Arc::new(PgHangoutRepo::new(pool)),
            hasher: Arc::new(Argon2Hasher::default()),
        })
    }

    /// State backed by a single `MemoryStore`; no database required.
    pub fn in_memory(config: AppConfig) -> anyhow::Result<Self> {
        let jwt = JwtKeys::from_config(&config.jwt)?;
        let store = Arc::new(MemoryStore::new());
        Ok(Self {
            config: Arc::new(config),
            jwt,
            users: store.clone(),
            hangouts: store,
            hasher: Arc::new(Argon2Hasher::default()),
        })
    }
}
