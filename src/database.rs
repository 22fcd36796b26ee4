//! Database union structure.
use axum::extract::FromRef;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::AppState;

pub const DEFAULT_DATABASE_PATH: &str = "ladle.db";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Custom db structure to pass to Axum.
#[derive(Clone)]
pub struct Database {
    pub sqlite: SqlitePool,
}

impl Database {
    /// Init database connections.
    pub async fn new(path: &str, pool: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let sqlite = SqlitePoolOptions::new()
            .max_connections(pool)
            .connect_with(options)
            .await?;

        tracing::info!(%path, "sqlite connected");

        Ok(Self { sqlite })
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(app_state: &AppState) -> Database {
        app_state.db.clone()
    }
}
