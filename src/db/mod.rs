pub mod activity_repo;
pub mod stats_repo;
pub mod zone_meta_repo;

use std::path::Path;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub type Db = SqlitePool;

/// Open (creating if needed) the SQLite store and run migrations.
///
/// `:memory:` opens a private in-memory database on a single connection so
/// every query sees the same schema.
pub async fn init_db(path: &Path) -> anyhow::Result<Db> {
    let pool = if path.as_os_str() == ":memory:" {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?
    } else {
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        SqlitePool::connect_with(opts).await?
    };
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}

/// Liveness probe for the health endpoint.
pub async fn ping(db: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query("SELECT 1").execute(db).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory_db() -> Db {
    init_db(Path::new(":memory:"))
        .await
        .expect("in-memory database")
}
