use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use venuefit_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

/// Open a pool for the configured local database. The schema carries no
/// foreign keys (merged cloud data may reference records that never
/// existed locally), so only the concurrency pragmas are applied.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    // A pooled ":memory:" database would hand each connection its own
    // empty database, so memory URLs are capped to one connection.
    let max_connections =
        if is_memory_url(&config.url) { 1 } else { config.max_connections.max(1) };
    pool_options(max_connections, config.timeout_secs).connect(&config.url).await
}

/// Single-connection in-memory pool for tests and ephemeral runs.
pub async fn connect_in_memory() -> Result<DbPool, sqlx::Error> {
    pool_options(1, 30).connect("sqlite::memory:").await
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn pool_options(max_connections: u32, timeout_secs: u64) -> SqlitePoolOptions {
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_urls_are_detected() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url("sqlite://file:test?mode=memory&cache=shared"));
        assert!(!is_memory_url("sqlite://venuefit.db"));
    }

    #[tokio::test]
    async fn memory_database_keeps_its_schema_across_queries() {
        // The configured pool size is ignored for memory URLs; with more
        // than one real connection the schema would vanish between calls.
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_owned(),
            max_connections: 5,
            timeout_secs: 30,
        };
        let pool = connect(&config).await.expect("connect");
        crate::migrations::run_pending(&pool).await.expect("migrate");

        for _ in 0..3 {
            sqlx::query("SELECT COUNT(*) FROM clients")
                .fetch_one(&pool)
                .await
                .expect("clients table visible on every acquire");
        }
    }
}
