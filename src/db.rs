use crate::errors::ServiceError;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::time::Duration;
use tracing::info;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Establishes a connection pool to the audit database.
pub async fn establish_connection(database_url: &str) -> Result<DbPool, ServiceError> {
    let mut opts = ConnectOptions::new(database_url.to_string());
    opts.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let pool = Database::connect(opts).await?;
    info!("Database connection established");
    Ok(pool)
}

/// Ensures the sync_log table exists. The audit log is the only persisted
/// entity; its schema is small enough to manage inline instead of carrying a
/// migration crate.
pub async fn ensure_schema(pool: &DbPool) -> Result<(), ServiceError> {
    let sql = r#"CREATE TABLE IF NOT EXISTS sync_log (
        id TEXT PRIMARY KEY NOT NULL,
        order_id TEXT NOT NULL,
        status INTEGER NOT NULL,
        message TEXT NOT NULL,
        correlation_id TEXT,
        raw_response TEXT,
        retry_count INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT
    )"#;
    pool.execute(Statement::from_string(pool.get_database_backend(), sql.to_string()))
        .await?;
    let index_sql = "CREATE INDEX IF NOT EXISTS idx_sync_log_order_id ON sync_log (order_id)";
    pool.execute(Statement::from_string(
        pool.get_database_backend(),
        index_sql.to_string(),
    ))
    .await?;
    Ok(())
}
