mod models;
pub mod seeders;

pub use models::*;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        // Strip SQL comment lines (lines starting with --)
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn init(data_dir: &Path, max_connections: u32) -> Result<DbPool> {
    let db_path = data_dir.join("easyevents.db");

    info!("Initializing database at {}", db_path.display());

    // Pragmas set here are applied to every connection the pool opens
    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

/// Open a private in-memory database with the full schema.
///
/// A single connection that never expires is used because every SQLite
/// in-memory connection owns its own database.
pub async fn init_in_memory() -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    // Migration 001: Users, sessions, venues and suppliers
    execute_sql(pool, include_str!("../../migrations/001_initial.sql")).await?;

    // Migration 002: Events with vendors, checklist items and guests
    execute_sql(pool, include_str!("../../migrations/002_events.sql")).await?;

    // Migration 003: Password reset columns on users
    let has_reset_token: Option<(String,)> = sqlx::query_as(
        "SELECT name FROM pragma_table_info('users') WHERE name = 'reset_token_hash'",
    )
    .fetch_optional(pool)
    .await?;
    if has_reset_token.is_none() {
        execute_sql(pool, include_str!("../../migrations/003_password_reset.sql")).await?;
    }

    info!("Migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = init_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "checklist_items",
                "event_vendors",
                "events",
                "guests",
                "sessions",
                "suppliers",
                "users",
                "venues"
            ]
        );
    }

    #[tokio::test]
    async fn test_file_database_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init(dir.path(), 2).await.unwrap();

        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
        assert!(dir.path().join("easyevents.db").exists());
    }

    #[tokio::test]
    async fn test_every_pooled_connection_gets_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init(dir.path(), 3).await.unwrap();

        // Hold all connections at once so each one is checked
        let mut conns = Vec::new();
        for _ in 0..3 {
            conns.push(pool.acquire().await.unwrap());
        }
        for conn in conns.iter_mut() {
            let (synchronous,): (i64,) = sqlx::query_as("PRAGMA synchronous")
                .fetch_one(&mut **conn)
                .await
                .unwrap();
            let (foreign_keys,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
                .fetch_one(&mut **conn)
                .await
                .unwrap();
            assert_eq!(synchronous, 1, "synchronous should be NORMAL");
            assert_eq!(foreign_keys, 1);
        }
    }
}
