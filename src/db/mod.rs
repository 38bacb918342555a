//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for topics, newspapers, redactors and
//! their assignments.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topics (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            name_folded TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS redactors (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            username_folded TEXT NOT NULL,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            password_hash TEXT NOT NULL,
            years_of_experience INTEGER NOT NULL CHECK (years_of_experience >= 3),
            is_featured INTEGER NOT NULL DEFAULT 0,
            date_joined TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS newspapers (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            title_folded TEXT NOT NULL,
            context TEXT NOT NULL,
            published_date TEXT NOT NULL,
            topic_id TEXT NOT NULL REFERENCES topics(id) ON DELETE CASCADE
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Assignment of redactors to newspapers
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS newspaper_redactors (
            newspaper_id TEXT NOT NULL REFERENCES newspapers(id) ON DELETE CASCADE,
            redactor_id TEXT NOT NULL REFERENCES redactors(id) ON DELETE CASCADE,
            PRIMARY KEY (newspaper_id, redactor_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_newspapers_topic_id ON newspapers(topic_id);
        CREATE INDEX IF NOT EXISTS idx_newspapers_published_date ON newspapers(published_date);
        CREATE INDEX IF NOT EXISTS idx_newspaper_redactors_redactor_id ON newspaper_redactors(redactor_id);
        CREATE INDEX IF NOT EXISTS idx_redactors_is_featured ON redactors(is_featured);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
