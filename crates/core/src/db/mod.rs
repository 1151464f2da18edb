use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::errors::{PromptError, Result};

pub mod prompts;
pub mod schema;

pub use prompts::SqliteBackend;

pub struct Db;

impl Db {
    /// Open (creating if needed) the database at `path` and apply the schema
    pub async fn connect(path: &Path) -> Result<SqlitePool> {
        // Create directory if it doesn't exist
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                PromptError::Config(format!("Failed to create database directory: {}", e))
            })?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal),
            )
            .await
            .map_err(|e| PromptError::Store(e.into()))?;

        // Split by semicolon to run multiple statements
        for statement in schema::SCHEMA.split(';') {
            if statement.trim().is_empty() {
                continue;
            }
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| PromptError::Store(e.into()))?;
        }

        Ok(pool)
    }
}
