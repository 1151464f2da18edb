use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use super::Db;
use crate::errors::{BackendError, Result};
use crate::prompt::{Category, Prompt, PromptInput, Tags};
use crate::store::PromptBackend;

/// Row as stored; tags are JSON text and the timestamp is RFC 3339
#[derive(Debug, FromRow)]
struct PromptRow {
    id:         String,
    title:      String,
    content:    String,
    category:   String,
    tags:       String,
    created_at: String,
}

impl TryFrom<PromptRow> for Prompt {
    type Error = BackendError;

    fn try_from(row: PromptRow) -> std::result::Result<Self, Self::Error> {
        let tags: Tags = serde_json::from_str(&row.tags).map_err(|e| {
            BackendError::Unavailable(format!("corrupt tags on prompt '{}': {}", row.id, e))
        })?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| {
                BackendError::Unavailable(format!("corrupt timestamp on prompt '{}': {}", row.id, e))
            })?
            .with_timezone(&Utc);

        Ok(Prompt {
            id: row.id,
            title: row.title,
            content: row.content,
            category: Category::parse_lenient(&row.category),
            tags,
            created_at,
        })
    }
}

fn tags_json(tags: &Tags) -> String {
    // A list of strings always serializes
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// SQLite-backed prompt store
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Db::connect(path).await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl PromptBackend for SqliteBackend {
    async fn list(&self) -> std::result::Result<Vec<Prompt>, BackendError> {
        let rows = sqlx::query_as::<_, PromptRow>(
            "SELECT id, title, content, category, tags, created_at
             FROM prompts ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Prompt::try_from).collect()
    }

    async fn insert(&self, input: &PromptInput) -> std::result::Result<Prompt, BackendError> {
        let row = sqlx::query_as::<_, PromptRow>(
            "INSERT INTO prompts (id, title, content, category, tags, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id, title, content, category, tags, created_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.category.as_str())
        .bind(tags_json(&input.tags))
        .bind(timestamp(Utc::now()))
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(BackendError::NoRecord("insert"))?.try_into()
    }

    async fn update(&self, id: &str, input: &PromptInput) -> std::result::Result<Prompt, BackendError> {
        let row = sqlx::query_as::<_, PromptRow>(
            "UPDATE prompts SET title = ?, content = ?, category = ?, tags = ? WHERE id = ?
             RETURNING id, title, content, category, tags, created_at",
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.category.as_str())
        .bind(tags_json(&input.tags))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| BackendError::NotFound(id.to_string()))?
            .try_into()
    }

    async fn delete(&self, id: &str) -> std::result::Result<(), BackendError> {
        let result = sqlx::query("DELETE FROM prompts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BackendError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
