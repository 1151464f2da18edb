//! Record store client
//!
//! [`PromptBackend`] is the raw remote boundary with one implementation per
//! store (SQLite, in-memory, HTTP). [`PromptsClient`] wraps a backend,
//! logs before and after every call, and converts failures into
//! [`PromptError::Store`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::errors::{BackendError, PromptError, Result};
use crate::logger::Logger;
use crate::prompt::{Prompt, PromptInput};
use crate::search;

pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

/// Remote collection of prompt records
#[async_trait]
pub trait PromptBackend: Send + Sync {
    /// All records, newest `created_at` first
    async fn list(&self) -> std::result::Result<Vec<Prompt>, BackendError>;

    /// Insert one record; the store assigns id and timestamp
    async fn insert(&self, input: &PromptInput) -> std::result::Result<Prompt, BackendError>;

    async fn update(&self, id: &str, input: &PromptInput) -> std::result::Result<Prompt, BackendError>;

    async fn delete(&self, id: &str) -> std::result::Result<(), BackendError>;
}

#[derive(Clone)]
pub struct PromptsClient {
    backend: Arc<dyn PromptBackend>,
    logger:  Logger,
}

impl PromptsClient {
    pub fn new(backend: Arc<dyn PromptBackend>, logger: Logger) -> Self {
        Self { backend, logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn get_all(&self) -> Result<Vec<Prompt>> {
        self.logger.info("Fetching all prompts", None);
        match self.backend.list().await {
            Ok(prompts) => {
                self.logger.info(
                    format!("Successfully fetched {} prompts", prompts.len()),
                    Some(json!({ "count": prompts.len() })),
                );
                Ok(prompts)
            },
            Err(err) => Err(self.fail("Failed to fetch prompts", err)),
        }
    }

    pub async fn create(&self, input: PromptInput) -> Result<Prompt> {
        input.validate()?;
        self.logger
            .info("Creating new prompt", Some(json!({ "title": input.title })));
        match self.backend.insert(&input).await {
            Ok(prompt) => {
                self.logger
                    .info("Successfully created prompt", Some(json!({ "id": prompt.id })));
                Ok(prompt)
            },
            Err(err) => Err(self.fail("Failed to create prompt", err)),
        }
    }

    pub async fn update(&self, id: &str, input: PromptInput) -> Result<Prompt> {
        input.validate()?;
        self.logger.info(
            "Updating prompt",
            Some(json!({ "id": id, "title": input.title })),
        );
        match self.backend.update(id, &input).await {
            Ok(prompt) => {
                self.logger
                    .info("Successfully updated prompt", Some(json!({ "id": id })));
                Ok(prompt)
            },
            Err(err) => Err(self.fail("Failed to update prompt", err)),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.logger.info("Deleting prompt", Some(json!({ "id": id })));
        match self.backend.delete(id).await {
            Ok(()) => {
                self.logger
                    .info("Successfully deleted prompt", Some(json!({ "id": id })));
                Ok(())
            },
            Err(err) => Err(self.fail("Failed to delete prompt", err)),
        }
    }

    /// Case-insensitive substring search over title, content and tags
    pub async fn search(&self, query: &str) -> Result<Vec<Prompt>> {
        let prompts = self.get_all().await?;
        Ok(search::matching(prompts, query))
    }

    fn fail(&self, message: &str, err: BackendError) -> PromptError {
        let err = PromptError::Store(err);
        self.logger.error(message, &err);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogLevel;
    use crate::prompt::Category;

    fn client() -> (PromptsClient, Arc<MemoryBackend>, Arc<crate::logger::MemorySink>) {
        let backend = Arc::new(MemoryBackend::new());
        let (logger, sink) = Logger::memory();
        (PromptsClient::new(backend.clone(), logger), backend, sink)
    }

    #[tokio::test]
    async fn test_create_logs_before_and_after() {
        let (client, _, sink) = client();
        let prompt = client
            .create(PromptInput::new("Refactor", "Make it smaller"))
            .await
            .unwrap();

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "Creating new prompt");
        assert_eq!(entries[0].payload, Some(json!({ "title": "Refactor" })));
        assert_eq!(entries[1].payload, Some(json!({ "id": prompt.id })));
    }

    #[tokio::test]
    async fn test_get_all_newest_first() {
        let (client, _, _) = client();
        client.create(PromptInput::new("first", "")).await.unwrap();
        client.create(PromptInput::new("second", "")).await.unwrap();

        let titles: Vec<_> = client
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_store_error() {
        let (client, _, sink) = client();
        let err = client
            .update("missing", PromptInput::new("t", "c"))
            .await
            .unwrap_err();

        assert!(matches!(err, PromptError::Store(BackendError::NotFound(_))));
        let last = sink.entries().pop().unwrap();
        assert_eq!(last.level, LogLevel::Error);
        assert_eq!(last.message, "Failed to update prompt");
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let (client, _, _) = client();
        let created = client.create(PromptInput::new("t", "c")).await.unwrap();
        let updated = client
            .update(
                &created.id,
                PromptInput::new("t2", "c2")
                    .with_category(Category::Code)
                    .with_tags(["rust"]),
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.category, Category::Code);
        assert!(updated.tags.contains("rust"));
    }

    #[tokio::test]
    async fn test_delete_failure_is_surfaced() {
        let (client, backend, _) = client();
        let created = client.create(PromptInput::new("t", "c")).await.unwrap();
        backend.fail_next(BackendError::Unavailable("offline".into())).await;

        assert!(client.delete(&created.id).await.is_err());
        assert!(client.delete(&created.id).await.is_ok());
        assert!(client.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title_without_calling_store() {
        let (client, backend, sink) = client();
        let err = client.create(PromptInput::new("", "c")).await.unwrap_err();

        assert_eq!(err.category(), "validation");
        assert_eq!(backend.len().await, 0);
        assert!(sink.entries().is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_tags_case_insensitively() {
        let (client, _, _) = client();
        client
            .create(PromptInput::new("Review", "check diff").with_tags(["Python"]))
            .await
            .unwrap();
        client.create(PromptInput::new("Poem", "roses")).await.unwrap();

        let hits = client.search("python").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Review");
    }
}
