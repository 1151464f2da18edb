//! Application context shared by commands and the HTTP surface

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use serde_json::json;
use tokio::sync::{watch, Mutex, MutexGuard};

use crate::config::{BackendConfig, Config};
use crate::db::SqliteBackend;
use crate::errors::{PromptError, Result};
use crate::legacy::{FileSlot, LegacySlot};
use crate::logger::Logger;
use crate::migration::{Detection, MigrationJob, MigrationReport, MigrationSnapshot};
use crate::store::{HttpBackend, MemoryBackend, PromptBackend, PromptsClient};

pub struct App {
    prompts:      PromptsClient,
    logger:       Logger,
    migration:    Mutex<Option<MigrationJob>>,
    migration_rx: StdMutex<Option<watch::Receiver<MigrationSnapshot>>>,
}

impl App {
    pub fn new(backend: Arc<dyn PromptBackend>, logger: Logger) -> Self {
        Self {
            prompts: PromptsClient::new(backend, logger.clone()),
            logger,
            migration: Mutex::new(None),
            migration_rx: StdMutex::new(None),
        }
    }

    /// Build the configured backend and look for legacy prompts
    pub async fn from_config(config: &Config, logger: Logger) -> Result<Self> {
        let backend: Arc<dyn PromptBackend> = match &config.backend {
            BackendConfig::Sqlite { path } => {
                logger.info(
                    "Opening SQLite prompt store",
                    Some(json!({ "path": path.display().to_string() })),
                );
                Arc::new(SqliteBackend::open(path).await?)
            },
            BackendConfig::Http { url } => {
                logger.info("Using remote prompt store", Some(json!({ "url": url })));
                Arc::new(HttpBackend::new(url)?)
            },
            BackendConfig::Memory => {
                logger.warn("Using in-memory prompt store; nothing will persist", None);
                Arc::new(MemoryBackend::new())
            },
        };

        let slot = Arc::new(FileSlot::new(&config.legacy_path));
        App::new(backend, logger).with_legacy(slot, config.completion_delay)
    }

    /// Attach a pending migration if `slot` holds legacy prompts
    pub fn with_legacy(mut self, slot: Arc<dyn LegacySlot>, completion_delay: Duration) -> Result<Self> {
        if let Detection::Pending(job) = MigrationJob::detect(slot, self.logger.clone())? {
            let job = job.with_completion_delay(completion_delay);
            self.migration_rx = StdMutex::new(Some(job.subscribe()));
            self.migration = Mutex::new(Some(job));
        }
        Ok(self)
    }

    pub fn prompts(&self) -> &PromptsClient {
        &self.prompts
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Latest migration state; `None` when there was nothing to migrate or
    /// the dialog was closed
    pub fn migration_snapshot(&self) -> Option<MigrationSnapshot> {
        let rx = self.migration_rx.lock().ok()?;
        let snapshot = rx.as_ref().map(|rx| rx.borrow().clone());
        snapshot
    }

    /// The job lock, refused rather than awaited while a run holds it
    fn lock_job(&self, action: &str) -> Result<MutexGuard<'_, Option<MigrationJob>>> {
        self.migration.try_lock().map_err(|_| {
            PromptError::migration(format!("Migration cannot {} while Migrating", action), None)
        })
    }

    /// Run (or retry) the pending migration.
    ///
    /// A successful job is discarded here; its completion callback fires in
    /// the background after the completion delay.
    pub async fn run_migration(&self) -> Result<MigrationReport> {
        let mut pending = self.lock_job("start")?;
        let job = pending
            .as_mut()
            .ok_or_else(|| PromptError::migration("No migration pending", None))?;
        let report = job.run(&self.prompts).await?;

        if let Some(job) = pending.take() {
            let logger = self.logger.clone();
            tokio::spawn(async move {
                let done = logger.clone();
                if let Err(e) = job
                    .complete(move || {
                        done.info(
                            "Migration finished, prompts will be reloaded from the store",
                            None,
                        )
                    })
                    .await
                {
                    logger.error("Migration completion failed", &e);
                }
            });
        }
        Ok(report)
    }

    /// Close the migration dialog, discarding the job and its state
    pub async fn close_migration(&self) -> Result<()> {
        let mut pending = self.lock_job("be closed")?;
        let job = pending
            .as_mut()
            .ok_or_else(|| PromptError::migration("No migration pending", None))?;
        job.close()?;
        pending.take();
        if let Ok(mut rx) = self.migration_rx.lock() {
            rx.take();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BackendError;
    use crate::legacy::MemorySlot;
    use crate::migration::MigrationStatus;
    use crate::prompt::{Prompt, PromptInput};
    use tokio::sync::Notify;

    fn app(raw: Option<&str>) -> (App, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let slot = Arc::new(raw.map(MemorySlot::new).unwrap_or_default());
        let app = App::new(backend.clone(), Logger::memory().0)
            .with_legacy(slot, Duration::from_millis(1))
            .unwrap();
        (app, backend)
    }

    #[tokio::test]
    async fn test_nothing_to_migrate() {
        let (app, _) = app(None);
        assert!(app.migration_snapshot().is_none());
        assert!(app.run_migration().await.is_err());
    }

    #[tokio::test]
    async fn test_run_discards_finished_job() {
        let (app, backend) = app(Some(r#"[{"title":"A","content":"c"}]"#));
        assert_eq!(
            app.migration_snapshot().unwrap().status,
            MigrationStatus::Pending
        );

        let report = app.run_migration().await.unwrap();
        assert_eq!(report.migrated, 1);
        assert_eq!(backend.len().await, 1);
        assert_eq!(
            app.migration_snapshot().unwrap().status,
            MigrationStatus::Success
        );
        assert!(app.run_migration().await.is_err());
    }

    #[tokio::test]
    async fn test_close_pending() {
        let (app, backend) = app(Some(r#"[{"title":"A","content":"c"}]"#));
        app.close_migration().await.unwrap();
        assert!(app.migration_snapshot().is_none());
        assert!(app.run_migration().await.is_err());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_close_after_error_clears_status() {
        let (app, backend) = app(Some(r#"[{"title":"A","content":"c"}]"#));
        backend.fail_inserts_after(0).await;
        assert!(app.run_migration().await.is_err());
        assert_eq!(
            app.migration_snapshot().unwrap().status,
            MigrationStatus::Error
        );

        app.close_migration().await.unwrap();
        assert!(app.migration_snapshot().is_none());
    }

    /// Holds every insert until released
    #[derive(Default)]
    struct GatedBackend {
        inner:   MemoryBackend,
        entered: Notify,
        release: Notify,
    }

    #[async_trait::async_trait]
    impl PromptBackend for GatedBackend {
        async fn list(&self) -> std::result::Result<Vec<Prompt>, BackendError> {
            self.inner.list().await
        }

        async fn insert(&self, input: &PromptInput) -> std::result::Result<Prompt, BackendError> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.insert(input).await
        }

        async fn update(
            &self,
            id: &str,
            input: &PromptInput,
        ) -> std::result::Result<Prompt, BackendError> {
            self.inner.update(id, input).await
        }

        async fn delete(&self, id: &str) -> std::result::Result<(), BackendError> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn test_close_and_rerun_refused_while_migrating() {
        let backend = Arc::new(GatedBackend::default());
        let app = Arc::new(
            App::new(backend.clone(), Logger::memory().0)
                .with_legacy(
                    Arc::new(MemorySlot::new(r#"[{"title":"A","content":"c"}]"#)),
                    Duration::ZERO,
                )
                .unwrap(),
        );

        let runner = tokio::spawn({
            let app = app.clone();
            async move { app.run_migration().await }
        });
        backend.entered.notified().await;
        assert_eq!(
            app.migration_snapshot().unwrap().status,
            MigrationStatus::Migrating
        );

        let err = app.close_migration().await.unwrap_err();
        assert_eq!(err.category(), "migration");
        assert!(err.to_string().contains("while Migrating"));
        assert!(app.run_migration().await.is_err());

        backend.release.notify_one();
        let report = runner.await.unwrap().unwrap();
        assert_eq!(report.migrated, 1);
        assert_eq!(
            app.migration_snapshot().unwrap().status,
            MigrationStatus::Success
        );
    }
}
