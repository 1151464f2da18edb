//! One-shot migration of the legacy collection into the record store
//!
//! ```text
//! Pending --run--> Migrating --ok--> Success --complete--> (discarded)
//!                      |
//!                      +--fail--> Error --run (retry)--> Migrating
//! ```
//!
//! Records are created strictly one at a time, in legacy order. A failure
//! aborts the loop; records already created stay in the store and the
//! legacy slot is left untouched, so a retry starts again from the first
//! record. Retries are at-least-once: a record created before the failure
//! is created again.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tokio::sync::watch;

use crate::errors::{PromptError, Result};
use crate::legacy::{self, LegacySlot};
use crate::logger::Logger;
use crate::store::PromptsClient;

/// Shown to the user on any migration failure; the cause is only logged
pub const MIGRATION_FAILED: &str = "Failed to migrate prompts. Please try again.";

pub const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    Pending,
    Migrating,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationProgress {
    pub current: usize,
    pub total:   usize,
}

impl MigrationProgress {
    /// Width of the progress bar; `None` while the total is unknown or zero
    pub fn percent(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.current as f64 / self.total as f64 * 100.0)
    }

    pub fn is_complete(&self) -> bool {
        self.current == self.total
    }
}

/// Observable state of a job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationSnapshot {
    pub status:   MigrationStatus,
    pub progress: MigrationProgress,
    pub error:    Option<String>,
}

impl MigrationSnapshot {
    fn pending() -> Self {
        Self {
            status:   MigrationStatus::Pending,
            progress: MigrationProgress::default(),
            error:    None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub migrated: usize,
    pub attempts: u32,
}

/// Outcome of looking for a legacy collection
#[derive(Debug)]
pub enum Detection {
    /// Nothing to migrate; treat as an immediate success without any dialog
    Nothing,
    Pending(MigrationJob),
}

pub struct MigrationJob {
    slot:             Arc<dyn LegacySlot>,
    logger:           Logger,
    completion_delay: Duration,
    attempts:         u32,
    closed:           bool,
    state:            watch::Sender<MigrationSnapshot>,
}

impl std::fmt::Debug for MigrationJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationJob")
            .field("snapshot", &*self.state.borrow())
            .field("attempts", &self.attempts)
            .field("closed", &self.closed)
            .finish()
    }
}

impl MigrationJob {
    /// Check the legacy slot and create a pending job if it holds anything
    pub fn detect(slot: Arc<dyn LegacySlot>, logger: Logger) -> Result<Detection> {
        if !legacy::has_pending(slot.as_ref())? {
            logger.info("No legacy prompts found, skipping migration", None);
            return Ok(Detection::Nothing);
        }

        logger.info("Legacy prompts found, migration pending", None);
        let (state, _) = watch::channel(MigrationSnapshot::pending());
        Ok(Detection::Pending(MigrationJob {
            slot,
            logger,
            completion_delay: DEFAULT_COMPLETION_DELAY,
            attempts: 0,
            closed: false,
            state,
        }))
    }

    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<MigrationSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> MigrationSnapshot {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> MigrationStatus {
        self.state.borrow().status
    }

    /// Close is offered while pending or failed, never mid-run
    pub fn can_close(&self) -> bool {
        matches!(
            self.status(),
            MigrationStatus::Pending | MigrationStatus::Error
        )
    }

    /// Abandon the job. Pending: no side effects. Error: partially
    /// migrated records stay in the store and the slot stays intact.
    pub fn close(&mut self) -> Result<()> {
        if !self.can_close() {
            return Err(PromptError::migration(
                format!("Migration cannot be closed while {:?}", self.status()),
                None,
            ));
        }
        self.closed = true;
        self.logger.info(
            "Migration dialog closed",
            Some(json!({ "status": self.status(), "attempts": self.attempts })),
        );
        Ok(())
    }

    /// Start, or retry after an error
    pub async fn run(&mut self, client: &PromptsClient) -> Result<MigrationReport> {
        if self.closed {
            return Err(PromptError::migration("Migration was closed", None));
        }
        match self.status() {
            MigrationStatus::Pending | MigrationStatus::Error => {},
            status => {
                return Err(PromptError::migration(
                    format!("Migration cannot start while {:?}", status),
                    None,
                ))
            },
        }

        self.attempts += 1;
        self.logger.info(
            "Starting migration",
            Some(json!({ "attempt": self.attempts })),
        );
        self.publish(MigrationStatus::Migrating, MigrationProgress::default(), None);

        match self.migrate(client).await {
            Ok(migrated) => {
                self.publish(
                    MigrationStatus::Success,
                    MigrationProgress {
                        current: migrated,
                        total:   migrated,
                    },
                    None,
                );
                self.logger.info(
                    "Migration completed",
                    Some(json!({ "migrated": migrated, "attempts": self.attempts })),
                );
                Ok(MigrationReport {
                    migrated,
                    attempts: self.attempts,
                })
            },
            Err(cause) => {
                self.logger.error("Migration failed", &cause);
                let progress = self.state.borrow().progress;
                self.publish(
                    MigrationStatus::Error,
                    progress,
                    Some(MIGRATION_FAILED.to_string()),
                );
                Err(PromptError::migration(MIGRATION_FAILED, Some(cause)))
            },
        }
    }

    /// After success, wait the completion delay then hand control back
    pub async fn complete<F: FnOnce()>(self, on_complete: F) -> Result<()> {
        if self.status() != MigrationStatus::Success {
            return Err(PromptError::migration(
                format!("Migration cannot complete while {:?}", self.status()),
                None,
            ));
        }
        tokio::time::sleep(self.completion_delay).await;
        on_complete();
        Ok(())
    }

    async fn migrate(&self, client: &PromptsClient) -> Result<usize> {
        let Some(raw) = self.slot.read()? else {
            return Ok(0);
        };
        let prompts = legacy::decode(&raw)?;
        let total = prompts.len();
        self.publish(
            MigrationStatus::Migrating,
            MigrationProgress { current: 0, total },
            None,
        );

        for (index, prompt) in prompts.into_iter().enumerate() {
            client.create(prompt.into_input()).await?;
            self.publish(
                MigrationStatus::Migrating,
                MigrationProgress {
                    current: index + 1,
                    total,
                },
                None,
            );
        }

        self.slot.clear()?;
        Ok(total)
    }

    fn publish(&self, status: MigrationStatus, progress: MigrationProgress, error: Option<String>) {
        self.state.send_replace(MigrationSnapshot {
            status,
            progress,
            error,
        });
    }
}
