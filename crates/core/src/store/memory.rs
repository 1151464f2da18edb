//! In-process prompt store with fault injection

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::PromptBackend;
use crate::errors::BackendError;
use crate::prompt::{Prompt, PromptInput};

#[derive(Debug, Default)]
struct State {
    /// Insertion order; listing walks it backwards
    records:           Vec<Prompt>,
    fail_next:         Option<BackendError>,
    inserts_remaining: Option<usize>,
}

impl State {
    fn take_fault(&mut self) -> Result<(), BackendError> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next operation of any kind with `err`
    pub async fn fail_next(&self, err: BackendError) {
        self.state.lock().await.fail_next = Some(err);
    }

    /// Allow `n` more inserts, then reject every insert
    pub async fn fail_inserts_after(&self, n: usize) {
        self.state.lock().await.inserts_remaining = Some(n);
    }

    pub async fn clear_faults(&self) {
        let mut state = self.state.lock().await;
        state.fail_next = None;
        state.inserts_remaining = None;
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PromptBackend for MemoryBackend {
    async fn list(&self) -> Result<Vec<Prompt>, BackendError> {
        let mut state = self.state.lock().await;
        state.take_fault()?;
        Ok(state.records.iter().rev().cloned().collect())
    }

    async fn insert(&self, input: &PromptInput) -> Result<Prompt, BackendError> {
        let mut state = self.state.lock().await;
        state.take_fault()?;
        if let Some(remaining) = state.inserts_remaining.as_mut() {
            if *remaining == 0 {
                return Err(BackendError::Unavailable("insert quota exhausted".into()));
            }
            *remaining -= 1;
        }

        let prompt = Prompt {
            id:         Uuid::new_v4().to_string(),
            title:      input.title.clone(),
            content:    input.content.clone(),
            category:   input.category,
            tags:       input.tags.clone(),
            created_at: Utc::now(),
        };
        state.records.push(prompt.clone());
        Ok(prompt)
    }

    async fn update(&self, id: &str, input: &PromptInput) -> Result<Prompt, BackendError> {
        let mut state = self.state.lock().await;
        state.take_fault()?;
        let record = state
            .records
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;

        record.title = input.title.clone();
        record.content = input.content.clone();
        record.category = input.category;
        record.tags = input.tags.clone();
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.take_fault()?;
        let before = state.records.len();
        state.records.retain(|p| p.id != id);
        if state.records.len() == before {
            return Err(BackendError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fail_inserts_after_allows_exact_count() {
        let backend = MemoryBackend::new();
        backend.fail_inserts_after(2).await;

        assert!(backend.insert(&PromptInput::new("a", "")).await.is_ok());
        assert!(backend.insert(&PromptInput::new("b", "")).await.is_ok());
        assert!(backend.insert(&PromptInput::new("c", "")).await.is_err());
        assert_eq!(backend.len().await, 2);

        backend.clear_faults().await;
        assert!(backend.insert(&PromptInput::new("c", "")).await.is_ok());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let backend = MemoryBackend::new();
        let a = backend.insert(&PromptInput::new("a", "")).await.unwrap();
        let b = backend.insert(&PromptInput::new("a", "")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let backend = MemoryBackend::new();
        assert_eq!(
            backend.delete("nope").await,
            Err(BackendError::NotFound("nope".into()))
        );
    }
}
