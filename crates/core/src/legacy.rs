//! Legacy local prompt collection
//!
//! Before the record store existed, prompts lived in a single named slot
//! holding a JSON array. The slot is read whole and removed whole; its
//! entries are never edited in place.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Deserialize;

use crate::errors::{PromptError, Result};
use crate::prompt::{Category, PromptInput, Tags};

/// Storage holding the serialized legacy collection
pub trait LegacySlot: Send + Sync {
    /// Raw slot contents, `None` when the slot does not exist
    fn read(&self) -> Result<Option<String>>;

    /// Remove the whole slot
    fn clear(&self) -> Result<()>;
}

/// Slot stored as a JSON file
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.prompt_storage/prompts.json`
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PromptError::Config("Could not determine home directory".into()))?;
        Ok(home.join(".prompt_storage").join("prompts.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LegacySlot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process slot
#[derive(Debug, Default)]
pub struct MemorySlot {
    raw: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_present(&self) -> bool {
        self.read().map(|raw| raw.is_some()).unwrap_or(false)
    }
}

impl LegacySlot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        self.raw
            .lock()
            .map(|raw| raw.clone())
            .map_err(|_| PromptError::Other("legacy slot lock poisoned".into()))
    }

    fn clear(&self) -> Result<()> {
        let mut raw = self
            .raw
            .lock()
            .map_err(|_| PromptError::Other("legacy slot lock poisoned".into()))?;
        *raw = None;
        Ok(())
    }
}

/// One entry of the legacy collection; other fields (ids, timestamps) are ignored
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegacyPrompt {
    pub title:    String,
    #[serde(default)]
    pub content:  String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags:     Option<Tags>,
}

impl LegacyPrompt {
    /// Title and content verbatim; blank category becomes `General`, missing tags empty
    pub fn into_input(self) -> PromptInput {
        PromptInput {
            title:    self.title,
            content:  self.content,
            category: self
                .category
                .as_deref()
                .map(Category::parse_lenient)
                .unwrap_or_default(),
            tags:     self.tags.unwrap_or_default(),
        }
    }
}

pub fn decode(raw: &str) -> Result<Vec<LegacyPrompt>> {
    serde_json::from_str(raw).map_err(|e| PromptError::Decode(e.to_string()))
}

/// Whether the slot holds something worth migrating.
///
/// An absent, blank or `[]` slot is nothing. Anything else counts, even if
/// it later fails to decode.
pub fn has_pending(slot: &dyn LegacySlot) -> Result<bool> {
    let Some(raw) = slot.read()? else {
        return Ok(false);
    };
    if raw.trim().is_empty() {
        return Ok(false);
    }
    Ok(!matches!(
        serde_json::from_str::<Vec<serde_json::Value>>(&raw),
        Ok(entries) if entries.is_empty()
    ))
}
