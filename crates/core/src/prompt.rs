//! Prompt records and their field types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{PromptError, Result};

/// Fixed set of prompt categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[default]
    General,
    Code,
    Writing,
    Creative,
    Business,
    Academic,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Code,
        Category::Writing,
        Category::Creative,
        Category::Business,
        Category::Academic,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Code => "Code",
            Category::Writing => "Writing",
            Category::Creative => "Creative",
            Category::Business => "Business",
            Category::Academic => "Academic",
            Category::Other => "Other",
        }
    }

    /// Lenient parse: blank is `General`, anything unrecognised is `Other`
    pub fn parse_lenient(value: &str) -> Category {
        let value = value.trim();
        if value.is_empty() {
            return Category::General;
        }
        value.parse().unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PromptError::Validation(format!("unknown category '{}'", s)))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Blank or null means the default; legacy data goes through `parse_lenient`
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => raw.parse().map_err(serde::de::Error::custom),
            _ => Ok(Category::default()),
        }
    }
}

/// Insertion-ordered, deduplicated tag set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag, ignoring blanks and duplicates. Returns whether it was added.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Superset test: every `wanted` tag is present
    pub fn contains_all<S: AsRef<str>>(&self, wanted: &[S]) -> bool {
        wanted.iter().all(|w| self.contains(w.as_ref()))
    }

    /// Split comma-separated input (`"rust, cli,,rust"` -> `[rust, cli]`)
    pub fn parse_input(input: &str) -> Tags {
        input.split(',').collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for tag in iter {
            tags.insert(tag.as_ref());
        }
        tags
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<String>),
            Joined(String),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::List(list)) => list.into_iter().collect(),
            Some(Raw::Joined(joined)) => Tags::parse_input(&joined),
            None => Tags::new(),
        })
    }
}

/// A stored prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id:         String,
    pub title:      String,
    pub content:    String,
    #[serde(default)]
    pub category:   Category,
    #[serde(default)]
    pub tags:       Tags,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller on create/update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptInput {
    pub title:    String,
    #[serde(default)]
    pub content:  String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub tags:     Tags,
}

impl PromptInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title:    title.into(),
            content:  content.into(),
            category: Category::default(),
            tags:     Tags::new(),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_tags<S: AsRef<str>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(PromptError::Validation("title must not be empty".into()));
        }
        Ok(())
    }
}

impl From<&Prompt> for PromptInput {
    fn from(prompt: &Prompt) -> Self {
        Self {
            title:    prompt.title.clone(),
            content:  prompt.content.clone(),
            category: prompt.category,
            tags:     prompt.tags.clone(),
        }
    }
}
