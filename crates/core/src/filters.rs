//! Filter state kept in step with the URL query string
//!
//! Parameters:
//! - `category`: selected category, absent for all categories
//! - `tags`: selected tags, comma-joined. Written, never read back.
//! - `tag`: a single tag from a deep link. Read, never written.
//! - `showFilters`: `true` when the filter panel is open
//!
//! User actions change the state and the query is re-serialized from it.
//! Navigation replaces the query and merges it into the state without ever
//! dropping a selected tag. Unknown or malformed parameters are ignored.

use serde::Serialize;
use url::form_urlencoded;

use crate::prompt::{Category, Prompt};

pub const PARAM_CATEGORY: &str = "category";
pub const PARAM_TAGS: &str = "tags";
pub const PARAM_TAG: &str = "tag";
pub const PARAM_SHOW_FILTERS: &str = "showFilters";

/// Ordered query pairs, edited like `URLSearchParams`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct QueryPairs(Vec<(String, String)>);

impl QueryPairs {
    /// Accepts `a=1`, `?a=1` or a path like `/prompts?a=1`
    fn parse(query: &str) -> Self {
        let query = if query.starts_with('/') {
            query.split_once('?').map_or("", |(_, q)| q)
        } else {
            query.trim_start_matches('?')
        };
        Self(form_urlencoded::parse(query.as_bytes()).into_owned().collect())
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Non-blank value of `key`
    fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Replace the first `key` in place (dropping later duplicates) or append
    fn set(&mut self, key: &str, value: String) {
        match self.0.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.0[first].1 = value;
                let mut index = 0;
                self.0.retain(|(k, _)| {
                    let keep = k != key || index == first;
                    index += 1;
                    keep
                });
            },
            None => self.0.push((key.to_string(), value)),
        }
    }

    fn delete(&mut self, key: &str) {
        self.0.retain(|(k, _)| k != key);
    }

    fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub category:     Option<String>,
    pub tags:         Vec<String>,
    pub filters_open: bool,
}

impl FilterState {
    /// State for a freshly loaded page
    pub fn from_query(query: &str) -> Self {
        let pairs = QueryPairs::parse(query);
        Self {
            category:     pairs.value(PARAM_CATEGORY).map(str::to_string),
            tags:         pairs.value(PARAM_TAG).map(|t| vec![t.to_string()]).unwrap_or_default(),
            filters_open: pairs.get(PARAM_SHOW_FILTERS) == Some("true"),
        }
    }

    /// Merge parameters from a navigation. Sets the category only when the
    /// parameter is present, adds the deep-link tag if missing, and only
    /// ever opens the panel.
    pub fn merge_query(&mut self, query: &str) {
        let pairs = QueryPairs::parse(query);
        if let Some(category) = pairs.value(PARAM_CATEGORY) {
            self.category = Some(category.to_string());
        }
        if let Some(tag) = pairs.value(PARAM_TAG) {
            self.add_tag(tag);
        }
        if pairs.get(PARAM_SHOW_FILTERS) == Some("true") {
            self.filters_open = true;
        }
    }

    /// Re-serialize into `existing`, keeping unrelated parameters. Defaults
    /// are written as absent parameters.
    pub fn write_query(&self, existing: &str) -> String {
        let mut pairs = QueryPairs::parse(existing);

        match &self.category {
            Some(category) => pairs.set(PARAM_CATEGORY, category.clone()),
            None => pairs.delete(PARAM_CATEGORY),
        }
        if self.tags.is_empty() {
            pairs.delete(PARAM_TAGS);
        } else {
            pairs.set(PARAM_TAGS, self.tags.join(","));
        }
        if self.filters_open {
            pairs.set(PARAM_SHOW_FILTERS, "true".to_string());
        } else {
            pairs.delete(PARAM_SHOW_FILTERS);
        }

        pairs.encode()
    }

    /// Choosing a category drops the tag selection, which may no longer apply
    pub fn select_category(&mut self, category: Option<String>) {
        self.category = category.filter(|c| !c.trim().is_empty());
        self.tags.clear();
    }

    pub fn set_tags<S: AsRef<str>>(&mut self, tags: impl IntoIterator<Item = S>) {
        self.tags.clear();
        for tag in tags {
            self.add_tag(tag.as_ref());
        }
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        if self.tags.iter().any(|t| t == tag) {
            self.tags.retain(|t| t != tag);
        } else {
            self.add_tag(tag);
        }
    }

    pub fn clear_tags(&mut self) {
        self.tags.clear();
    }

    pub fn toggle_filters(&mut self) {
        self.filters_open = !self.filters_open;
    }

    pub fn is_filtering(&self) -> bool {
        self.category.is_some() || !self.tags.is_empty()
    }

    pub fn matches(&self, prompt: &Prompt) -> bool {
        let category_match = self
            .category
            .as_deref()
            .map_or(true, |c| prompt.category.as_str() == c);
        category_match && prompt.tags.contains_all(&self.tags)
    }

    /// Derived view over `prompts`, recomputed on every call
    pub fn view<'a>(&self, prompts: &'a [Prompt]) -> PromptView<'a> {
        PromptView {
            categories:     categories(prompts),
            all_tags:       all_tags(prompts),
            available_tags: available_tags(prompts, self.category.as_deref()),
            prompts:        filter(prompts, self),
            filtering:      self.is_filtering(),
        }
    }

    fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }
}

/// Filter state plus the query string it is mirrored into
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSync {
    state: FilterState,
    query: String,
}

impl FilterSync {
    /// Initialise from the page URL, then mirror the state back into it
    pub fn mount(query: &str) -> Self {
        let state = FilterState::from_query(query);
        let query = state.write_query(query);
        Self { state, query }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Apply a user action, then re-serialize
    pub fn update(&mut self, action: impl FnOnce(&mut FilterState)) -> &str {
        action(&mut self.state);
        self.query = self.state.write_query(&self.query);
        &self.query
    }

    /// The URL changed underneath us (back/forward, deep link)
    pub fn navigate(&mut self, query: &str) -> &str {
        self.state.merge_query(query);
        self.query = self.state.write_query(query);
        &self.query
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptView<'a> {
    pub categories:     Vec<Category>,
    pub all_tags:       Vec<String>,
    /// Tag choices for the selected category
    pub available_tags: Vec<String>,
    pub prompts:        Vec<&'a Prompt>,
    filtering:          bool,
}

impl PromptView<'_> {
    pub fn empty_message(&self) -> Option<&'static str> {
        if !self.prompts.is_empty() {
            return None;
        }
        Some(if self.filtering {
            "No prompts found with the selected filters"
        } else {
            "No prompts found. Create your first one!"
        })
    }
}

/// Distinct categories, first-seen order
pub fn categories(prompts: &[Prompt]) -> Vec<Category> {
    let mut seen = Vec::new();
    for prompt in prompts {
        if !seen.contains(&prompt.category) {
            seen.push(prompt.category);
        }
    }
    seen
}

fn distinct_tags<'a>(prompts: impl Iterator<Item = &'a Prompt>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for tag in prompts.flat_map(|p| p.tags.iter()) {
        if !seen.iter().any(|t| t == tag) {
            seen.push(tag.to_string());
        }
    }
    seen
}

/// Distinct tags across all prompts, first-seen order
pub fn all_tags(prompts: &[Prompt]) -> Vec<String> {
    distinct_tags(prompts.iter())
}

/// Tags offered for `category`, or every tag when none is selected
pub fn available_tags(prompts: &[Prompt], category: Option<&str>) -> Vec<String> {
    match category {
        Some(category) => distinct_tags(prompts.iter().filter(|p| p.category.as_str() == category)),
        None => all_tags(prompts),
    }
}

/// Category match AND every selected tag present
pub fn filter<'a>(prompts: &'a [Prompt], state: &FilterState) -> Vec<&'a Prompt> {
    prompts.iter().filter(|p| state.matches(p)).collect()
}

/// Deep link opening the list filtered to `category`
pub fn category_link(category: &str) -> String {
    link(PARAM_CATEGORY, category)
}

/// Deep link opening the list filtered to one tag
pub fn tag_link(tag: &str) -> String {
    link(PARAM_TAG, tag)
}

fn link(key: &str, value: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .append_pair(PARAM_SHOW_FILTERS, "true")
        .finish();
    format!("/prompts?{}", query)
}
