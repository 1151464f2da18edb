//! promptdeck: a prompt library with a legacy-data migration path
//!
//! Prompts (title, content, category, tags) live in a pluggable record
//! store. On startup any prompts left in the old single-file JSON storage
//! are copied into the store, with progress published to watchers.
//! The list view's category/tag filters round-trip through the URL query.
//!
//! ## Architecture
//!
//! - **store**: `PromptBackend` trait with SQLite, HTTP and in-memory backends,
//!   wrapped by the logging `PromptsClient`
//! - **migration**: legacy detection and the pending/migrating/success/error job
//! - **filters**: URL query <-> filter state synchronization
//! - **commands**: `"category.action"` registry shared by the HTTP surface
//! - **server**: axum routes over the command registry

// Module declarations
pub mod app;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod errors;
pub mod filters;
pub mod legacy;
pub mod logger;
pub mod migration;
pub mod prompt;
pub mod runtime;
pub mod search;
pub mod server;
pub mod store;
