//! Command registry and dispatch system
//!
//! Commands are registered as "category.action" (e.g., "prompts.list",
//! "migration.run") and dispatched to async handler functions that take and
//! return JSON. The HTTP surface in [`crate::server`] is a thin mapping onto
//! these commands.
//!
//! ## Adding a new command
//!
//! 1. Create handler function: `pub fn my_command(app: &App, args: Value) -> BoxFuture<'_, Result<Value>>`
//! 2. Register in `REGISTRY`: `("category.action", my_command as CommandHandler)`
//! 3. Add tests for the command

use futures_util::future::BoxFuture;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use crate::app::App;
use crate::errors::{PromptError, Result};

pub mod dashboard;
pub mod migration;
pub mod prompts;

/// Type alias for command handler functions
///
/// All command handlers take the app context and JSON arguments and
/// resolve to a JSON result
pub type CommandHandler = for<'a> fn(&'a App, Value) -> BoxFuture<'a, Result<Value>>;

/// Static command registry
///
/// Maps command names to handler functions. Initialized lazily on first access.
static REGISTRY: Lazy<HashMap<&'static str, CommandHandler>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // Test command
    map.insert("ping", ping as CommandHandler);

    // Prompts
    map.insert("prompts.list", prompts::list as CommandHandler);
    map.insert("prompts.create", prompts::create as CommandHandler);
    map.insert("prompts.update", prompts::update as CommandHandler);
    map.insert("prompts.delete", prompts::delete as CommandHandler);
    map.insert("prompts.search", prompts::search as CommandHandler);
    map.insert("prompts.view", prompts::view as CommandHandler);

    // Dashboard
    map.insert("dashboard.stats", dashboard::stats as CommandHandler);

    // Migration
    map.insert("migration.status", migration::status as CommandHandler);
    map.insert("migration.run", migration::run as CommandHandler);
    map.insert("migration.close", migration::close as CommandHandler);

    map
});

/// Dispatch a command by name
///
/// # Arguments
/// * `app` - Application context
/// * `command` - Command name (e.g., "ping", "prompts.list")
/// * `args` - Command arguments as JSON Value
///
/// # Returns
/// Command result as JSON Value, or error if command not found
pub async fn dispatch(app: &App, command: &str, args: Value) -> Result<Value> {
    match REGISTRY.get(command) {
        Some(handler) => handler(app, args).await,
        None => Err(PromptError::CommandNotFound(command.to_string())),
    }
}

/// List all available commands
///
/// Returns a sorted list of all registered command names.
pub fn list_commands() -> Vec<String> {
    let mut commands: Vec<String> = REGISTRY.keys().map(|&k| k.to_string()).collect();
    commands.sort();
    commands
}

/// Deserialize `args` into `T`, reporting failures against `command`
pub(crate) fn parse_args<T: DeserializeOwned>(command: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| PromptError::InvalidArgs {
        command: command.to_string(),
        reason:  e.to_string(),
    })
}

/// Required non-empty string argument
pub(crate) fn required_str(command: &str, args: &Value, key: &str) -> Result<String> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| PromptError::InvalidArgs {
            command: command.to_string(),
            reason:  format!("missing '{}'", key),
        })
}

// ============================================================================
// Test Commands
// ============================================================================

/// Ping command - simple test to verify command dispatch works
///
/// Returns the input arguments with an added "pong" field.
///
/// # Example
/// ```json
/// // Input:  {"message": "hello"}
/// // Output: {"message": "hello", "pong": true}
/// ```
fn ping(_app: &App, args: Value) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let mut result = match args {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        result.insert("pong".to_string(), Value::Bool(true));
        Ok(Value::Object(result))
    })
}
