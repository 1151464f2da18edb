//! Runtime configuration
//!
//! Read from the process environment (after loading `.env`):
//!
//! | variable                          | default                              |
//! |-----------------------------------|--------------------------------------|
//! | `PROMPTDECK_BACKEND`              | `sqlite` (`sqlite`, `http`, `memory`) |
//! | `PROMPTDECK_DATABASE_PATH`        | `<data dir>/promptdeck/prompts.db`   |
//! | `PROMPTDECK_REMOTE_URL`           | required when the backend is `http`  |
//! | `PROMPTDECK_LEGACY_PATH`          | `~/.prompt_storage/prompts.json`     |
//! | `PROMPTDECK_BIND`                 | `127.0.0.1:5000`                     |
//! | `PROMPTDECK_COMPLETION_DELAY_MS`  | `1500`                               |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{PromptError, Result};
use crate::legacy::FileSlot;
use crate::migration::DEFAULT_COMPLETION_DELAY;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Sqlite { path: PathBuf },
    Http { url: String },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend:          BackendConfig,
    pub legacy_path:      PathBuf,
    pub bind:             SocketAddr,
    pub completion_delay: Duration,
}

impl Config {
    /// Load `.env` if present, then read the environment
    pub fn from_env() -> Result<Self> {
        // A missing .env is normal
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match get("PROMPTDECK_BACKEND").as_deref().unwrap_or("sqlite") {
            "sqlite" => BackendConfig::Sqlite {
                path: match get("PROMPTDECK_DATABASE_PATH") {
                    Some(path) => PathBuf::from(path),
                    None => default_database_path()?,
                },
            },
            "http" => BackendConfig::Http {
                url: get("PROMPTDECK_REMOTE_URL").ok_or_else(|| {
                    PromptError::Config(
                        "PROMPTDECK_REMOTE_URL is required when PROMPTDECK_BACKEND=http".into(),
                    )
                })?,
            },
            "memory" => BackendConfig::Memory,
            other => {
                return Err(PromptError::Config(format!(
                    "unknown PROMPTDECK_BACKEND '{}' (expected sqlite, http or memory)",
                    other
                )))
            },
        };

        let legacy_path = match get("PROMPTDECK_LEGACY_PATH") {
            Some(path) => PathBuf::from(path),
            None => FileSlot::default_path()?,
        };

        let bind = parse_var("PROMPTDECK_BIND", get("PROMPTDECK_BIND"), DEFAULT_BIND)?;

        let completion_delay = match get("PROMPTDECK_COMPLETION_DELAY_MS") {
            Some(ms) => Duration::from_millis(parse_var(
                "PROMPTDECK_COMPLETION_DELAY_MS",
                Some(ms),
                "0",
            )?),
            None => DEFAULT_COMPLETION_DELAY,
        };

        Ok(Self {
            backend,
            legacy_path,
            bind,
            completion_delay,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, value: Option<String>, default: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw = value.unwrap_or_else(|| default.to_string());
    raw.parse()
        .map_err(|e| PromptError::Config(format!("invalid {} '{}': {}", name, raw, e)))
}

fn default_database_path() -> Result<PathBuf> {
    let data = dirs::data_dir()
        .ok_or_else(|| PromptError::Config("Could not determine data directory".into()))?;
    Ok(data.join("promptdeck").join("prompts.db"))
}
