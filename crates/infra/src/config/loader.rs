//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. Only if the webhook address is not set there, falls back to a file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `BOARDSYNC_GOOGLE_WEBHOOK_URL` (required): public push address
//! - `BOARDSYNC_GOOGLE_API_BASE_URL`: calendar API base
//! - `BOARDSYNC_GOOGLE_EVENT_TIME_ZONE`, `BOARDSYNC_GOOGLE_EVENT_UTC_OFFSET`:
//!   zone for events created from board items
//! - `BOARDSYNC_MONDAY_API_URL`: board GraphQL endpoint
//! - `BOARDSYNC_ALLOW_LOCAL_TOKEN_FALLBACK`: honour the local token (true/false)
//! - `BOARDSYNC_LOCAL_ACCESS_TOKEN`: local development board token
//! - `BOARDSYNC_RETRY_MAX_ATTEMPTS`, `BOARDSYNC_RETRY_BASE_DELAY_MS`
//! - `BOARDSYNC_BATCH_CONCURRENCY`, `BOARDSYNC_BATCH_INTER_CHUNK_DELAY_MS`,
//!   `BOARDSYNC_BATCH_STOP_ON_ERROR`
//! - `BOARDSYNC_SQLITE_PATH`, `BOARDSYNC_SQLITE_POOL_SIZE`
//! - `BOARDSYNC_TOKEN_CACHE_TTL_SECS`
//! - `BOARDSYNC_LOG_LEVEL`, `BOARDSYNC_LOG_JSON`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` or `./boardsync.{json,toml}` (current working
//!    directory)
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use boardsync_domain::{AppConfig, BoardSyncError, Result};

const WEBHOOK_URL_VAR: &str = "BOARDSYNC_GOOGLE_WEBHOOK_URL";

/// Load configuration with automatic fallback strategy
///
/// The environment wins whenever the webhook address is set there; a
/// malformed variable is then an error, not a reason to read a file.
///
/// # Errors
/// Returns `BoardSyncError::Config` if configuration cannot be loaded from
/// either source or is malformed.
pub fn load() -> Result<AppConfig> {
    if env_opt(WEBHOOK_URL_VAR).is_none() {
        tracing::debug!("{WEBHOOK_URL_VAR} not set, loading configuration from file");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// Only the webhook address is required; every other value falls back to
/// its default.
///
/// # Errors
/// Returns `BoardSyncError::Config` if the webhook address is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<AppConfig> {
    let mut config = AppConfig::with_webhook_url(env_var(WEBHOOK_URL_VAR)?);

    if let Some(url) = env_opt("BOARDSYNC_GOOGLE_API_BASE_URL") {
        config.google.api_base_url = url;
    }
    if let Some(zone) = env_opt("BOARDSYNC_GOOGLE_EVENT_TIME_ZONE") {
        config.google.event_time_zone = zone;
    }
    if let Some(offset) = env_opt("BOARDSYNC_GOOGLE_EVENT_UTC_OFFSET") {
        config.google.event_utc_offset = offset;
    }
    if let Some(url) = env_opt("BOARDSYNC_MONDAY_API_URL") {
        config.monday.api_url = url;
    }
    config.monday.allow_local_token_fallback =
        env_bool("BOARDSYNC_ALLOW_LOCAL_TOKEN_FALLBACK", false);
    config.monday.local_access_token = env_opt("BOARDSYNC_LOCAL_ACCESS_TOKEN");

    if let Some(attempts) = env_parse("BOARDSYNC_RETRY_MAX_ATTEMPTS", "retry attempts")? {
        config.retry.max_attempts = attempts;
    }
    if let Some(delay) = env_parse("BOARDSYNC_RETRY_BASE_DELAY_MS", "retry base delay")? {
        config.retry.base_delay_ms = delay;
    }

    if let Some(concurrency) = env_parse("BOARDSYNC_BATCH_CONCURRENCY", "batch concurrency")? {
        config.batch.concurrency = concurrency;
    }
    if let Some(delay) = env_parse("BOARDSYNC_BATCH_INTER_CHUNK_DELAY_MS", "inter-chunk delay")? {
        config.batch.inter_chunk_delay_ms = delay;
    }
    config.batch.stop_on_error = env_bool("BOARDSYNC_BATCH_STOP_ON_ERROR", false);

    config.storage.sqlite_path = env_opt("BOARDSYNC_SQLITE_PATH");
    if let Some(pool_size) = env_parse("BOARDSYNC_SQLITE_POOL_SIZE", "pool size")? {
        config.storage.pool_size = pool_size;
    }

    if let Some(ttl) = env_parse("BOARDSYNC_TOKEN_CACHE_TTL_SECS", "token cache TTL")? {
        config.auth.token_cache_ttl_secs = ttl;
    }

    if let Some(level) = env_opt("BOARDSYNC_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("BOARDSYNC_LOG_JSON", false);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `BoardSyncError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(BoardSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            BoardSyncError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| BoardSyncError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Format is detected by file extension; anything unnamed is read as JSON.
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| BoardSyncError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| BoardSyncError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(BoardSyncError::Config(format!("Unsupported config format: {}", extension))),
    }
}

const CONFIG_FILE_NAMES: [&str; 4] =
    ["config.json", "config.toml", "boardsync.json", "boardsync.toml"];

/// Probe multiple paths for configuration files
///
/// Returns the first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| {
            let here = CONFIG_FILE_NAMES.iter().map(move |name| root.join(name));
            let above = ["..", "../.."].into_iter().flat_map(move |up| {
                ["config.json", "config.toml"].into_iter().map(move |name| root.join(up).join(name))
            });
            here.chain(above)
        })
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        BoardSyncError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Set and non-blank.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| BoardSyncError::Config(format!("Invalid {what} in {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
