//! Application configuration structures
//!
//! Every section carries serde defaults so partial config files only need to
//! name the values they override. The Google webhook URL has no sensible
//! default and must always be supplied.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BATCH_CONCURRENCY, DEFAULT_EVENT_TIME_ZONE, DEFAULT_EVENT_UTC_OFFSET,
    DEFAULT_GOOGLE_API_BASE_URL, DEFAULT_INTER_CHUNK_DELAY_MS, DEFAULT_MONDAY_API_URL,
    DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_TOKEN_CACHE_TTL_SECS,
};
use crate::types::link::EventZone;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub google: GoogleConfig,
    #[serde(default)]
    pub monday: MondayConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Builds a config with defaults everywhere except the webhook address.
    pub fn with_webhook_url(webhook_url: impl Into<String>) -> Self {
        Self {
            google: GoogleConfig {
                api_base_url: default_google_api_base_url(),
                webhook_url: webhook_url.into(),
                event_time_zone: default_event_time_zone(),
                event_utc_offset: default_event_utc_offset(),
            },
            monday: MondayConfig::default(),
            retry: RetryConfig::default(),
            batch: BatchConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Calendar change feed settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default = "default_google_api_base_url")]
    pub api_base_url: String,
    /// Public address the provider pushes channel notifications to.
    pub webhook_url: String,
    /// IANA zone stamped on events created from board items.
    #[serde(default = "default_event_time_zone")]
    pub event_time_zone: String,
    /// Offset applied to board times that carry none.
    #[serde(default = "default_event_utc_offset")]
    pub event_utc_offset: String,
}

impl GoogleConfig {
    pub fn event_zone(&self) -> EventZone {
        EventZone {
            time_zone: self.event_time_zone.clone(),
            utc_offset: self.event_utc_offset.clone(),
        }
    }
}

/// Board platform settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MondayConfig {
    #[serde(default = "default_monday_api_url")]
    pub api_url: String,
    /// Local development escape hatch. When false, `local_access_token` is
    /// never consulted.
    #[serde(default)]
    pub allow_local_token_fallback: bool,
    #[serde(default)]
    pub local_access_token: Option<String>,
}

impl MondayConfig {
    /// The override token, but only when the fallback flag is enabled.
    pub fn fallback_token(&self) -> Option<&str> {
        if !self.allow_local_token_fallback {
            return None;
        }
        self.local_access_token.as_deref().filter(|token| !token.is_empty())
    }
}

impl Default for MondayConfig {
    fn default() -> Self {
        Self {
            api_url: default_monday_api_url(),
            allow_local_token_fallback: false,
            local_access_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_RETRY_ATTEMPTS, base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_batch_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_inter_chunk_delay_ms")]
    pub inter_chunk_delay_ms: u64,
    #[serde(default)]
    pub stop_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_BATCH_CONCURRENCY,
            inter_chunk_delay_ms: DEFAULT_INTER_CHUNK_DELAY_MS,
            stop_on_error: false,
        }
    }
}

/// Key-value storage settings. Without a SQLite path the runtime keeps
/// everything in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub sqlite_path: Option<String>,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { sqlite_path: None, pool_size: default_pool_size() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_token_cache_ttl_secs")]
    pub token_cache_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { token_cache_ttl_secs: DEFAULT_TOKEN_CACHE_TTL_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

fn default_google_api_base_url() -> String {
    DEFAULT_GOOGLE_API_BASE_URL.to_string()
}

fn default_event_time_zone() -> String {
    DEFAULT_EVENT_TIME_ZONE.to_string()
}

fn default_event_utc_offset() -> String {
    DEFAULT_EVENT_UTC_OFFSET.to_string()
}

fn default_monday_api_url() -> String {
    DEFAULT_MONDAY_API_URL.to_string()
}

fn default_retry_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_retry_base_delay_ms() -> u64 {
    DEFAULT_RETRY_BASE_DELAY_MS
}

fn default_batch_concurrency() -> usize {
    DEFAULT_BATCH_CONCURRENCY
}

fn default_inter_chunk_delay_ms() -> u64 {
    DEFAULT_INTER_CHUNK_DELAY_MS
}

fn default_pool_size() -> u32 {
    4
}

fn default_token_cache_ttl_secs() -> u64 {
    DEFAULT_TOKEN_CACHE_TTL_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}
