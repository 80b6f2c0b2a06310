//! Domain constants
//!
//! Storage key prefixes, change-classification thresholds and pipeline
//! defaults shared by the core services and the infrastructure adapters.

// Key-value storage layout
pub const SYNC_CURSOR_KEY_PREFIX: &str = "calendar-sync-token";
pub const CHANNEL_KEY_PREFIX: &str = "calendar-channel";
pub const CALENDAR_CREDENTIALS_KEY_PREFIX: &str = "google-calendar-tokens";
pub const ACCESS_TOKEN_KEY_PREFIX: &str = "monday-access-token";

// Change classification
/// Maximum distance between `created` and `updated` for an event to still
/// count as freshly created.
pub const CREATE_TOLERANCE_MS: i64 = 2_000;
pub const CANCELLED_STATUS: &str = "cancelled";

// Board back-references on calendar events
pub const METADATA_ITEM_ID_KEY: &str = "itemId";
pub const METADATA_BOARD_ID_KEY: &str = "boardId";
pub const METADATA_USER_ID_KEY: &str = "userId";
pub const ITEM_ID_TAG: &str = "monday-item-id";
pub const BOARD_ID_TAG: &str = "monday-board-id";

// Linked event scheduling
pub const DEFAULT_EVENT_TIME_ZONE: &str = "Asia/Ho_Chi_Minh";
pub const DEFAULT_EVENT_UTC_OFFSET: &str = "+07:00";

// Channel registration
pub const CHANNEL_ID_PREFIX: &str = "monday-calendar";
pub const CHANNEL_TYPE_WEB_HOOK: &str = "web_hook";

// Retry and batching defaults
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 2_000;
pub const DEFAULT_BATCH_CONCURRENCY: usize = 10;
pub const DEFAULT_INTER_CHUNK_DELAY_MS: u64 = 100;

// Access token cache
pub const DEFAULT_TOKEN_CACHE_TTL_SECS: u64 = 100 * 60;

// Remote endpoints
pub const DEFAULT_GOOGLE_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_MONDAY_API_URL: &str = "https://api.monday.com/v2";
