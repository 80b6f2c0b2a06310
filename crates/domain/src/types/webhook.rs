//! Inbound push notifications

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

pub const HEADER_CHANNEL_ID: &str = "x-goog-channel-id";
pub const HEADER_RESOURCE_ID: &str = "x-goog-resource-id";
pub const HEADER_RESOURCE_URI: &str = "x-goog-resource-uri";
pub const HEADER_RESOURCE_STATE: &str = "x-goog-resource-state";
pub const HEADER_CHANNEL_TOKEN: &str = "x-goog-channel-token";

/// State reported by the provider for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    /// Sent once when a channel is opened.
    Sync,
    /// The watched collection changed.
    Exists,
    NotExists,
}

impl_domain_status_conversions!(ResourceState {
    Sync => "sync",
    Exists => "exists",
    NotExists => "not_exists",
});

/// A notification as delivered, before validation. All fields are optional
/// so that structurally invalid deliveries can be rejected explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookNotification {
    pub channel_id: Option<String>,
    pub resource_id: Option<String>,
    pub resource_uri: Option<String>,
    pub resource_state: Option<String>,
    pub channel_token: Option<String>,
}

impl WebhookNotification {
    /// Build from request headers; `lookup` is given lowercase header names.
    pub fn from_headers<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            channel_id: read(HEADER_CHANNEL_ID),
            resource_id: read(HEADER_RESOURCE_ID),
            resource_uri: read(HEADER_RESOURCE_URI),
            resource_state: read(HEADER_RESOURCE_STATE),
            channel_token: read(HEADER_CHANNEL_TOKEN),
        }
    }

    /// Parsed state; unknown values yield `None`.
    pub fn state(&self) -> Option<ResourceState> {
        self.resource_state.as_deref().and_then(|state| state.parse().ok())
    }
}
