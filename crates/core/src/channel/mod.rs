//! Push channel registration

pub mod manager;

pub use manager::{channel_id, channel_key, ChannelManager};
