//! Provider push notification handling

pub mod ingress;

pub use ingress::{calendar_id_from_uri, WebhookAck, WebhookIngress};
