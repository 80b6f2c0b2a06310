//! Calendar events created from board items

pub mod service;

pub use service::EventLinkService;
