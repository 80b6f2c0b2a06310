//! Change event dispatch to the board platform

pub mod service;

pub use service::{DispatchReport, EventDisposition, EventDispatcher};
