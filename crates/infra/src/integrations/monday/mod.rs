//! Board platform adapter

pub mod client;

pub use client::MondayBoardClient;
