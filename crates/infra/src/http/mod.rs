//! Shared HTTP plumbing for the provider adapters

pub mod client;

pub use client::{read_json, HttpClient, HttpClientBuilder};
