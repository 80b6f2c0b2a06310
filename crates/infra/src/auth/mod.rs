//! Board account authentication

pub mod token_provider;

pub use token_provider::{access_token_key, StoredTokenProvider};
