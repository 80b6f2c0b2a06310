//! Board platform request and response shapes

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A named GraphQL mutation with its variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardMutation {
    pub operation_name: String,
    pub query: String,
    pub variables: Value,
    /// Top-level field of `data` holding the mutated entity.
    #[serde(skip)]
    pub result_field: String,
}

impl BoardMutation {
    pub fn delete_item(item_id: u64) -> Self {
        Self {
            operation_name: "DeleteItem".to_string(),
            query: "mutation DeleteItem($itemId: ID!) { delete_item(item_id: $itemId) { id } }"
                .to_string(),
            variables: json!({ "itemId": item_id.to_string() }),
            result_field: "delete_item".to_string(),
        }
    }
}

/// Outcome of a mutation that reached the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub success: bool,
    pub errors: Option<Value>,
    pub result_id: Option<String>,
}

/// Stored OAuth token for a board account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl AccessToken {
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), token_type: Some("Bearer".into()), scope: None }
    }
}
