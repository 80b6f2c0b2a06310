//! monday.com GraphQL board client

use async_trait::async_trait;
use boardsync_core::BoardClient;
use boardsync_domain::{BoardMutation, MutationOutcome, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::errors::status_error;
use crate::http::{read_json, HttpClient};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: &'a Value,
    operation_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Value>,
    #[serde(default)]
    error_message: Option<String>,
}

/// [`BoardClient`] that posts GraphQL mutations to the platform API
pub struct MondayBoardClient {
    http: HttpClient,
    api_url: String,
}

impl MondayBoardClient {
    pub fn new(http: HttpClient, api_url: impl Into<String>) -> Self {
        Self { http, api_url: api_url.into() }
    }
}

#[async_trait]
impl BoardClient for MondayBoardClient {
    #[instrument(skip_all, fields(operation = %mutation.operation_name))]
    async fn mutate(&self, access_token: &str, mutation: &BoardMutation) -> Result<MutationOutcome> {
        let body = GraphqlRequest {
            query: &mutation.query,
            variables: &mutation.variables,
            operation_name: &mutation.operation_name,
        };
        let builder = self
            .http
            .request(Method::POST, &self.api_url)
            .header(AUTHORIZATION, access_token)
            .json(&body);

        let response = self.http.send(builder).await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), detail.trim()));
        }

        let payload: GraphqlResponse = read_json(response).await?;
        let outcome = into_outcome(payload, &mutation.result_field);
        if outcome.success {
            debug!(result_id = ?outcome.result_id, "mutation applied");
        } else {
            warn!(errors = ?outcome.errors, "mutation rejected");
        }
        Ok(outcome)
    }
}

/// The platform answers 200 even for rejected mutations; success means no
/// errors and a non-null result field.
fn into_outcome(payload: GraphqlResponse, result_field: &str) -> MutationOutcome {
    let errors = match (payload.errors, payload.error_message) {
        (Some(errors), _) if !errors.is_null() => Some(errors),
        (_, Some(message)) => Some(Value::String(message)),
        _ => None,
    };

    let result = payload.data.as_ref().map(|data| &data[result_field]).filter(|v| !v.is_null());
    let result_id = result.and_then(|value| match &value["id"] {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    });

    MutationOutcome { success: errors.is_none() && result.is_some(), errors, result_id }
}
