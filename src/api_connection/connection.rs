use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::recipe_request::RecipeRequest;
use crate::recipe_response::{parse_response, ParsedResponse};

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("Recipe endpoint is not configured")]
    MissingEndpoint,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Any response other than HTTP 200.
    #[error("Error: {}", .0.as_u16())]
    Status(StatusCode),
}

/// HTTP client for the generative recipe endpoint.
#[derive(Debug, Clone)]
pub struct RecipeClient {
    client: Client,
    endpoint: String,
}

impl RecipeClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ApiConnectionError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(ApiConnectionError::MissingEndpoint);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Posts the request and parses a 200 response. Malformed bodies come back as
    /// diagnostics inside [`ParsedResponse`], never as errors.
    pub async fn generate(&self, request: &RecipeRequest) -> Result<ParsedResponse, ApiConnectionError> {
        let payload = request.payload();
        debug!(descriptions = %request.descriptions, "Sending recipe request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = status.as_u16(), body = %error_body, "Recipe endpoint rejected request");
            return Err(ApiConnectionError::Status(status));
        }

        let body = response.text().await?;
        let raw = if body.trim().is_empty() {
            Value::Null
        } else {
            // A non-JSON body is handed to the parser as a bare string
            match serde_json::from_str::<Value>(&body) {
                Ok(value) => value,
                Err(e) => {
                    warn!(error = %e, "Recipe endpoint returned a non-JSON body");
                    Value::String(body)
                }
            }
        };
        Ok(parse_response(&raw))
    }
}
