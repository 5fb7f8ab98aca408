//! Gemini API client
//!
//! Direct HTTP client for the `generateContent` endpoint. One client is
//! created at startup and reused for every exchange so connections are pooled.

use crate::config::{ApiKey, GeminiConfig};
use crate::conversation::Turn;
use crate::error::{ChatError, ConfigError};
use crate::gemini::gemini_types::{GenerateContentRequest, GenerateContentResponse};
use crate::gemini::ContentGenerator;
use async_trait::async_trait;
use std::time::Duration;

/// HTTP client for the Gemini API
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<ApiKey>,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a client with the configured timeout
    ///
    /// # Arguments
    /// * `config` - Model, base URL and timeout
    /// * `api_key` - Key loaded at startup; `None` makes every request fail
    ///
    /// # Errors
    /// * Returns `ConfigError::HttpClient` if the TLS backend cannot be initialized
    pub fn new(config: GeminiConfig, api_key: Option<ApiKey>) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    /// Endpoint URL for the configured model (without the key)
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Model this client talks to
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send the whole conversation and return the reply text
    ///
    /// # Arguments
    /// * `turns` - Every turn so far, oldest first, ending with the new user turn
    ///
    /// # Returns
    /// * `Ok(String)` - Text of the first part of the first candidate
    /// * `Err(ChatError)` - If the key is missing, the request fails, the API
    ///   answers with a non-success status, or the body holds no usable text
    pub async fn generate_content(&self, turns: &[Turn]) -> Result<String, ChatError> {
        let api_key = match &self.api_key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(ChatError::MissingCredential),
        };

        let request_body = GenerateContentRequest::from_turns(turns);

        tracing::debug!(
            endpoint = %self.endpoint(),
            model = %self.config.model,
            turns = turns.len(),
            "Calling Gemini API"
        );

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key.expose())])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ChatError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());

            tracing::error!(
                status_code = status_code,
                error_body = %error_body,
                "Gemini API returned error status"
            );

            return Err(ChatError::Status {
                status: status_code,
                body: error_body,
            });
        }

        let response_body = response
            .text()
            .await
            .map_err(|e| ChatError::MalformedBody(e.to_string()))?;

        let parsed: GenerateContentResponse =
            serde_json::from_str(&response_body).map_err(|e| {
                ChatError::MalformedBody(format!("{} - Response body: {}", e, response_body))
            })?;

        let text = extract_reply(&parsed)?;

        tracing::debug!(
            response_len = text.len(),
            "Successfully received response from Gemini API"
        );

        Ok(text)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, turns: &[Turn]) -> Result<String, ChatError> {
        self.generate_content(turns).await
    }
}

/// Pick the reply text out of a parsed response
///
/// Only the first candidate's first part is used.
pub fn extract_reply(response: &GenerateContentResponse) -> Result<String, ChatError> {
    if let Some(reason) = response.block_reason() {
        return Err(ChatError::Blocked(reason.to_string()));
    }

    if response.candidates.is_empty() {
        return Err(ChatError::NoCandidates);
    }

    match response.first_text() {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ChatError::EmptyReply),
    }
}
