//! HTTP client for the chat-completions minutes generation service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error_parsing::parse_api_error;
use crate::errors::{MinutesError, Result};
use crate::generator::MinutesGenerator;
use crate::summary::{compose_prompt, MeetingSummary, SYSTEM_PROMPT};

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 2000;

/// Generates minutes text through a chat-completions endpoint.
pub struct HttpMinutesGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpMinutesGenerator {
    /// Create a client for the given service.
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MinutesError::Http)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(api_key) = &self.api_key {
            let auth_value = format!("Bearer {api_key}");
            let _ = headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value).map_err(|e| MinutesError::Auth {
                    message: format!("Invalid API key header: {e}"),
                })?,
            );
        }
        Ok(headers)
    }
}

#[async_trait]
impl MinutesGenerator for HttpMinutesGenerator {
    async fn generate(&self, summary: &MeetingSummary) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let prompt = compose_prompt(summary);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                WireMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!(
            meeting_id = %summary.meeting_id,
            model = %self.model,
            prompt_chars = prompt.len(),
            "Requesting minutes generation"
        );

        let headers = self.build_headers()?;
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(MinutesError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let info = parse_api_error(&body_text, status.as_u16());
            error!(
                status = status.as_u16(),
                code = info.code.as_deref().unwrap_or("unknown"),
                retryable = info.retryable,
                "Minutes generation API error"
            );
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(MinutesError::Auth {
                    message: info.message,
                });
            }
            return Err(MinutesError::Api {
                status: status.as_u16(),
                message: info.message,
                retryable: info.retryable,
            });
        }

        let body_text = response.text().await.map_err(MinutesError::Http)?;
        let parsed: ChatResponse = serde_json::from_str(&body_text).map_err(MinutesError::Json)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| MinutesError::Malformed {
                message: "response contained no choices".to_string(),
            })?;

        debug!(
            meeting_id = %summary.meeting_id,
            content_chars = content.len(),
            "Minutes text generated"
        );
        Ok(content)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
