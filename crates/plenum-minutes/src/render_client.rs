//! HTTP client for the document rendering service.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::error_parsing::parse_api_error;
use crate::errors::{MinutesError, Result};
use crate::generator::{DocumentRenderer, RenderRequest, RenderedDocument};

/// Renders minutes documents through an HTTP rendering endpoint.
pub struct HttpDocumentRenderer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDocumentRenderer {
    /// Create a client for the given service.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MinutesError::Http)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DocumentRenderer for HttpDocumentRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<RenderedDocument> {
        let url = format!("{}/v1/render", self.base_url);

        debug!(
            meeting_id = %request.meeting_id,
            filename = %request.filename,
            content_chars = request.content.len(),
            "Requesting document render"
        );

        let response = self
            .client
            .post(&url)
            .json(request)
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
                "Document render API error"
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
        let document: RenderedDocument =
            serde_json::from_str(&body_text).map_err(MinutesError::Json)?;
        if document.url.is_empty() {
            return Err(MinutesError::Malformed {
                message: "render response carried an empty url".to_string(),
            });
        }

        debug!(meeting_id = %request.meeting_id, url = %document.url, "Document rendered");
        Ok(document)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
