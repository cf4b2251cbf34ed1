//! Collaborator traits for minutes generation and document rendering.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::summary::MeetingSummary;

/// Produces meeting minutes text from a [`MeetingSummary`].
///
/// Implementors must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait MinutesGenerator: Send + Sync {
    /// Generate minutes text for a completed meeting.
    async fn generate(&self, summary: &MeetingSummary) -> Result<String>;
}

/// Renders minutes text into a document and returns its URL.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Render a document from the given request.
    async fn render(&self, request: &RenderRequest) -> Result<RenderedDocument>;
}

/// A document rendering request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Meeting the document belongs to.
    pub meeting_id: String,
    /// Document title.
    pub title: String,
    /// Suggested filename, including extension.
    pub filename: String,
    /// The minutes text to render.
    pub content: String,
}

/// A rendered document.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    /// Where the rendered document can be fetched.
    pub url: String,
}

/// Suggested filename for a meeting's minutes document.
///
/// The date component comes from the scheduled start; an unparseable
/// timestamp falls back to the current date.
#[must_use]
pub fn suggested_filename(meeting_id: &str, scheduled_for: &str) -> String {
    let date = match DateTime::parse_from_rfc3339(scheduled_for) {
        Ok(parsed) => parsed.with_timezone(&Utc).format("%Y%m%d").to_string(),
        Err(_) => Utc::now().format("%Y%m%d").to_string(),
    };
    format!("minutes_{meeting_id}_{date}.pdf")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
