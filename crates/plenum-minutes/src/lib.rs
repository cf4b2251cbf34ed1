//! # plenum-minutes
//!
//! Minutes generation and document rendering collaborators.
//!
//! After a meeting completes, the engine assembles a [`MeetingSummary`] and
//! hands it through two collaborator traits:
//!
//! - **[`MinutesGenerator`]**: turns the summary into narrative minutes. The
//!   shipped [`HttpMinutesGenerator`] posts a chat-completions style request
//!   and extracts the first choice's content.
//! - **[`DocumentRenderer`]**: turns the minutes text into a distributable
//!   artifact. The shipped [`HttpDocumentRenderer`] posts to a rendering
//!   service that stores the document and returns its URL.
//!
//! Errors classify as retryable (timeouts, 429, 5xx) or not (4xx, auth);
//! the caller decides whether to surface or retry.

#![deny(unsafe_code)]

pub mod errors;
pub mod generator;
pub mod render_client;
pub mod summary;
pub mod text_client;

mod error_parsing;

pub use errors::{MinutesError, Result};
pub use generator::{
    suggested_filename, DocumentRenderer, MinutesGenerator, RenderRequest, RenderedDocument,
};
pub use render_client::HttpDocumentRenderer;
pub use summary::{compose_prompt, hhmm, AgendaOutcome, MeetingSummary, TranscriptLine};
pub use text_client::HttpMinutesGenerator;
