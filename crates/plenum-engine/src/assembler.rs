//! Protocol assembler: turns a completed meeting into a rendered document.
//!
//! Runs after completion commits (and again on operator retry). Gathers the
//! meeting snapshot, resolves display names through the directory, hands the
//! summary to the text generator, then the renderer, and records the
//! resulting URL on the meeting. The assembler formats nothing itself beyond
//! the structured summary.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use plenum_minutes::{
    hhmm, suggested_filename, AgendaOutcome, DocumentRenderer, MeetingSummary, MinutesGenerator,
    RenderRequest, TranscriptLine,
};
use plenum_store::{MeetingSnapshot, MeetingStore};

use crate::errors::{EngineError, Result};
use crate::identity::Directory;

/// Gathers a completed meeting's record and drives the minutes pipeline.
pub struct ProtocolAssembler {
    store: Arc<MeetingStore>,
    directory: Arc<dyn Directory>,
    generator: Arc<dyn MinutesGenerator>,
    renderer: Arc<dyn DocumentRenderer>,
}

impl ProtocolAssembler {
    /// Wire up the assembler.
    pub fn new(
        store: Arc<MeetingStore>,
        directory: Arc<dyn Directory>,
        generator: Arc<dyn MinutesGenerator>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            store,
            directory,
            generator,
            renderer,
        }
    }

    /// Run the full pipeline for one meeting and return the document URL.
    ///
    /// Collaborator failures surface as [`EngineError::Collaborator`]; the
    /// meeting's status is never touched. A later retry starts from the
    /// snapshot again.
    pub async fn assemble(&self, meeting_id: &str) -> Result<String> {
        match self.run(meeting_id).await {
            Ok(url) => {
                metrics::counter!("minutes_generation_total", "status" => "success").increment(1);
                info!(meeting_id, url = %url, "Protocol document recorded");
                Ok(url)
            }
            Err(err) => {
                metrics::counter!("minutes_generation_total", "status" => "failure").increment(1);
                error!(meeting_id, error = %err, "Protocol assembly failed");
                Err(err)
            }
        }
    }

    async fn run(&self, meeting_id: &str) -> Result<String> {
        let snapshot = self.store.snapshot(meeting_id)?;
        let summary = self.build_summary(&snapshot).await;

        let content = self.generator.generate(&summary).await?;
        let filename = suggested_filename(meeting_id, &snapshot.meeting.scheduled_for);
        let rendered = self
            .renderer
            .render(&RenderRequest {
                meeting_id: meeting_id.to_string(),
                title: snapshot.meeting.title.clone(),
                filename,
                content,
            })
            .await?;

        if !self.store.set_protocol_url(meeting_id, &rendered.url)? {
            return Err(EngineError::MeetingNotFound(meeting_id.to_string()));
        }
        Ok(rendered.url)
    }

    async fn build_summary(&self, snapshot: &MeetingSnapshot) -> MeetingSummary {
        let mut names: HashMap<String, String> = HashMap::new();

        // Historical attendee list: every participant who ever joined, in
        // first-join order, once each.
        let mut attendees = Vec::new();
        for record in &snapshot.attendance {
            let id = record.participant_id.as_str();
            if !names.contains_key(id) {
                attendees.push(self.resolve_name(&mut names, id).await);
            }
        }

        let agenda = snapshot
            .agenda
            .iter()
            .map(|entry| AgendaOutcome {
                title: entry.item.title.clone(),
                description: entry.item.description.clone(),
                requires_voting: entry.item.requires_voting,
                tally: entry.tally,
            })
            .collect();

        let mut transcript = Vec::with_capacity(snapshot.messages.len());
        for message in &snapshot.messages {
            let speaker = self
                .resolve_name(&mut names, message.sender_id.as_str())
                .await;
            transcript.push(TranscriptLine {
                time: hhmm(&message.created_at),
                speaker,
                content: message.content.clone(),
            });
        }

        MeetingSummary {
            meeting_id: snapshot.meeting.id.as_str().to_string(),
            title: snapshot.meeting.title.clone(),
            description: snapshot.meeting.description.clone(),
            scheduled_for: snapshot.meeting.scheduled_for.clone(),
            attendees,
            agenda,
            transcript,
        }
    }

    /// Resolve a display name, falling back to the raw ID for participants
    /// the directory no longer knows.
    async fn resolve_name(
        &self,
        cache: &mut HashMap<String, String>,
        participant_id: &str,
    ) -> String {
        if let Some(name) = cache.get(participant_id) {
            return name.clone();
        }
        let name = match self.directory.lookup(participant_id).await {
            Some(profile) => profile.display_name,
            None => participant_id.to_string(),
        };
        let _ = cache.insert(participant_id.to_string(), name.clone());
        name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
