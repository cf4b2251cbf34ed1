//! Meeting summary assembly and prompt composition.
//!
//! The engine collects everything a completed meeting produced into a
//! [`MeetingSummary`]; [`compose_prompt`] flattens it into the user prompt
//! sent to the text generation service. Sections with no content are
//! omitted rather than emitted empty.

use chrono::{DateTime, Utc};

use plenum_core::types::Tally;

/// System message sent alongside every minutes generation request.
pub const SYSTEM_PROMPT: &str = "You are a professional minute-taker for board meetings. \
    You write clear, formally structured meeting minutes from the facts provided \
    and never invent content that is not in the record.";

/// Everything from a completed meeting that feeds into the minutes.
#[derive(Debug, Clone)]
pub struct MeetingSummary {
    /// Meeting ID.
    pub meeting_id: String,
    /// Meeting title.
    pub title: String,
    /// Optional meeting description.
    pub description: Option<String>,
    /// Scheduled start, RFC 3339.
    pub scheduled_for: String,
    /// Display names of everyone who attended.
    pub attendees: Vec<String>,
    /// Agenda items in position order, with voting results.
    pub agenda: Vec<AgendaOutcome>,
    /// Chat transcript in send order.
    pub transcript: Vec<TranscriptLine>,
}

/// One agenda item with its voting result.
#[derive(Debug, Clone)]
pub struct AgendaOutcome {
    /// Item title.
    pub title: String,
    /// Optional item description.
    pub description: Option<String>,
    /// Whether the item was put to a vote.
    pub requires_voting: bool,
    /// Final tally. Outcome derives from the tally when any ballots exist.
    pub tally: Tally,
}

/// One chat message as it appears in the transcript.
#[derive(Debug, Clone)]
pub struct TranscriptLine {
    /// Send time, already formatted `HH:MM`.
    pub time: String,
    /// Sender display name.
    pub speaker: String,
    /// Message body.
    pub content: String,
}

/// Format an RFC 3339 timestamp as `HH:MM` (UTC). Falls back to the raw
/// string when the timestamp does not parse.
#[must_use]
pub fn hhmm(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => parsed.with_timezone(&Utc).format("%H:%M").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

fn format_date(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => parsed
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M UTC")
            .to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Compose the user prompt for minutes generation.
#[must_use]
pub fn compose_prompt(summary: &MeetingSummary) -> String {
    let mut prompt = format!(
        "MEETING INFORMATION:\n\
         Title: {}\n\
         Description: {}\n\
         Date: {}\n\
         Attendee count: {}\n",
        summary.title,
        summary.description.as_deref().unwrap_or("No description"),
        format_date(&summary.scheduled_for),
        summary.attendees.len(),
    );

    prompt.push_str("\nATTENDEES:\n");
    for name in &summary.attendees {
        prompt.push_str(&format!("- {name}\n"));
    }

    prompt.push_str("\nAGENDA AND VOTING RESULTS:\n");
    for (index, item) in summary.agenda.iter().enumerate() {
        prompt.push_str(&format!("\n{}. {}\n", index + 1, item.title));
        if let Some(description) = &item.description {
            prompt.push_str(&format!("   Description: {description}\n"));
        }
        // A voting item nobody voted on gets no result lines.
        if item.tally.total() > 0 {
            prompt.push_str(&format!(
                "   Votes: yes {}, no {}, abstain {}\n",
                item.tally.yes, item.tally.no, item.tally.abstain,
            ));
            prompt.push_str(&format!("   Result: {}\n", item.tally.outcome()));
        }
    }

    if !summary.transcript.is_empty() {
        prompt.push_str("\nDISCUSSION (chat transcript):\n");
        for line in &summary.transcript {
            prompt.push_str(&format!("[{}] {}: {}\n", line.time, line.speaker, line.content));
        }
    }

    prompt.push_str(
        "\nWrite formal meeting minutes from this record, structured as:\n\
         1. Header with meeting title and date\n\
         2. Attendee list\n\
         3. Agenda\n\
         4. Resolutions with voting results\n\
         5. Key discussion points\n\
         6. Date and signature lines\n",
    );

    prompt
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
