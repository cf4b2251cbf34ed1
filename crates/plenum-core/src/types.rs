//! Closed domain enums and the vote tally value type.
//!
//! Every enum-like column in the store decodes through these types, so
//! free-form strings never reach the engine. Wire strings are stable: clients
//! and the database CHECK constraints rely on them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failed to parse a domain enum from its wire string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MeetingStatus
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle status of a meeting.
///
/// Transitions: `planned → active → completed`, with `planned → cancelled`
/// and `active → cancelled` as escapes. `completed` and `cancelled` are
/// terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    /// Scheduled but not yet started.
    Planned,
    /// In session; attendance and voting are live.
    Active,
    /// Finished; terminal.
    Completed,
    /// Called off; terminal.
    Cancelled,
}

impl MeetingStatus {
    /// Stable wire string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl FromStr for MeetingStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(Self::Planned),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseEnumError::new("meeting status", other)),
        }
    }
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// VoteValue
// ─────────────────────────────────────────────────────────────────────────────

/// A single ballot on an agenda item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteValue {
    /// In favor.
    Yes,
    /// Against.
    No,
    /// Present but not counted toward either side.
    Abstain,
}

impl VoteValue {
    /// Stable wire string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Abstain => "abstain",
        }
    }
}

impl FromStr for VoteValue {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "abstain" => Ok(Self::Abstain),
            other => Err(ParseEnumError::new("vote value", other)),
        }
    }
}

impl fmt::Display for VoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// VoteOutcome
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome derived from a tally. Abstentions count toward neither side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteOutcome {
    /// More yes than no.
    Approved,
    /// More no than yes.
    Rejected,
    /// Equal yes and no (including zero of each).
    Tied,
}

impl VoteOutcome {
    /// Stable wire string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Tied => "Tied",
        }
    }
}

impl fmt::Display for VoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Role
// ─────────────────────────────────────────────────────────────────────────────

/// Directory role of a participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May create, run, and vote in meetings.
    Founder,
    /// Known to the directory but not authorized to act.
    Member,
}

impl Role {
    /// Stable wire string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Founder => "founder",
            Self::Member => "member",
        }
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "founder" => Ok(Self::Founder),
            "member" => Ok(Self::Member),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tally
// ─────────────────────────────────────────────────────────────────────────────

/// Vote counts for one agenda item. Always recomputed from vote rows,
/// never cached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// Count of yes votes.
    pub yes: i64,
    /// Count of no votes.
    pub no: i64,
    /// Count of abstentions.
    pub abstain: i64,
}

impl Tally {
    /// Derive the outcome: `yes > no` approves, `no > yes` rejects,
    /// anything else is a tie.
    #[must_use]
    pub fn outcome(&self) -> VoteOutcome {
        if self.yes > self.no {
            VoteOutcome::Approved
        } else if self.no > self.yes {
            VoteOutcome::Rejected
        } else {
            VoteOutcome::Tied
        }
    }

    /// Total ballots cast, abstentions included.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.yes + self.no + self.abstain
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
