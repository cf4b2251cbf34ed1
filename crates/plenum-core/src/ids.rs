//! Typed string ids for every persisted entity.
//!
//! Every entity has a distinct ID type wrapping `String`, so a meeting id
//! cannot be passed where an agenda item id is expected. Entity ids are
//! minted with a short type prefix plus a UUID v7, which keeps values
//! self-describing in logs and time-ordered in the store. `ParticipantId`
//! carries no prefix: participants are roster keys, never minted here.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// View the id as a `&str`.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            /// Unwrap into the underlying `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.into_inner()
            }
        }

        // Ids read as plain strings at call sites (prefix checks, SQL params).
        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }
    };
    ($(#[$meta:meta])* $name:ident, prefix = $prefix:literal) => {
        entity_id! { $(#[$meta])* $name }

        impl $name {
            /// Prefix stamped onto every generated value.
            pub const PREFIX: &'static str = $prefix;

            /// Mint a fresh id: type prefix plus a time-ordered UUID v7.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "_{}"), Uuid::now_v7()))
            }
        }
    };
}

entity_id! {
    /// Unique identifier for a meeting.
    MeetingId, prefix = "mtg"
}

entity_id! {
    /// Unique identifier for an agenda item.
    AgendaItemId, prefix = "item"
}

entity_id! {
    /// Unique identifier for an attendance record.
    AttendanceId, prefix = "att"
}

entity_id! {
    /// Unique identifier for a vote.
    VoteId, prefix = "vote"
}

entity_id! {
    /// Unique identifier for a chat message.
    MessageId, prefix = "msg"
}

entity_id! {
    /// Unique identifier for a participant (directory key).
    ParticipantId
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
