//! Link change notifications delivered by the storage service.
//!
//! A share's event stream arrives as ordered [`EventBatch`]es; each
//! [`LinkEvent`] carries the full encrypted record of the affected link.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::link::EncryptedLink;

/// Kind of change a [`LinkEvent`] describes.
///
/// Deserializes from either the service's numeric codes (`0..=3`) or the
/// snake_case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "RawEventType")]
pub enum EventType {
    /// The link was permanently deleted.
    Delete,
    /// The link was created.
    Create,
    /// The link content or placement changed.
    Update,
    /// Only the link metadata changed.
    UpdateMetadata,
}

impl EventType {
    /// Numeric code used by the service.
    pub fn code(&self) -> u8 {
        match self {
            Self::Delete => 0,
            Self::Create => 1,
            Self::Update => 2,
            Self::UpdateMetadata => 3,
        }
    }

    /// Return the type as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Create => "create",
            Self::Update => "update",
            Self::UpdateMetadata => "update_metadata",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEventType {
    Code(u8),
    Name(String),
}

impl TryFrom<RawEventType> for EventType {
    type Error = String;

    fn try_from(raw: RawEventType) -> Result<Self, Self::Error> {
        match raw {
            RawEventType::Code(0) => Ok(Self::Delete),
            RawEventType::Code(1) => Ok(Self::Create),
            RawEventType::Code(2) => Ok(Self::Update),
            RawEventType::Code(3) => Ok(Self::UpdateMetadata),
            RawEventType::Code(other) => Err(format!("unknown event type code {other}")),
            RawEventType::Name(name) => match name.as_str() {
                "delete" => Ok(Self::Delete),
                "create" => Ok(Self::Create),
                "update" => Ok(Self::Update),
                "update_metadata" => Ok(Self::UpdateMetadata),
                other => Err(format!("unknown event type '{other}'")),
            },
        }
    }
}

/// A single change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEvent {
    /// What happened.
    pub event_type: EventType,
    /// The link record after the change (for deletes, only the ID matters).
    pub encrypted_link: EncryptedLink,
}

impl LinkEvent {
    /// Create an event.
    pub fn new(event_type: EventType, encrypted_link: EncryptedLink) -> Self {
        Self {
            event_type,
            encrypted_link,
        }
    }

    /// Whether this event removes the link.
    pub fn is_delete(&self) -> bool {
        self.event_type == EventType::Delete
    }
}

/// An ordered batch of events for one share.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBatch {
    /// Upstream cursor of the last event in the batch.
    #[serde(default)]
    pub event_id: Option<String>,
    /// Events in the order they must be applied.
    #[serde(default)]
    pub events: Vec<LinkEvent>,
}

impl EventBatch {
    /// Create a batch without a cursor.
    pub fn new(events: Vec<LinkEvent>) -> Self {
        Self {
            event_id: None,
            events,
        }
    }

    /// Number of events in the batch.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
