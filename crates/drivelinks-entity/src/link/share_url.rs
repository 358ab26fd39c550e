//! Public share URL value object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drivelinks_core::types::ShareUrlId;

/// Number of times a public share URL has been opened.
///
/// Listing responses do not always carry the counter, so "not known" is a
/// distinct state from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum NumAccesses {
    /// The counter was not part of the payload.
    #[default]
    Unknown,
    /// The counter value.
    Known(u64),
}

impl NumAccesses {
    /// Whether the value is known.
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// The counter, if known.
    pub fn value(&self) -> Option<u64> {
        match self {
            Self::Unknown => None,
            Self::Known(n) => Some(*n),
        }
    }
}

impl From<Option<u64>> for NumAccesses {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

impl From<NumAccesses> for Option<u64> {
    fn from(value: NumAccesses) -> Self {
        value.value()
    }
}

/// A public share URL attached to a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareUrl {
    /// The share URL ID.
    pub share_url_id: ShareUrlId,
    /// The public token.
    pub token: String,
    /// When the share URL was created.
    pub created_at: DateTime<Utc>,
    /// When the share URL expires (if set).
    #[serde(default)]
    pub expire_time: Option<DateTime<Utc>>,
    /// Access counter.
    #[serde(default)]
    pub num_accesses: NumAccesses,
}

impl ShareUrl {
    /// Create a share URL with an unknown access counter.
    pub fn new(share_url_id: impl Into<ShareUrlId>, token: impl Into<String>) -> Self {
        Self {
            share_url_id: share_url_id.into(),
            token: token.into(),
            created_at: DateTime::<Utc>::default(),
            expire_time: None,
            num_accesses: NumAccesses::Unknown,
        }
    }

    /// Set the access counter.
    pub fn with_num_accesses(mut self, num_accesses: NumAccesses) -> Self {
        self.num_accesses = num_accesses;
        self
    }
}
