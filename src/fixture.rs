//! Replay fixture format.

use std::path::Path;

use serde::{Deserialize, Serialize};

use drivelinks_core::error::AppError;
use drivelinks_core::result::AppResult;
use drivelinks_core::types::{LinkId, ShareId};
use drivelinks_entity::{EventBatch, Link};

/// A recorded session: listings fetched for one share and the event
/// batches that followed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    /// The share being replayed.
    pub share_id: ShareId,
    /// Root folder used to print the tree.
    pub root_link_id: LinkId,
    /// Links from the initial listing.
    #[serde(default)]
    pub listing: Vec<Link>,
    /// Empty the trash after the initial listing.
    #[serde(default)]
    pub lock_trash: bool,
    /// Links from listing pages that arrived after the trash was emptied.
    #[serde(default)]
    pub late_listing: Vec<Link>,
    /// Event batches, in delivery order.
    #[serde(default)]
    pub batches: Vec<EventBatch>,
}

impl Fixture {
    /// Read a fixture from a JSON file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse a fixture from JSON.
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let fixture: Self = serde_json::from_str(raw)?;
        if fixture.listing.is_empty() {
            return Err(AppError::validation(format!(
                "Fixture for share {} has an empty listing",
                fixture.share_id
            )));
        }
        Ok(fixture)
    }
}
