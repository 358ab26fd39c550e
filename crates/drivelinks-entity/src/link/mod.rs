//! Link domain entities.

pub mod decrypted;
pub mod encrypted;
pub mod share_url;

use serde::{Deserialize, Serialize};

use drivelinks_core::types::LinkId;

pub use decrypted::DecryptedLink;
pub use encrypted::{ActiveRevision, EncryptedLink, LinkKind};
pub use share_url::{NumAccesses, ShareUrl};

/// A cached link: the authoritative record plus an optional decrypted view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Server-sourced record.
    pub encrypted: EncryptedLink,
    /// Decrypted projection, absent until something decrypts the link.
    #[serde(default)]
    pub decrypted: Option<DecryptedLink>,
}

impl Link {
    /// A link known only by its encrypted record.
    pub fn encrypted(encrypted: EncryptedLink) -> Self {
        Self {
            encrypted,
            decrypted: None,
        }
    }

    /// A link with both representations.
    pub fn decrypted(encrypted: EncryptedLink, decrypted: DecryptedLink) -> Self {
        Self {
            encrypted,
            decrypted: Some(decrypted),
        }
    }

    /// The link ID.
    pub fn link_id(&self) -> &LinkId {
        &self.encrypted.link_id
    }

    /// The parent link ID, `None` for the share root.
    pub fn parent_link_id(&self) -> Option<&LinkId> {
        self.encrypted.parent_link_id.as_ref()
    }

    /// Whether the authoritative record is trashed.
    pub fn is_trashed(&self) -> bool {
        self.encrypted.is_trashed()
    }
}
