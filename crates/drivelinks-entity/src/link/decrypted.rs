//! Locally derived, human-usable link projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drivelinks_core::types::{LinkId, RevisionId};

use super::encrypted::{ActiveRevision, EncryptedLink, LinkKind};
use super::share_url::ShareUrl;

/// The decrypted view of a link.
///
/// Mirrors the plain fields of the [`EncryptedLink`] it was derived from
/// and adds the decrypted values plus a few fields that only exist on
/// this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptedLink {
    /// Link identifier.
    pub link_id: LinkId,
    /// Parent folder, `None` for the share root.
    #[serde(default)]
    pub parent_link_id: Option<LinkId>,
    /// File or folder.
    pub kind: LinkKind,
    /// MIME type.
    #[serde(default)]
    pub mime_type: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
    /// When the link metadata was last modified on the server.
    pub modified_at: DateTime<Utc>,
    /// When the link was trashed.
    #[serde(default)]
    pub trashed: Option<DateTime<Utc>>,
    /// Share URL with the resolved access counter.
    #[serde(default)]
    pub share_url: Option<ShareUrl>,
    /// Active content revision.
    #[serde(default)]
    pub active_revision: Option<ActiveRevision>,
    /// The armored name this projection was decrypted from.
    pub encrypted_name: String,
    /// Decrypted name.
    pub name: String,
    /// Modification time from the decrypted extended attributes.
    pub file_modify_time: DateTime<Utc>,
    /// Locally rendered thumbnail for the active revision.
    #[serde(default)]
    pub cached_thumbnail_url: Option<String>,
    /// Frozen pending server confirmation.
    #[serde(default)]
    pub is_locked: bool,
    /// Decrypted fields may lag behind the encrypted record.
    #[serde(default)]
    pub is_stale: bool,
}

impl DecryptedLink {
    /// Build a projection from an encrypted record and its decrypted values.
    pub fn from_encrypted(
        encrypted: &EncryptedLink,
        name: impl Into<String>,
        file_modify_time: DateTime<Utc>,
    ) -> Self {
        Self::with_decrypted_fields(
            encrypted,
            encrypted.name.clone(),
            name.into(),
            file_modify_time,
        )
    }

    /// Build a projection carrying over decrypted values that may belong
    /// to an older encrypted record.
    pub fn with_decrypted_fields(
        encrypted: &EncryptedLink,
        encrypted_name: String,
        name: String,
        file_modify_time: DateTime<Utc>,
    ) -> Self {
        Self {
            link_id: encrypted.link_id.clone(),
            parent_link_id: encrypted.parent_link_id.clone(),
            kind: encrypted.kind,
            mime_type: encrypted.mime_type.clone(),
            size: encrypted.size,
            created_at: encrypted.created_at,
            modified_at: encrypted.modified_at,
            trashed: encrypted.trashed,
            share_url: encrypted.share_url.clone(),
            active_revision: encrypted.active_revision.clone(),
            encrypted_name,
            name,
            file_modify_time,
            cached_thumbnail_url: None,
            is_locked: false,
            is_stale: false,
        }
    }

    /// ID of the active revision, if any.
    pub fn active_revision_id(&self) -> Option<&RevisionId> {
        self.active_revision.as_ref().map(|rev| &rev.id)
    }
}
