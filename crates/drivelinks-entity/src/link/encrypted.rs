//! Server-sourced link record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drivelinks_core::types::{LinkId, RevisionId};

use super::share_url::ShareUrl;

/// Whether a link is a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// A folder.
    Folder,
    /// A file.
    File,
}

/// The current content revision of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRevision {
    /// The revision ID.
    pub id: RevisionId,
    /// Whether the revision carries a thumbnail block.
    #[serde(default)]
    pub has_thumbnail: bool,
}

impl ActiveRevision {
    /// Create a revision reference without a thumbnail.
    pub fn new(id: impl Into<RevisionId>) -> Self {
        Self {
            id: id.into(),
            has_thumbnail: false,
        }
    }
}

/// The authoritative, encrypted metadata of a link as returned by the
/// storage service.
///
/// Armored PGP fields are kept opaque; only their equality matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedLink {
    /// Unique link identifier within its share.
    pub link_id: LinkId,
    /// The parent folder. `None` only for the share root.
    #[serde(default)]
    pub parent_link_id: Option<LinkId>,
    /// File or folder.
    pub kind: LinkKind,
    /// Armored encrypted name.
    pub name: String,
    /// Name hash used for duplicate detection within the parent.
    #[serde(default)]
    pub hash: String,
    /// MIME type.
    #[serde(default)]
    pub mime_type: String,
    /// Size in bytes of the active revision (zero for folders).
    #[serde(default)]
    pub size: u64,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
    /// When the link metadata was last modified on the server.
    pub modified_at: DateTime<Utc>,
    /// When the link was moved to the trash. `None` if not trashed.
    #[serde(default)]
    pub trashed: Option<DateTime<Utc>>,
    /// Public share URL, if the link is shared by URL.
    #[serde(default)]
    pub share_url: Option<ShareUrl>,
    /// Active content revision (files only).
    #[serde(default)]
    pub active_revision: Option<ActiveRevision>,
    /// Armored node private key.
    #[serde(default)]
    pub node_key: String,
    /// Armored node key passphrase.
    #[serde(default)]
    pub node_passphrase: String,
    /// Signature over the node passphrase.
    #[serde(default)]
    pub node_passphrase_signature: String,
    /// Armored hash key (folders only).
    #[serde(default)]
    pub node_hash_key: Option<String>,
    /// Content session key packet (files only).
    #[serde(default)]
    pub content_key_packet: Option<String>,
    /// Address that signed the node key material.
    #[serde(default)]
    pub signature_address: String,
    /// Address that signed the name.
    #[serde(default)]
    pub name_signature_address: Option<String>,
    /// Encrypted extended attributes (modification time, size, ...).
    #[serde(default)]
    pub x_attr: Option<String>,
}

impl EncryptedLink {
    /// Create a link record with empty key material.
    pub fn new(
        link_id: impl Into<LinkId>,
        parent_link_id: Option<LinkId>,
        kind: LinkKind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            link_id: link_id.into(),
            parent_link_id,
            kind,
            name: name.into(),
            hash: String::new(),
            mime_type: String::new(),
            size: 0,
            created_at: DateTime::<Utc>::default(),
            modified_at: DateTime::<Utc>::default(),
            trashed: None,
            share_url: None,
            active_revision: None,
            node_key: String::new(),
            node_passphrase: String::new(),
            node_passphrase_signature: String::new(),
            node_hash_key: None,
            content_key_packet: None,
            signature_address: String::new(),
            name_signature_address: None,
            x_attr: None,
        }
    }

    /// Create a folder record under `parent_link_id`.
    pub fn folder(link_id: impl Into<LinkId>, parent_link_id: Option<LinkId>) -> Self {
        let link_id = link_id.into();
        let name = format!("enc:{link_id}");
        Self::new(link_id, parent_link_id, LinkKind::Folder, name)
    }

    /// Create a file record under `parent_link_id` with an active revision.
    pub fn file(
        link_id: impl Into<LinkId>,
        parent_link_id: Option<LinkId>,
        revision_id: impl Into<RevisionId>,
    ) -> Self {
        let link_id = link_id.into();
        let name = format!("enc:{link_id}");
        let mut link = Self::new(link_id, parent_link_id, LinkKind::File, name);
        link.active_revision = Some(ActiveRevision::new(revision_id));
        link
    }

    /// Set the trash timestamp.
    pub fn with_trashed(mut self, trashed: Option<DateTime<Utc>>) -> Self {
        self.trashed = trashed;
        self
    }

    /// Set the share URL.
    pub fn with_share_url(mut self, share_url: Option<ShareUrl>) -> Self {
        self.share_url = share_url;
        self
    }

    /// Whether the link is in the trash.
    pub fn is_trashed(&self) -> bool {
        self.trashed.is_some()
    }

    /// Whether the link is a file.
    pub fn is_file(&self) -> bool {
        self.kind == LinkKind::File
    }

    /// ID of the active revision, if any.
    pub fn active_revision_id(&self) -> Option<&RevisionId> {
        self.active_revision.as_ref().map(|rev| &rev.id)
    }
}
