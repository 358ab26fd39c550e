//! Link sameness predicate used to decide staleness.

use drivelinks_entity::EncryptedLink;

/// Decides whether two versions of an encrypted record decrypt to the same
/// values.
///
/// When an update arrives without a decrypted projection, the cache keeps
/// the old projection and flags it stale unless this predicate says the
/// encrypted content did not change.
pub trait LinkSameness: Send + Sync + std::fmt::Debug + 'static {
    /// Returns `true` if `new` decrypts to the same values as `old`.
    fn is_same(&self, old: &EncryptedLink, new: &EncryptedLink) -> bool;
}

/// Compares every field that feeds decryption.
///
/// Trash state, share URL, size and server timestamps are ignored: they
/// are mirrored into the projection as plain values.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncryptedContentSameness;

impl LinkSameness for EncryptedContentSameness {
    fn is_same(&self, old: &EncryptedLink, new: &EncryptedLink) -> bool {
        old.parent_link_id == new.parent_link_id
            && old.name == new.name
            && old.hash == new.hash
            && old.node_key == new.node_key
            && old.node_passphrase == new.node_passphrase
            && old.node_passphrase_signature == new.node_passphrase_signature
            && old.node_hash_key == new.node_hash_key
            && old.content_key_packet == new.content_key_packet
            && old.signature_address == new.signature_address
            && old.name_signature_address == new.name_signature_address
            && old.x_attr == new.x_attr
            && old.active_revision_id() == new.active_revision_id()
    }
}
