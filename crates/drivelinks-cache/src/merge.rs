//! Merging an incoming link into its cached version.
//!
//! The decrypted projection is expensive to rebuild, so an update never
//! throws it away. Fields computed on this client (access counter,
//! lock flag, thumbnail) are carried over from the cached projection,
//! and a projection that no longer matches its encrypted record is
//! flagged stale for a consumer to re-decrypt.

use drivelinks_core::types::RevisionId;
use drivelinks_entity::{DecryptedLink, Link, NumAccesses, ShareUrl};

use crate::sameness::LinkSameness;

/// Returns the decrypted projection `original` should carry after
/// `incoming` is merged into it.
///
/// - `incoming` has a projection: use it, with locally computed fields
///   taken from the cached projection.
/// - Only `original` has a projection: rebuild it from the incoming
///   encrypted record, keep the decrypted name and modification time,
///   and mark it stale unless the encrypted content is unchanged.
/// - Neither has one: `None`.
pub fn next_decrypted(
    original: &Link,
    incoming: &Link,
    sameness: &dyn LinkSameness,
) -> Option<DecryptedLink> {
    if let Some(decrypted) = &incoming.decrypted {
        let mut next = decrypted.clone();
        if let Some(cached) = &original.decrypted {
            apply_computed(&mut next, cached);
        }
        return Some(next);
    }

    let cached = original.decrypted.as_ref()?;
    let mut next = DecryptedLink::with_decrypted_fields(
        &incoming.encrypted,
        cached.encrypted_name.clone(),
        cached.name.clone(),
        cached.file_modify_time,
    );
    apply_computed(&mut next, cached);
    next.is_stale = !sameness.is_same(&original.encrypted, &incoming.encrypted);
    Some(next)
}

/// Overwrites the locally computed fields of `next` using `cached`.
fn apply_computed(next: &mut DecryptedLink, cached: &DecryptedLink) {
    next.share_url = next
        .share_url
        .take()
        .map(|share_url| with_resolved_accesses(share_url, cached));
    next.is_locked = cached.is_locked;
    next.cached_thumbnail_url =
        thumbnail_for_revision(cached, next.active_revision_id()).map(str::to_string);
}

fn with_resolved_accesses(mut share_url: ShareUrl, cached: &DecryptedLink) -> ShareUrl {
    share_url.num_accesses = resolve_num_accesses(share_url.num_accesses, Some(cached));
    share_url
}

/// Picks the access counter for an incoming share URL.
///
/// Listing responses do not always include the counter, so a known
/// cached value is reused. A share URL appearing on a link that had none
/// was just created and has never been opened.
pub fn resolve_num_accesses(incoming: NumAccesses, cached: Option<&DecryptedLink>) -> NumAccesses {
    if incoming.is_known() {
        return incoming;
    }
    match cached {
        Some(cached) => match &cached.share_url {
            Some(previous) if previous.num_accesses.is_known() => previous.num_accesses,
            Some(_) => NumAccesses::Unknown,
            None => NumAccesses::Known(0),
        },
        None => NumAccesses::Unknown,
    }
}

/// A thumbnail belongs to one revision; it survives only if the revision
/// did not change.
fn thumbnail_for_revision<'a>(
    cached: &'a DecryptedLink,
    revision: Option<&RevisionId>,
) -> Option<&'a str> {
    if cached.active_revision_id() == revision {
        cached.cached_thumbnail_url.as_deref()
    } else {
        None
    }
}
