//! # drivelinks-cache
//!
//! Client-side cache of link metadata, one state per share:
//!
//! - **links**: link ID → [`Link`](drivelinks_entity::Link), the encrypted
//!   record plus an optional decrypted projection
//! - **tree**: parent link ID → IDs of its non-trashed children
//! - **trash epoch**: when the trash was last emptied, used to lock
//!   trashed links that arrive late
//!
//! Every mutation builds a new [`ShareState`] and swaps it in whole, so a
//! reader holding a snapshot never observes a half-applied batch.

pub mod merge;
pub mod sameness;
pub mod state;
pub mod store;

pub use sameness::{EncryptedContentSameness, LinkSameness};
pub use state::{ShareState, ShareStats};
pub use store::LinksCache;
