//! # drivelinks-entity
//!
//! Domain models for DriveLinks. A link exists in two shapes: the
//! server-sourced [`EncryptedLink`] and the locally derived
//! [`DecryptedLink`]. Change notifications for links are modelled in
//! [`event`]. All models derive `Debug`, `Clone`, `Serialize` and
//! `Deserialize`.

pub mod event;
pub mod link;

pub use event::{EventBatch, EventType, LinkEvent};
pub use link::{
    ActiveRevision, DecryptedLink, EncryptedLink, Link, LinkKind, NumAccesses, ShareUrl,
};
