//! # drivelinks-events
//!
//! Delivery of link change notifications into the cache:
//!
//! - [`EventSource`] trait with explicit subscribe/unsubscribe
//! - [`MemoryEventSource`] for single-process delivery
//! - [`attach_cache`] subscription handles bound to a cache and a share
//! - [`ShareEventQueue`] single-owner async queue per share

pub mod bridge;
pub mod memory;
pub mod queue;
pub mod source;
pub mod subscription;

pub use bridge::{CacheSubscription, attach_cache};
pub use memory::MemoryEventSource;
pub use queue::ShareEventQueue;
pub use source::{EventHandler, EventSource, SubscriptionId};
