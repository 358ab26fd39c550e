//! # drivelinks
//!
//! Fixture-driven replay of a client session against the link cache.
//! Backs the `drivelinks-replay` binary and the workspace integration
//! tests.

pub mod fixture;
pub mod output;
pub mod replay;
