//! Core type definitions used across the DriveLinks workspace.

pub mod id;

pub use id::*;
