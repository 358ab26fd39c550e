//! Link cache configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How far a link deletion reaches into the cached subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Remove the link and its direct children only. Grandchildren stay
    /// in the link table, unreachable from the tree.
    Shallow,
    /// Remove the link and every cached descendant.
    #[default]
    Recursive,
}

impl fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shallow => write!(f, "shallow"),
            Self::Recursive => write!(f, "recursive"),
        }
    }
}

/// Link cache configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkCacheConfig {
    /// Deletion reach: `"shallow"` or `"recursive"`.
    #[serde(default)]
    pub delete_mode: DeleteMode,
}
