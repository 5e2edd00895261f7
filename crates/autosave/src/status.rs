//! Save status reported to observers

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// A rejected save, as observers see it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("save failed: {message}")]
pub struct SaveFailure {
    /// The save target's error, with its context chain
    pub message: String,
    pub at: DateTime<Utc>,
}

impl SaveFailure {
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self {
            message: format!("{err:#}"),
            at: Utc::now(),
        }
    }
}

/// Where the persister is in its save cycle
///
/// A cycle moves `Idle | Saved | Failed -> Dirty -> Saving -> Saved | Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    /// Unsaved edits are waiting for the quiet period to end
    Dirty,
    Saving,
    Saved {
        at: DateTime<Utc>,
    },
    Failed(SaveFailure),
}

impl SaveStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, SaveStatus::Failed(_))
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Idle => f.write_str("No changes"),
            SaveStatus::Dirty => f.write_str("Unsaved changes"),
            SaveStatus::Saving => f.write_str("Saving..."),
            SaveStatus::Saved { at } => write!(f, "Saved {}", at.format("%H:%M:%S")),
            SaveStatus::Failed(failure) => write!(f, "Save failed: {}", failure.message),
        }
    }
}
