use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Metadata fields consumed from a sidecar file.
///
/// The indexer writes many more fields; everything unrecognized is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct SidecarFile {
    /// Capture timestamp, required for organizing and renaming.
    #[serde(rename = "TakenAt")]
    pub taken_at: Option<DateTime<Utc>>,

    /// Private items keep their current location.
    #[serde(rename = "Private", default)]
    pub private: bool,

    /// Presence marks the item as archived.
    #[serde(rename = "DeletedAt")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SidecarFile {
    /// Read and parse a sidecar file.
    ///
    /// Sidecars are always read fresh so edits between runs are picked up.
    pub fn read(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read sidecar file {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse sidecar file {}", path.display()))
    }

    /// Capture timestamp, or an error naming the sidecar that lacks one.
    pub fn taken_at(&self, path: &Path) -> Result<DateTime<Utc>> {
        self.taken_at
            .with_context(|| format!("Sidecar file {} has no TakenAt timestamp", path.display()))
    }

    /// True when the item is excluded from path reorganization.
    #[must_use]
    pub const fn is_excluded(&self) -> bool {
        self.private || self.deleted_at.is_some()
    }

    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.deleted_at.is_some()
    }
}
