use serde::{Deserialize, Serialize};

/// Controls whether metadata-only changes trigger snapshot events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataChanges {
    /// Listen to changes in metadata as well as data.
    ///
    /// Snapshot events will be triggered on metadata changes in addition to data changes.
    Include,

    /// Do not listen to metadata-only changes.
    ///
    /// Snapshot events will only be triggered when the document data changes.
    /// This is the default behavior.
    #[default]
    Exclude,
}

/// Options passed to the native binding when a listener starts
///
/// Never carries callbacks; those travel separately in `SnapshotArgs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotListenOptions {
    /// Deliver metadata-only changes too
    #[serde(default)]
    pub include_metadata_changes: bool,
}

impl From<MetadataChanges> for SnapshotListenOptions {
    fn from(changes: MetadataChanges) -> Self {
        Self {
            include_metadata_changes: changes == MetadataChanges::Include,
        }
    }
}
