//! Saved views: named, persisted snapshots.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::identity::{Timestamp, ViewId};
use crate::snapshot::RawSnapshot;

/// A named snapshot owned by exactly one scope.
///
/// The snapshot is stored as written and sanitized only when applied, so a
/// view keeps working after the screen's columns change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedView {
    pub id: ViewId,
    pub name: String,
    pub snapshot: RawSnapshot,
    pub timestamp: Timestamp,
}

impl SavedView {
    /// Materialize a new view with a fresh id, stamped now.
    pub fn create(new: NewSavedView) -> Self {
        Self {
            id: ViewId::now_v7(),
            name: new.name,
            snapshot: new.snapshot,
            timestamp: Utc::now(),
        }
    }

    /// Apply a patch in place, refreshing the timestamp if anything changed.
    pub fn apply_patch(&mut self, patch: SavedViewPatch) {
        if patch.is_empty() {
            return;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(snapshot) = patch.snapshot {
            self.snapshot = snapshot;
        }
        self.timestamp = Utc::now();
    }
}

/// Input for creating a saved view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSavedView {
    pub name: String,
    pub snapshot: RawSnapshot,
}

impl NewSavedView {
    pub fn new(name: impl Into<String>, snapshot: impl Into<RawSnapshot>) -> Self {
        Self {
            name: name.into(),
            snapshot: snapshot.into(),
        }
    }
}

/// Partial update of a saved view. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedViewPatch {
    pub name: Option<String>,
    pub snapshot: Option<RawSnapshot>,
}

impl SavedViewPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            snapshot: None,
        }
    }

    pub fn snapshot(snapshot: impl Into<RawSnapshot>) -> Self {
        Self {
            name: None,
            snapshot: Some(snapshot.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.snapshot.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_updates_only_given_fields() {
        let snapshot = RawSnapshot::new().with("density", json!("compact"));
        let mut view = SavedView::create(NewSavedView::new("Mine", snapshot.clone()));
        let created_at = view.timestamp;

        view.apply_patch(SavedViewPatch::rename("Renamed"));
        assert_eq!(view.name, "Renamed");
        assert_eq!(view.snapshot, snapshot);
        assert!(view.timestamp >= created_at);
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let mut view = SavedView::create(NewSavedView::new("Mine", RawSnapshot::new()));
        let before = view.clone();
        view.apply_patch(SavedViewPatch::default());
        assert_eq!(view, before);
    }

    #[test]
    fn test_wire_layout() {
        let view = SavedView::create(NewSavedView::new("Open orders", RawSnapshot::new()));
        let value = serde_json::to_value(&view).expect("serialize");
        let keys: Vec<&str> = value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["id", "name", "snapshot", "timestamp"]);
    }
}
