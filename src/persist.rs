/// Layout persistence
///
/// Converts a layout to and from its persisted JSON form:
///
/// ```json
/// {
///     "coordinates": { "<label>": [x, y], ... },
///     "characters": [ "<label>", ... ]
/// }
/// ```
///
/// The two views are redundant, but both are part of the established file
/// format: "coordinates" carries the positions and "characters" carries
/// the insertion order. They must stay set-equal, and a file where they
/// disagree is rejected as malformed rather than repaired.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::state::layout::Layout;

/// On-disk shape of a saved layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutFile {
    pub coordinates: BTreeMap<String, (f32, f32)>,
    pub characters: Vec<String>,
}

impl LayoutFile {
    fn from_layout(layout: &Layout) -> Result<Self, LayoutError> {
        if layout.is_empty() {
            return Err(LayoutError::EmptyLayout);
        }

        let mut coordinates = BTreeMap::new();
        let mut characters = Vec::with_capacity(layout.len());
        for marker in layout.markers() {
            coordinates.insert(marker.label.clone(), marker.position);
            characters.push(marker.label.clone());
        }

        Ok(Self {
            coordinates,
            characters,
        })
    }

    /// Rebuild a layout, walking "characters" so the reconstructed
    /// insertion order follows the label sequence rather than the
    /// mapping's own key order.
    fn into_layout(self) -> Result<Layout, LayoutError> {
        if self.characters.len() != self.coordinates.len() {
            return Err(LayoutError::MalformedData(format!(
                "{} labels in \"characters\" but {} entries in \"coordinates\"",
                self.characters.len(),
                self.coordinates.len(),
            )));
        }

        let mut layout = Layout::new();
        for label in &self.characters {
            if label.is_empty() {
                return Err(LayoutError::MalformedData(
                    "empty key label".to_string(),
                ));
            }
            let position = self.coordinates.get(label).copied().ok_or_else(|| {
                LayoutError::MalformedData(format!(
                    "label \"{label}\" has no coordinate entry"
                ))
            })?;
            layout.add(label.clone(), position).map_err(|_| {
                LayoutError::MalformedData(format!(
                    "label \"{label}\" appears more than once"
                ))
            })?;
        }
        Ok(layout)
    }
}

/// Serialize a layout to the persisted JSON text.
///
/// Refuses an empty layout, so an empty file is never written. The output
/// is indented for human-diffable saves.
pub fn serialize(layout: &Layout) -> Result<String, LayoutError> {
    let file = LayoutFile::from_layout(layout)?;
    serde_json::to_string_pretty(&file)
        .map_err(|e| LayoutError::MalformedData(format!("failed to encode layout: {e}")))
}

/// Rebuild a layout from persisted JSON text.
pub fn deserialize(json: &str) -> Result<Layout, LayoutError> {
    let file: LayoutFile =
        serde_json::from_str(json).map_err(|e| LayoutError::MalformedData(e.to_string()))?;
    file.into_layout()
}

/// Read a layout from a file. An unreadable file surfaces the same
/// recoverable condition as structurally invalid content.
pub fn load_from_path(path: &Path) -> Result<Layout, LayoutError> {
    let json = fs::read_to_string(path).map_err(|e| {
        LayoutError::MalformedData(format!("failed to read {}: {e}", path.display()))
    })?;
    deserialize(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn layout_qw() -> Layout {
        let mut layout = Layout::new();
        layout.add("Q", (10.0, 20.0)).unwrap();
        layout.add("W", (30.0, 40.0)).unwrap();
        layout
    }

    #[test]
    fn test_round_trip_preserves_labels_order_and_positions() {
        let mut layout = layout_qw();
        layout.add("Shift", (5.5, 120.25)).unwrap();

        let json = serialize(&layout).unwrap();
        let restored = deserialize(&json).unwrap();

        assert_eq!(restored, layout);
    }

    #[test]
    fn test_empty_layout_save_is_refused() {
        let layout = Layout::new();
        assert_eq!(serialize(&layout), Err(LayoutError::EmptyLayout));
    }

    #[test]
    fn test_load_rejects_label_without_coordinate() {
        let json = r#"{"coordinates": {"A": [1, 2]}, "characters": ["A", "B"]}"#;
        let err = deserialize(json).unwrap_err();
        assert!(matches!(err, LayoutError::MalformedData(_)), "{err:?}");
    }

    #[test]
    fn test_load_rejects_coordinate_without_label() {
        let json = r#"{"coordinates": {"A": [1, 2], "B": [3, 4]}, "characters": ["A"]}"#;
        let err = deserialize(json).unwrap_err();
        assert!(matches!(err, LayoutError::MalformedData(_)), "{err:?}");
    }

    #[test]
    fn test_load_rejects_duplicated_label() {
        let json = r#"{"coordinates": {"A": [1, 2], "B": [3, 4]}, "characters": ["A", "A"]}"#;
        let err = deserialize(json).unwrap_err();
        assert!(matches!(err, LayoutError::MalformedData(_)), "{err:?}");
    }

    #[test]
    fn test_load_rejects_empty_label() {
        let json = r#"{"coordinates": {"": [1, 2]}, "characters": [""]}"#;
        let err = deserialize(json).unwrap_err();
        assert!(matches!(err, LayoutError::MalformedData(_)), "{err:?}");
    }

    #[test]
    fn test_load_rejects_non_pair_coordinate() {
        let json = r#"{"coordinates": {"A": [1]}, "characters": ["A"]}"#;
        let err = deserialize(json).unwrap_err();
        assert!(matches!(err, LayoutError::MalformedData(_)), "{err:?}");
    }

    #[test]
    fn test_load_order_follows_characters_sequence() {
        let json = r#"{"coordinates": {"A": [1, 2], "Z": [3, 4]}, "characters": ["Z", "A"]}"#;
        let layout = deserialize(json).unwrap();
        let labels: Vec<&str> = layout.markers().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, ["Z", "A"]);
    }

    #[test]
    fn test_editing_scenario_end_to_end() {
        let mut layout = layout_qw();
        layout.move_to("Q", (15.0, 25.0)).unwrap();

        let saved: Value = serde_json::from_str(&serialize(&layout).unwrap()).unwrap();
        assert_eq!(
            saved,
            json!({
                "coordinates": {"Q": [15.0, 25.0], "W": [30.0, 40.0]},
                "characters": ["Q", "W"],
            })
        );

        layout.remove("W").unwrap();

        let saved: Value = serde_json::from_str(&serialize(&layout).unwrap()).unwrap();
        assert_eq!(
            saved,
            json!({
                "coordinates": {"Q": [15.0, 25.0]},
                "characters": ["Q"],
            })
        );
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyboard_layout.json");

        let layout = layout_qw();
        fs::write(&path, serialize(&layout).unwrap()).unwrap();

        let restored = load_from_path(&path).unwrap();
        assert_eq!(restored, layout);
    }

    #[test]
    fn test_load_missing_file_is_malformed_data() {
        let err = load_from_path(Path::new("/nonexistent/layout.json")).unwrap_err();
        assert!(matches!(err, LayoutError::MalformedData(_)), "{err:?}");
    }
}
