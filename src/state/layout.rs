/// Keyboard layout model
///
/// The layout owns the ordered set of labeled key markers placed on a
/// template image. Labels are unique within a layout, and insertion order
/// is preserved for display and for the persisted form.

use crate::error::LayoutError;

/// One labeled key position, in template-image pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMarker {
    pub label: String,
    pub position: (f32, f32),
}

/// The full set of labeled key markers for one keyboard template.
///
/// A single vector keeps label order and coordinates together, so the
/// label list and the coordinate mapping can never drift apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    markers: Vec<KeyMarker>,
}

impl Layout {
    /// Create an empty layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new marker at the end of the insertion order.
    ///
    /// A duplicate label is rejected, not overwritten: replacing the entry
    /// silently would orphan the previous marker's on-screen circle.
    pub fn add(
        &mut self,
        label: impl Into<String>,
        position: (f32, f32),
    ) -> Result<(), LayoutError> {
        let label = label.into();
        if self.contains(&label) {
            return Err(LayoutError::LabelConflict(label));
        }
        self.markers.push(KeyMarker { label, position });
        Ok(())
    }

    /// Replace the position of an existing marker. Insertion order is
    /// unaffected.
    pub fn move_to(&mut self, label: &str, position: (f32, f32)) -> Result<(), LayoutError> {
        match self.markers.iter_mut().find(|m| m.label == label) {
            Some(marker) => {
                marker.position = position;
                Ok(())
            }
            None => Err(LayoutError::NotFound(label.to_string())),
        }
    }

    /// Remove a marker by label.
    pub fn remove(&mut self, label: &str) -> Result<(), LayoutError> {
        match self.markers.iter().position(|m| m.label == label) {
            Some(index) => {
                self.markers.remove(index);
                Ok(())
            }
            None => Err(LayoutError::NotFound(label.to_string())),
        }
    }

    /// Markers in insertion order.
    pub fn markers(&self) -> impl Iterator<Item = &KeyMarker> {
        self.markers.iter()
    }

    /// Whether a marker with this label exists.
    pub fn contains(&self, label: &str) -> bool {
        self.markers.iter().any(|m| m.label == label)
    }

    /// Position of the marker with this label, if present.
    pub fn position_of(&self, label: &str) -> Option<(f32, f32)> {
        self.markers
            .iter()
            .find(|m| m.label == label)
            .map(|m| m.position)
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }
}
