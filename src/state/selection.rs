/// Marker selection and hit-testing
///
/// At most one marker is selected at a time; the selection is the target
/// of drag and delete gestures. The selection holds only the label, never
/// a copy of the marker, so the layout stays the single source of truth.

use crate::state::layout::{KeyMarker, Layout};

/// Pointer distance within which a click resolves to a marker, in
/// template-image pixels. Clicks farther from every marker select nothing.
pub const HIT_RADIUS: f32 = 16.0;

/// The at-most-one marker currently targeted for drag or delete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    selected: Option<String>,
}

impl SelectionState {
    /// Select a label. Callers pass labels obtained from a hit-test, so
    /// the label is known to exist in the layout at the call site.
    pub fn select(&mut self, label: impl Into<String>) {
        self.selected = Some(label.into());
    }

    /// Unconditionally clear the selection.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// The currently selected label, if any.
    pub fn current(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Whether this label is the current selection.
    pub fn is(&self, label: &str) -> bool {
        self.selected.as_deref() == Some(label)
    }
}

/// Nearest marker to `point` by Euclidean distance, if one lies within
/// `max_distance`.
pub fn nearest_marker(
    layout: &Layout,
    point: (f32, f32),
    max_distance: f32,
) -> Option<&KeyMarker> {
    layout
        .markers()
        .map(|m| (m, distance(m.position, point)))
        .filter(|(_, d)| *d <= max_distance)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(m, _)| m)
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}
