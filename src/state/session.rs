/// Editing session
///
/// One session owns the layout being edited and the current selection,
/// and keeps the two consistent: deleting the selected marker clears the
/// selection in the same operation, and replacing the layout resets it.
/// The session is the only mutator; the event layer calls into it
/// synchronously, one user input at a time.

use crate::error::LayoutError;
use crate::state::layout::Layout;
use crate::state::selection::{nearest_marker, SelectionState, HIT_RADIUS};

#[derive(Debug, Default)]
pub struct Session {
    layout: Layout,
    selection: SelectionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The label currently targeted for drag or delete, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selection.current()
    }

    pub fn add_marker(
        &mut self,
        label: impl Into<String>,
        position: (f32, f32),
    ) -> Result<(), LayoutError> {
        self.layout.add(label, position)
    }

    /// Select the marker nearest to `point`, if one lies within the hit
    /// radius. Returns the newly selected label.
    pub fn select_nearest(&mut self, point: (f32, f32)) -> Option<String> {
        let label = nearest_marker(&self.layout, point, HIT_RADIUS)?.label.clone();
        self.selection.select(label.clone());
        Some(label)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Move the currently selected marker. A drag with nothing selected
    /// is a no-op.
    pub fn move_selected(&mut self, position: (f32, f32)) -> Result<(), LayoutError> {
        match self.selection.current() {
            Some(label) => {
                let label = label.to_string();
                self.layout.move_to(&label, position)
            }
            None => Ok(()),
        }
    }

    /// Remove a marker by label. If it was the selection, the selection is
    /// cleared as part of the same operation, so it can never dangle.
    pub fn remove_marker(&mut self, label: &str) -> Result<(), LayoutError> {
        self.layout.remove(label)?;
        if self.selection.is(label) {
            self.selection.clear();
        }
        Ok(())
    }

    /// Remove the currently selected marker. Returns the removed label, or
    /// `None` when nothing is selected.
    pub fn delete_selected(&mut self) -> Result<Option<String>, LayoutError> {
        match self.selection.current().map(str::to_string) {
            Some(label) => {
                self.remove_marker(&label)?;
                Ok(Some(label))
            }
            None => Ok(None),
        }
    }

    /// Replace the layout wholesale, as happens when a new template is
    /// opened or a saved layout is loaded. Any selection referred to the
    /// old layout and is dropped.
    pub fn replace_layout(&mut self, layout: Layout) {
        self.layout = layout;
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_two_keys() -> Session {
        let mut session = Session::new();
        session.add_marker("Q", (10.0, 20.0)).unwrap();
        session.add_marker("W", (100.0, 20.0)).unwrap();
        session
    }

    #[test]
    fn test_select_nearest_within_radius() {
        let mut session = session_with_two_keys();
        assert_eq!(session.select_nearest((12.0, 21.0)), Some("Q".to_string()));
        assert_eq!(session.selected(), Some("Q"));
    }

    #[test]
    fn test_select_nearest_far_away_selects_nothing() {
        let mut session = session_with_two_keys();
        assert_eq!(session.select_nearest((55.0, 20.0)), None);
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_removing_selected_marker_clears_selection() {
        let mut session = session_with_two_keys();
        session.select_nearest((10.0, 20.0));

        session.remove_marker("Q").unwrap();

        assert_eq!(session.selected(), None);
        assert!(!session.layout().contains("Q"));
    }

    #[test]
    fn test_removing_other_marker_keeps_selection() {
        let mut session = session_with_two_keys();
        session.select_nearest((10.0, 20.0));

        session.remove_marker("W").unwrap();

        assert_eq!(session.selected(), Some("Q"));
    }

    #[test]
    fn test_delete_selected_returns_label() {
        let mut session = session_with_two_keys();
        session.select_nearest((100.0, 20.0));

        assert_eq!(session.delete_selected(), Ok(Some("W".to_string())));
        assert_eq!(session.selected(), None);
        assert_eq!(session.layout().len(), 1);
    }

    #[test]
    fn test_delete_with_no_selection_is_a_noop() {
        let mut session = session_with_two_keys();
        assert_eq!(session.delete_selected(), Ok(None));
        assert_eq!(session.layout().len(), 2);
    }

    #[test]
    fn test_move_selected_without_selection_is_a_noop() {
        let mut session = session_with_two_keys();
        assert_eq!(session.move_selected((0.0, 0.0)), Ok(()));
        assert_eq!(session.layout().position_of("Q"), Some((10.0, 20.0)));
    }

    #[test]
    fn test_replace_layout_clears_selection() {
        let mut session = session_with_two_keys();
        session.select_nearest((10.0, 20.0));

        session.replace_layout(Layout::new());

        assert_eq!(session.selected(), None);
        assert!(session.layout().is_empty());
    }
}
