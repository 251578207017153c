//! Error types for the layout editor
//!
//! Every failure the core can report is a recoverable, user-facing
//! condition. The presentation layer turns each one into a status-line
//! message; none of them end the session.

use thiserror::Error;

/// Failure conditions reported by the layout model, persistence, and
/// rendering layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A marker with this label already exists in the layout.
    #[error("a key labeled \"{0}\" already exists")]
    LabelConflict(String),

    /// The operation referenced a label that is not in the layout.
    #[error("no key labeled \"{0}\" in the layout")]
    NotFound(String),

    /// Refused to save a layout with zero markers.
    #[error("the layout has no keys to save")]
    EmptyLayout,

    /// The persisted data is structurally invalid, inconsistent, or
    /// could not be read.
    #[error("malformed layout data: {0}")]
    MalformedData(String),

    /// A layout was loaded or rendered before a template image was
    /// available.
    #[error("no keyboard template is loaded")]
    MissingTemplate,
}
