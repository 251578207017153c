/// State management module
///
/// This module handles all application state, including:
/// - The marker layout model (layout.rs)
/// - The current marker selection and hit-testing (selection.rs)
/// - The editing session tying the two together (session.rs)

pub mod layout;
pub mod selection;
pub mod session;
