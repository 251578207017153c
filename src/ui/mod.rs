/// UI building blocks
///
/// This module contains the interactive widgets layered over the template
/// image (canvas.rs).

pub mod canvas;
