//! Annotation store, undo/redo history and selection.
//!
//! ## Module Structure
//!
//! - [`history`] - Snapshot history with a movable index
//! - [`annotation_store`] - [`AnnotationStore`] resource (collection + history)
//! - [`selection`] - [`Selection`] resource (general and polygon id sets)

mod annotation_store;
mod history;
mod selection;


pub use annotation_store::{AnnotationStore, ImportMode, MergeError};
pub use history::History;
pub use selection::Selection;
