//! Annotation data model.
//!
//! ## Module Structure
//!
//! - [`point`] - Logical-space points
//! - [`id`] - Session-unique annotation ids
//! - [`color`] - Color string parsing and defaulting
//! - [`model`] - The [`Annotation`] record, its [`Shape`] variants and interchange form

mod color;
mod id;
mod model;
mod point;

pub use color::{Rgba8, parse_color, parse_color_or_black, resolve_color};
pub use id::AnnotationId;
pub use model::{Annotation, AnnotationError, AnnotationKind, Shape, Stamp};
pub use point::Point;
