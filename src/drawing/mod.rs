//! Drawing tools and the gesture state machine.
//!
//! ## Module Structure
//!
//! - [`tool`] - The [`Tool`] enum (names, shortcuts, cursors, gesture kinds)
//! - [`machine`] - [`DrawingMachine`]: pointer events in, [`DrawingOutcome`]s out
//!
//! ## Gestures
//!
//! - Line, rectangle, circle: press, drag, release
//! - Triangle: three clicks
//! - Polygon, curve: click to add points, click near the first point to close
//! - Pencil: continuous trace while the button is held
//! - Text, signature: a click opens an editor dialog
//! - Escape cancels; switching tools cancels

mod machine;
mod tool;


pub use machine::{
    DrawingMachine, DrawingOutcome, DrawingState, ToolContext, signature_annotation,
    text_annotation,
};
pub use tool::{Gesture, Tool};
