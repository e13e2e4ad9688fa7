//! Pointer gesture interpretation.
//!
//! The machine never touches the store: each input returns a
//! [`DrawingOutcome`] and the caller performs it.

use bevy::prelude::*;

use crate::annotation::{Annotation, Point, Shape, Stamp};
use crate::constants::FREEHAND_MIN_DISTANCE;

use super::tool::{Gesture, Tool};

/// Read-only inputs sampled at the moment of a pointer event
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub tool: Tool,
    pub stamp: Stamp,
}

/// In-progress shape
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DrawingState {
    #[default]
    Idle,
    /// Two-point and click-to-add tools
    Collecting {
        tool: Tool,
        points: Vec<Point>,
        /// Live cursor used only for previews
        cursor: Option<Point>,
    },
    /// Freehand trace
    Tracing { points: Vec<Point> },
}

/// What the caller should do after an input
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingOutcome {
    None,
    Commit(Annotation),
    OpenSignatureEditor { anchor: Point },
    OpenTextEditor { anchor: Point },
    SelectAt(Point),
}

#[derive(Resource, Debug, Default)]
pub struct DrawingMachine {
    state: DrawingState,
}

impl DrawingMachine {
    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, DrawingState::Idle)
    }

    /// Tool of the gesture in progress
    pub fn active_tool(&self) -> Option<Tool> {
        match &self.state {
            DrawingState::Idle => None,
            DrawingState::Collecting { tool, .. } => Some(*tool),
            DrawingState::Tracing { .. } => Some(Tool::Pencil),
        }
    }

    pub fn point_count(&self) -> usize {
        match &self.state {
            DrawingState::Idle => 0,
            DrawingState::Collecting { points, .. } | DrawingState::Tracing { points } => {
                points.len()
            }
        }
    }

    pub fn pointer_down(&mut self, p: Point, ctx: &ToolContext) -> DrawingOutcome {
        // A gesture left over from another tool never continues
        if self.active_tool().is_some_and(|t| t != ctx.tool) {
            self.cancel();
        }

        match ctx.tool.gesture() {
            Gesture::None => DrawingOutcome::SelectAt(p),
            Gesture::Dialog => match ctx.tool {
                Tool::Text => DrawingOutcome::OpenTextEditor { anchor: p },
                _ => DrawingOutcome::OpenSignatureEditor { anchor: p },
            },
            Gesture::Drag => {
                self.state = DrawingState::Collecting {
                    tool: ctx.tool,
                    points: vec![p],
                    cursor: Some(p),
                };
                DrawingOutcome::None
            }
            Gesture::Trace => {
                self.state = DrawingState::Tracing { points: vec![p] };
                DrawingOutcome::None
            }
            Gesture::ClickCount(count) => self.add_vertex(p, ctx, count),
            Gesture::ClickToClose { tolerance } => self.click_to_close(p, ctx, tolerance),
        }
    }

    pub fn pointer_move(&mut self, p: Point) {
        match &mut self.state {
            DrawingState::Idle => {}
            DrawingState::Collecting {
                tool,
                points,
                cursor,
            } => {
                *cursor = Some(p);
                if tool.gesture() == Gesture::Drag {
                    // Keep the anchor, replace the live second point
                    points.truncate(1);
                    points.push(p);
                }
            }
            DrawingState::Tracing { points } => {
                if let Some(last) = points.last()
                    && p.distance(*last) > FREEHAND_MIN_DISTANCE
                {
                    points.push(p);
                }
            }
        }
    }

    pub fn pointer_up(&mut self, p: Point, ctx: &ToolContext) -> DrawingOutcome {
        if matches!(self.state, DrawingState::Tracing { .. }) {
            self.pointer_move(p);
            let DrawingState::Tracing { points } = std::mem::take(&mut self.state) else {
                return DrawingOutcome::None;
            };
            // Fewer than two samples is a click, not a stroke
            return match Shape::pencil(points) {
                Ok(shape) => DrawingOutcome::Commit(Annotation::create(shape, &ctx.stamp)),
                Err(_) => DrawingOutcome::None,
            };
        }

        let dragging = matches!(
            &self.state,
            DrawingState::Collecting { tool, .. } if tool.gesture() == Gesture::Drag
        );
        if !dragging {
            return DrawingOutcome::None;
        }

        let DrawingState::Collecting { tool, points, .. } = std::mem::take(&mut self.state) else {
            return DrawingOutcome::None;
        };
        if points.len() < 2 {
            return DrawingOutcome::None;
        }
        let shape = match tool {
            Tool::Rectangle => Shape::rectangle(points[0], points[1]),
            Tool::Circle => Shape::circle_through(points[0], points[1]),
            _ => Shape::line(points[0], points[1]),
        };
        DrawingOutcome::Commit(Annotation::create(shape, &ctx.stamp))
    }

    /// Discard the gesture in progress. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        if was_active {
            debug!("Cancelled {:?} gesture", self.active_tool());
        }
        self.state = DrawingState::Idle;
        was_active
    }

    /// Switching tools abandons any gesture of a different tool
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        if self.active_tool().is_some_and(|t| t != tool) {
            return self.cancel();
        }
        false
    }

    /// Append a click to the collected points, starting a gesture if idle
    fn push_vertex(&mut self, p: Point, tool: Tool) {
        match &mut self.state {
            DrawingState::Collecting { points, cursor, .. } => {
                points.push(p);
                *cursor = Some(p);
            }
            _ => {
                self.state = DrawingState::Collecting {
                    tool,
                    points: vec![p],
                    cursor: Some(p),
                };
            }
        }
    }

    fn add_vertex(&mut self, p: Point, ctx: &ToolContext, count: usize) -> DrawingOutcome {
        self.push_vertex(p, ctx.tool);
        if self.point_count() < count {
            return DrawingOutcome::None;
        }

        let DrawingState::Collecting { points, .. } = std::mem::take(&mut self.state) else {
            return DrawingOutcome::None;
        };
        match points.as_slice() {
            [a, b, c] => DrawingOutcome::Commit(Annotation::create(
                Shape::triangle([*a, *b, *c]),
                &ctx.stamp,
            )),
            _ => DrawingOutcome::None,
        }
    }

    fn click_to_close(&mut self, p: Point, ctx: &ToolContext, tolerance: f32) -> DrawingOutcome {
        let closes = match &self.state {
            DrawingState::Collecting { points, .. } => {
                points.len() >= 3 && points.first().is_some_and(|first| p.distance(*first) <= tolerance)
            }
            _ => false,
        };

        if !closes {
            self.push_vertex(p, ctx.tool);
            return DrawingOutcome::None;
        }

        // The closing click itself is not part of the shape
        let DrawingState::Collecting { tool, points, .. } = std::mem::take(&mut self.state) else {
            return DrawingOutcome::None;
        };
        let shape = match tool {
            Tool::Curve => Shape::curve(points),
            _ => Shape::polygon(points),
        };
        match shape {
            Ok(shape) => DrawingOutcome::Commit(Annotation::create(shape, &ctx.stamp)),
            Err(e) => {
                warn!("Discarded closed shape: {}", e);
                DrawingOutcome::None
            }
        }
    }
}

/// Build the signature annotation confirmed in the signature editor
pub fn signature_annotation(anchor: Point, data_url: String, stamp: &Stamp) -> Annotation {
    Annotation::create(Shape::signature(anchor, data_url), stamp)
}

/// Build the text annotation confirmed in the text editor.
/// Blank text produces nothing.
pub fn text_annotation(anchor: Point, text: &str, font_size: f32, stamp: &Stamp) -> Option<Annotation> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(Annotation::create(Shape::text(anchor, text, font_size), stamp))
}
