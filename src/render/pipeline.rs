//! Full-redraw frame rendering.
//!
//! Every frame clears the surface and draws the committed annotations of the
//! current page, then the in-progress gesture preview. There is no partial
//! invalidation.

use image::RgbaImage;
use rusttype::Font;

use crate::annotation::{Annotation, Point, Rgba8, Shape, parse_color_or_black, resolve_color};
use crate::constants::SHAPE_FILL_ALPHA;
use crate::drawing::{DrawingState, Gesture, Tool};
use crate::geometry::bounds;
use crate::store::Selection;
use crate::transform::ViewportTransform;

use super::path;
use super::surface::{PathCommand, Surface};
use super::text::text_outline;

/// Outline color for selected annotations
const HIGHLIGHT_COLOR: Rgba8 = Rgba8::rgb(0, 120, 215);

/// Radius of the vertex markers in the polygon and curve previews (device px)
const FIRST_POINT_MARKER_RADIUS: f32 = 3.0;

/// Radius of the vertex markers in the triangle preview (device px)
const TRIANGLE_MARKER_RADIUS: f32 = 4.0;

/// Source of decoded signature images
pub trait ImageLookup {
    fn image(&self, data: &str) -> Option<&RgbaImage>;
}

/// Lookup that never has an image
pub struct NoImages;

impl ImageLookup for NoImages {
    fn image(&self, _data: &str) -> Option<&RgbaImage> {
        None
    }
}

/// Everything a frame depends on
pub struct Frame<'a> {
    pub annotations: &'a [Annotation],
    /// 1-based page being shown
    pub page: u32,
    pub viewport: ViewportTransform,
    pub drawing: &'a DrawingState,
    /// Currently selected color, used by the preview
    pub preview_color: &'a str,
    pub preview_width: f32,
    pub selection: Option<&'a Selection>,
    pub images: &'a dyn ImageLookup,
    /// Face for filling text annotations. `None` leaves text to the host,
    /// as on screen where egui paints it.
    pub text_font: Option<&'a Font<'static>>,
}

/// Counters for one rendered frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    pub skipped: usize,
}

/// Redraw the whole surface from `frame`
pub fn render_frame(surface: &mut dyn Surface, frame: &Frame) -> FrameStats {
    let mut stats = FrameStats::default();
    let zoom = frame.viewport.zoom.max(f32::EPSILON);

    surface.clear();
    surface.set_transform(frame.viewport.pan, zoom);

    for annotation in frame.annotations.iter().filter(|a| a.page == frame.page) {
        if draw_annotation(surface, annotation, zoom, frame) {
            stats.drawn += 1;
        } else {
            stats.skipped += 1;
        }

        if frame
            .selection
            .is_some_and(|selection| selection.contains(&annotation.id))
        {
            draw_highlight(surface, annotation, zoom);
        }
    }

    let preview = Style {
        color: parse_color_or_black(&resolve_color(frame.preview_color)),
        width: frame.preview_width / zoom,
    };
    draw_preview(surface, frame.drawing, preview, zoom);

    surface.reset_transform();
    stats
}

#[derive(Debug, Clone, Copy)]
struct Style {
    color: Rgba8,
    width: f32,
}

fn is_well_formed(annotation: &Annotation) -> bool {
    annotation.stroke_width.is_finite() && annotation.shape.points().iter().all(|p| p.is_finite())
}

/// Returns false when the annotation was skipped
fn draw_annotation(
    surface: &mut dyn Surface,
    annotation: &Annotation,
    zoom: f32,
    frame: &Frame,
) -> bool {
    if !is_well_formed(annotation) {
        return false;
    }

    let style = Style {
        color: parse_color_or_black(&annotation.color),
        width: annotation.stroke_width / zoom,
    };

    match &annotation.shape {
        Shape::Line { start, end } => {
            surface.stroke_path(&path::segment(*start, *end), style.color, style.width);
            true
        }
        Shape::Rectangle { corner_a, corner_b } => {
            surface.stroke_path(&path::rectangle(*corner_a, *corner_b), style.color, style.width);
            true
        }
        Shape::Circle { center, radius } => match path::circle(*center, *radius) {
            Some(circle) => {
                surface.stroke_path(&circle, style.color, style.width);
                true
            }
            None => false,
        },
        Shape::Triangle { points } => fill_and_stroke(surface, path::closed(points, 3), style),
        Shape::Polygon { points } => fill_and_stroke(surface, path::closed(points, 3), style),
        Shape::Curve { points } => stroke(surface, path::curve(points), style),
        Shape::Pencil { points } => stroke(surface, path::midpoint_chain(points), style),
        Shape::Signature {
            anchor,
            data,
            width,
            height,
        } => {
            // Not decoded yet; drawn once the cache has it
            if let Some(image) = frame.images.image(data) {
                surface.draw_image(image, *anchor, *width, *height);
            }
            true
        }
        Shape::Text {
            anchor,
            text,
            font_size,
        } => {
            if let Some(font) = frame.text_font
                && let Some(outline) = text_outline(font, text, *anchor, *font_size)
            {
                surface.fill_path(&outline, style.color, 1.0);
            }
            true
        }
    }
}

fn stroke(surface: &mut dyn Surface, path: Option<Vec<PathCommand>>, style: Style) -> bool {
    match path {
        Some(path) => {
            surface.stroke_path(&path, style.color, style.width);
            true
        }
        None => false,
    }
}

fn fill_and_stroke(surface: &mut dyn Surface, path: Option<Vec<PathCommand>>, style: Style) -> bool {
    match path {
        Some(path) => {
            surface.fill_path(&path, style.color, SHAPE_FILL_ALPHA);
            surface.stroke_path(&path, style.color, style.width);
            true
        }
        None => false,
    }
}

fn draw_highlight(surface: &mut dyn Surface, annotation: &Annotation, zoom: f32) {
    let Some((min, max)) = bounds(annotation) else {
        return;
    };
    // Pull the outline a few device pixels away from the shape
    let pad = 3.0 / zoom;
    let outline = path::rectangle(min.offset(-pad, -pad), max.offset(pad, pad));
    surface.stroke_path(&outline, HIGHLIGHT_COLOR, 1.5 / zoom);
}

fn marker(surface: &mut dyn Surface, center: Point, radius: f32, color: Rgba8) {
    if let Some(dot) = path::circle(center, radius) {
        surface.fill_path(&dot, color, 1.0);
    }
}

fn draw_preview(surface: &mut dyn Surface, state: &DrawingState, style: Style, zoom: f32) {
    match state {
        DrawingState::Idle => {}
        DrawingState::Tracing { points } => {
            stroke(surface, path::midpoint_chain(points), style);
        }
        DrawingState::Collecting {
            tool,
            points,
            cursor,
        } => match tool.gesture() {
            Gesture::Drag => preview_drag(surface, *tool, points, style),
            Gesture::ClickCount(_) => preview_triangle(surface, points, *cursor, style, zoom),
            Gesture::ClickToClose { .. } => {
                preview_click_to_close(surface, *tool, points, *cursor, style, zoom)
            }
            _ => {}
        },
    }
}

fn preview_drag(surface: &mut dyn Surface, tool: Tool, points: &[Point], style: Style) {
    let [anchor, current] = points else {
        return;
    };
    let shape = match tool {
        Tool::Rectangle => path::rectangle(*anchor, *current),
        Tool::Circle => match path::circle(*anchor, anchor.distance(*current)) {
            Some(circle) => circle,
            None => return,
        },
        _ => path::segment(*anchor, *current),
    };
    surface.stroke_path(&shape, style.color, style.width);
}

fn preview_triangle(
    surface: &mut dyn Surface,
    points: &[Point],
    cursor: Option<Point>,
    style: Style,
    zoom: f32,
) {
    for p in points {
        marker(surface, *p, TRIANGLE_MARKER_RADIUS / zoom, style.color);
    }

    match (points, cursor) {
        ([a], Some(c)) => surface.stroke_path(&path::segment(*a, c), style.color, style.width),
        ([a, b], Some(c)) => {
            fill_and_stroke(surface, path::closed(&[*a, *b, c], 3), style);
        }
        _ => {}
    }
}

fn preview_click_to_close(
    surface: &mut dyn Surface,
    tool: Tool,
    points: &[Point],
    cursor: Option<Point>,
    style: Style,
    zoom: f32,
) {
    let Some(first) = points.first() else {
        return;
    };
    marker(surface, *first, FIRST_POINT_MARKER_RADIUS / zoom, style.color);

    let mut outline = points.to_vec();
    if let Some(c) = cursor
        && points.last() != Some(&c)
    {
        outline.push(c);
    }

    if tool == Tool::Polygon
        && let Some(fill) = path::closed(&outline, 3)
    {
        surface.fill_path(&fill, style.color, SHAPE_FILL_ALPHA);
    }
    if outline.len() >= 2 {
        stroke(surface, path::polyline(&outline), style);
    }
}
