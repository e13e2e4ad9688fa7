//! Annotation records and their interchange form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    INITIAL_STROKE_WIDTH, MIN_STROKE_WIDTH, SIGNATURE_HEIGHT, SIGNATURE_WIDTH,
};

use super::color::resolve_color;
use super::id::AnnotationId;
use super::point::Point;

/// Errors raised while building an annotation from untrusted input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnotationError {
    #[error("unknown annotation type '{0}'")]
    UnknownType(String),
    #[error("{kind} needs {expected} points, got {actual}")]
    PointCount {
        kind: AnnotationKind,
        expected: &'static str,
        actual: usize,
    },
    #[error("{kind} is missing field '{field}'")]
    MissingField {
        kind: AnnotationKind,
        field: &'static str,
    },
    #[error("{kind} has an invalid value for '{field}'")]
    InvalidValue {
        kind: AnnotationKind,
        field: &'static str,
    },
}

/// Closed set of annotation type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    Line,
    Rectangle,
    Circle,
    Triangle,
    Polygon,
    Curve,
    Pencil,
    Text,
    Signature,
}

impl AnnotationKind {
    pub fn tag(&self) -> &'static str {
        match self {
            AnnotationKind::Line => "line",
            AnnotationKind::Rectangle => "rectangle",
            AnnotationKind::Circle => "circle",
            AnnotationKind::Triangle => "triangle",
            AnnotationKind::Polygon => "polygon",
            AnnotationKind::Curve => "curve",
            AnnotationKind::Pencil => "pencil",
            AnnotationKind::Text => "text",
            AnnotationKind::Signature => "signature",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AnnotationKind::Line => "Line",
            AnnotationKind::Rectangle => "Rectangle",
            AnnotationKind::Circle => "Circle",
            AnnotationKind::Triangle => "Triangle",
            AnnotationKind::Polygon => "Polygon",
            AnnotationKind::Curve => "Curve",
            AnnotationKind::Pencil => "Pencil",
            AnnotationKind::Text => "Text",
            AnnotationKind::Signature => "Signature",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "line" => AnnotationKind::Line,
            "rectangle" => AnnotationKind::Rectangle,
            "circle" => AnnotationKind::Circle,
            "triangle" => AnnotationKind::Triangle,
            "polygon" => AnnotationKind::Polygon,
            "curve" => AnnotationKind::Curve,
            // Older exports call freehand strokes "freehand"
            "pencil" | "freehand" => AnnotationKind::Pencil,
            "text" => AnnotationKind::Text,
            "signature" => AnnotationKind::Signature,
            _ => return None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Geometry of an annotation, one variant per type tag.
///
/// Build shapes through the constructors below; they enforce each variant's
/// point-count contract.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line { start: Point, end: Point },
    Rectangle { corner_a: Point, corner_b: Point },
    Circle { center: Point, radius: f32 },
    Triangle { points: [Point; 3] },
    Polygon { points: Vec<Point> },
    Curve { points: Vec<Point> },
    Pencil { points: Vec<Point> },
    Text { anchor: Point, text: String, font_size: f32 },
    Signature {
        anchor: Point,
        data: String,
        width: f32,
        height: f32,
    },
}

impl Shape {
    pub fn line(start: Point, end: Point) -> Self {
        Shape::Line { start, end }
    }

    pub fn rectangle(corner_a: Point, corner_b: Point) -> Self {
        Shape::Rectangle { corner_a, corner_b }
    }

    /// Circle centered at `center` passing through `rim`
    pub fn circle_through(center: Point, rim: Point) -> Self {
        Shape::Circle {
            center,
            radius: center.distance(rim),
        }
    }

    pub fn circle(center: Point, radius: f32) -> Result<Self, AnnotationError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(AnnotationError::InvalidValue {
                kind: AnnotationKind::Circle,
                field: "radius",
            });
        }
        Ok(Shape::Circle { center, radius })
    }

    pub fn triangle(points: [Point; 3]) -> Self {
        Shape::Triangle { points }
    }

    pub fn polygon(points: Vec<Point>) -> Result<Self, AnnotationError> {
        require_points(AnnotationKind::Polygon, &points, 3, "at least 3")?;
        Ok(Shape::Polygon { points })
    }

    pub fn curve(points: Vec<Point>) -> Result<Self, AnnotationError> {
        require_points(AnnotationKind::Curve, &points, 2, "at least 2")?;
        Ok(Shape::Curve { points })
    }

    pub fn pencil(points: Vec<Point>) -> Result<Self, AnnotationError> {
        require_points(AnnotationKind::Pencil, &points, 2, "at least 2")?;
        Ok(Shape::Pencil { points })
    }

    pub fn text(anchor: Point, text: impl Into<String>, font_size: f32) -> Self {
        Shape::Text {
            anchor,
            text: text.into(),
            font_size: font_size.max(1.0),
        }
    }

    pub fn signature(anchor: Point, data: impl Into<String>) -> Self {
        Shape::Signature {
            anchor,
            data: data.into(),
            width: SIGNATURE_WIDTH,
            height: SIGNATURE_HEIGHT,
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        match self {
            Shape::Line { .. } => AnnotationKind::Line,
            Shape::Rectangle { .. } => AnnotationKind::Rectangle,
            Shape::Circle { .. } => AnnotationKind::Circle,
            Shape::Triangle { .. } => AnnotationKind::Triangle,
            Shape::Polygon { .. } => AnnotationKind::Polygon,
            Shape::Curve { .. } => AnnotationKind::Curve,
            Shape::Pencil { .. } => AnnotationKind::Pencil,
            Shape::Text { .. } => AnnotationKind::Text,
            Shape::Signature { .. } => AnnotationKind::Signature,
        }
    }

    /// The shape's points in interchange order
    pub fn points(&self) -> Vec<Point> {
        match self {
            Shape::Line { start, end } => vec![*start, *end],
            Shape::Rectangle { corner_a, corner_b } => vec![*corner_a, *corner_b],
            Shape::Circle { center, .. } => vec![*center],
            Shape::Triangle { points } => points.to_vec(),
            Shape::Polygon { points } | Shape::Curve { points } | Shape::Pencil { points } => {
                points.clone()
            }
            Shape::Text { anchor, .. } | Shape::Signature { anchor, .. } => vec![*anchor],
        }
    }
}

fn require_points(
    kind: AnnotationKind,
    points: &[Point],
    min: usize,
    expected: &'static str,
) -> Result<(), AnnotationError> {
    if points.len() < min {
        return Err(AnnotationError::PointCount {
            kind,
            expected,
            actual: points.len(),
        });
    }
    Ok(())
}

/// Attributes stamped onto an annotation at commit time
#[derive(Debug, Clone, PartialEq)]
pub struct Stamp {
    pub color: String,
    pub stroke_width: f32,
    pub page: u32,
    pub timestamp_ms: i64,
}

impl Stamp {
    pub fn now(color: &str, stroke_width: f32, page: u32) -> Self {
        Self {
            color: color.to_string(),
            stroke_width,
            page,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// A committed annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnnotationRecord", into = "AnnotationRecord")]
pub struct Annotation {
    pub id: AnnotationId,
    /// 1-based page number
    pub page: u32,
    pub timestamp: i64,
    pub color: String,
    pub stroke_width: f32,
    pub shape: Shape,
}

impl Annotation {
    /// Create an annotation with a fresh id
    pub fn create(shape: Shape, stamp: &Stamp) -> Self {
        Self {
            id: AnnotationId::generate(stamp.timestamp_ms),
            page: stamp.page.max(1),
            timestamp: stamp.timestamp_ms,
            color: resolve_color(&stamp.color),
            stroke_width: sanitize_stroke_width(stamp.stroke_width),
            shape,
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        self.shape.kind()
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self.shape, Shape::Polygon { .. })
    }

    /// Short human-readable description for lists
    pub fn summary(&self) -> String {
        match &self.shape {
            Shape::Text { text, .. } => format!("Text \"{}\"", truncate(text, 24)),
            Shape::Circle { radius, .. } => format!("Circle r={:.0}", radius),
            shape => {
                let count = shape.points().len();
                format!("{} ({} pts)", shape.kind().display_name(), count)
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

fn sanitize_stroke_width(width: f32) -> f32 {
    if width.is_finite() {
        width.max(MIN_STROKE_WIDTH)
    } else {
        INITIAL_STROKE_WIDTH
    }
}

fn first_page() -> u32 {
    1
}

fn default_stroke_width() -> f32 {
    INITIAL_STROKE_WIDTH
}

/// Flat interchange record, as written to exported snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotationRecord {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    points: Vec<Point>,
    #[serde(default)]
    color: String,
    #[serde(default = "default_stroke_width")]
    stroke_width: f32,
    #[serde(default = "first_page")]
    page: u32,
    #[serde(default)]
    timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f32>,
}

impl From<Annotation> for AnnotationRecord {
    fn from(annotation: Annotation) -> Self {
        let mut record = AnnotationRecord {
            id: annotation.id.to_string(),
            kind: annotation.kind().tag().to_string(),
            points: annotation.shape.points(),
            color: annotation.color,
            stroke_width: annotation.stroke_width,
            page: annotation.page,
            timestamp: annotation.timestamp,
            radius: None,
            text: None,
            font_size: None,
            signature_data: None,
            width: None,
            height: None,
        };

        match annotation.shape {
            Shape::Circle { radius, .. } => record.radius = Some(radius),
            Shape::Text {
                text, font_size, ..
            } => {
                record.text = Some(text);
                record.font_size = Some(font_size);
            }
            Shape::Signature {
                data,
                width,
                height,
                ..
            } => {
                record.signature_data = Some(data);
                record.width = Some(width);
                record.height = Some(height);
            }
            _ => {}
        }

        record
    }
}

impl TryFrom<AnnotationRecord> for Annotation {
    type Error = AnnotationError;

    fn try_from(record: AnnotationRecord) -> Result<Self, Self::Error> {
        let kind = AnnotationKind::from_tag(&record.kind)
            .ok_or_else(|| AnnotationError::UnknownType(record.kind.clone()))?;

        if record.points.iter().any(|p| !p.is_finite()) {
            return Err(AnnotationError::InvalidValue {
                kind,
                field: "points",
            });
        }

        let exactly = |n: usize, expected: &'static str| -> Result<(), AnnotationError> {
            if record.points.len() == n {
                Ok(())
            } else {
                Err(AnnotationError::PointCount {
                    kind,
                    expected,
                    actual: record.points.len(),
                })
            }
        };

        let shape = match kind {
            AnnotationKind::Line => {
                exactly(2, "exactly 2")?;
                Shape::line(record.points[0], record.points[1])
            }
            AnnotationKind::Rectangle => {
                exactly(2, "exactly 2")?;
                Shape::rectangle(record.points[0], record.points[1])
            }
            AnnotationKind::Circle => {
                exactly(1, "exactly 1")?;
                let radius = record.radius.ok_or(AnnotationError::MissingField {
                    kind,
                    field: "radius",
                })?;
                Shape::circle(record.points[0], radius)?
            }
            AnnotationKind::Triangle => {
                exactly(3, "exactly 3")?;
                Shape::triangle([record.points[0], record.points[1], record.points[2]])
            }
            AnnotationKind::Polygon => Shape::polygon(record.points.clone())?,
            AnnotationKind::Curve => Shape::curve(record.points.clone())?,
            AnnotationKind::Pencil => Shape::pencil(record.points.clone())?,
            AnnotationKind::Text => {
                exactly(1, "exactly 1")?;
                let text = record.text.clone().ok_or(AnnotationError::MissingField {
                    kind,
                    field: "text",
                })?;
                Shape::text(
                    record.points[0],
                    text,
                    record.font_size.unwrap_or(crate::constants::DEFAULT_FONT_SIZE),
                )
            }
            AnnotationKind::Signature => {
                exactly(1, "exactly 1")?;
                let data = record
                    .signature_data
                    .clone()
                    .ok_or(AnnotationError::MissingField {
                        kind,
                        field: "signatureData",
                    })?;
                Shape::Signature {
                    anchor: record.points[0],
                    data,
                    width: record.width.unwrap_or(SIGNATURE_WIDTH).max(1.0),
                    height: record.height.unwrap_or(SIGNATURE_HEIGHT).max(1.0),
                }
            }
        };

        if record.id.trim().is_empty() {
            return Err(AnnotationError::MissingField { kind, field: "id" });
        }

        Ok(Annotation {
            id: AnnotationId::from(record.id),
            page: record.page.max(1),
            timestamp: record.timestamp,
            color: resolve_color(&record.color),
            stroke_width: sanitize_stroke_width(record.stroke_width),
            shape,
        })
    }
}
