//! Hit testing and bounds for annotations.
//!
//! All functions are pure and tolerate malformed shapes (too few points,
//! non-finite values) by reporting "no hit" instead of panicking.

use bevy::math::Vec2;

use crate::annotation::{Annotation, Point, Shape};
use crate::constants::LINE_HIT_TOLERANCE;

/// Distance from `point` to the segment `a`-`b`
pub fn distance_to_segment(point: Point, a: Point, b: Point) -> f32 {
    let p: Vec2 = point.into();
    let start: Vec2 = a.into();
    let segment = Vec2::from(b) - start;
    let len_sq = segment.length_squared();

    if len_sq < 0.0001 {
        // Segment is essentially a point
        return p.distance(start);
    }

    // Project onto the segment, clamped to its ends
    let t = ((p - start).dot(segment) / len_sq).clamp(0.0, 1.0);
    p.distance(start + segment * t)
}

/// Even-odd ray cast. Polygons with fewer than 3 points contain nothing.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

pub fn point_in_circle(point: Point, center: Point, radius: f32) -> bool {
    point.distance(center) <= radius
}

/// Inclusive test against the box spanned by two corners in any order
pub fn point_in_rect(point: Point, corner_a: Point, corner_b: Point) -> bool {
    let (min, max) = normalize_rect(corner_a, corner_b);
    point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
}

/// Order two corners into (min, max)
pub fn normalize_rect(a: Point, b: Point) -> (Point, Point) {
    (
        Point::new(a.x.min(b.x), a.y.min(b.y)),
        Point::new(a.x.max(b.x), a.y.max(b.y)),
    )
}

/// Estimated extent of a single line of text
pub fn text_extent(text: &str, font_size: f32) -> (f32, f32) {
    let width = (text.chars().count() as f32 * font_size * 0.6).max(font_size);
    (width, font_size * 1.2)
}

fn near_polyline(point: Point, points: &[Point], threshold: f32) -> bool {
    points
        .windows(2)
        .any(|w| distance_to_segment(point, w[0], w[1]) <= threshold)
}

/// Whether `point` touches the annotation
pub fn hit_test(annotation: &Annotation, point: Point) -> bool {
    match &annotation.shape {
        Shape::Line { start, end } => {
            distance_to_segment(point, *start, *end)
                <= LINE_HIT_TOLERANCE + annotation.stroke_width / 2.0
        }
        Shape::Rectangle { corner_a, corner_b } => point_in_rect(point, *corner_a, *corner_b),
        Shape::Circle { center, radius } => point_in_circle(point, *center, *radius),
        Shape::Triangle { points } => point_in_polygon(point, points),
        Shape::Polygon { points } => point_in_polygon(point, points),
        Shape::Curve { points } | Shape::Pencil { points } => {
            // Hit area is at least 8 units wide
            let threshold = (annotation.stroke_width * 2.0).max(8.0);
            near_polyline(point, points, threshold)
        }
        Shape::Text {
            anchor,
            text,
            font_size,
        } => {
            let (w, h) = text_extent(text, *font_size);
            point_in_rect(point, *anchor, anchor.offset(w, h))
        }
        Shape::Signature {
            anchor,
            width,
            height,
            ..
        } => point_in_rect(point, *anchor, anchor.offset(*width, *height)),
    }
}

/// Bounding box (min, max) padded by the stroke width.
/// Returns `None` for shapes without any points.
pub fn bounds(annotation: &Annotation) -> Option<(Point, Point)> {
    let (min, max) = match &annotation.shape {
        Shape::Circle { center, radius } => (
            center.offset(-radius, -radius),
            center.offset(*radius, *radius),
        ),
        Shape::Text {
            anchor,
            text,
            font_size,
        } => {
            let (w, h) = text_extent(text, *font_size);
            (*anchor, anchor.offset(w, h))
        }
        Shape::Signature {
            anchor,
            width,
            height,
            ..
        } => (*anchor, anchor.offset(*width, *height)),
        shape => {
            let points = shape.points();
            let first = *points.first()?;
            points.iter().fold((first, first), |(min, max), p| {
                (
                    Point::new(min.x.min(p.x), min.y.min(p.y)),
                    Point::new(max.x.max(p.x), max.y.max(p.y)),
                )
            })
        }
    };

    let padding = annotation.stroke_width;
    Some((min.offset(-padding, -padding), max.offset(padding, padding)))
}

/// Topmost (most recently drawn) annotation on `page` under `point`
pub fn find_annotation_at(annotations: &[Annotation], page: u32, point: Point) -> Option<&Annotation> {
    annotations
        .iter()
        .rev()
        .filter(|a| a.page == page)
        .find(|a| hit_test(a, point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Stamp;

    fn stamp(page: u32) -> Stamp {
        Stamp {
            color: "#000000".to_string(),
            stroke_width: 2.0,
            page,
            timestamp_ms: 0,
        }
    }

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_point_in_polygon() {
        assert!(point_in_polygon(Point::new(5.0, 5.0), &square()));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &square()));
    }

    #[test]
    fn test_point_in_degenerate_polygon() {
        assert!(!point_in_polygon(Point::new(0.0, 0.0), &[Point::ZERO, Point::ZERO]));
        assert!(!point_in_polygon(Point::new(0.0, 0.0), &[]));
    }

    #[test]
    fn test_distance_to_segment() {
        let d = distance_to_segment(Point::new(5.0, 3.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-5);

        // Beyond the end clamps to the endpoint
        let d = distance_to_segment(Point::new(13.0, 4.0), Point::ZERO, Point::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_length_segment() {
        let d = distance_to_segment(Point::new(3.0, 4.0), Point::ZERO, Point::ZERO);
        assert!((d - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_rect_accepts_unordered_corners() {
        assert!(point_in_rect(Point::new(5.0, 5.0), Point::new(10.0, 10.0), Point::ZERO));
        assert!(point_in_rect(Point::new(10.0, 10.0), Point::new(10.0, 10.0), Point::ZERO));
        assert!(!point_in_rect(Point::new(11.0, 5.0), Point::new(10.0, 10.0), Point::ZERO));
    }

    #[test]
    fn test_circle_boundary_is_inside() {
        assert!(point_in_circle(Point::new(3.0, 4.0), Point::ZERO, 5.0));
        assert!(!point_in_circle(Point::new(3.1, 4.0), Point::ZERO, 5.0));
    }

    #[test]
    fn test_line_hit_tolerance() {
        let line = Annotation::create(Shape::line(Point::ZERO, Point::new(100.0, 0.0)), &stamp(1));
        assert!(hit_test(&line, Point::new(50.0, 5.0)));
        assert!(!hit_test(&line, Point::new(50.0, 7.0)));
    }

    #[test]
    fn test_signature_hit_box() {
        let sig = Annotation::create(Shape::signature(Point::new(10.0, 10.0), "data:"), &stamp(1));
        assert!(hit_test(&sig, Point::new(209.0, 109.0)));
        assert!(!hit_test(&sig, Point::new(211.0, 50.0)));
    }

    #[test]
    fn test_malformed_polygon_never_hits() {
        let mut poly = Annotation::create(Shape::Polygon { points: square() }, &stamp(1));
        poly.shape = Shape::Polygon {
            points: vec![Point::ZERO],
        };
        assert!(!hit_test(&poly, Point::ZERO));
    }

    #[test]
    fn test_find_topmost_on_page() {
        let bottom = Annotation::create(Shape::Polygon { points: square() }, &stamp(1));
        let top = Annotation::create(Shape::rectangle(Point::ZERO, Point::new(6.0, 6.0)), &stamp(1));
        let other_page = Annotation::create(Shape::rectangle(Point::ZERO, Point::new(6.0, 6.0)), &stamp(2));
        let all = vec![bottom.clone(), top.clone(), other_page];

        assert_eq!(find_annotation_at(&all, 1, Point::new(3.0, 3.0)).map(|a| &a.id), Some(&top.id));
        assert_eq!(find_annotation_at(&all, 1, Point::new(8.0, 8.0)).map(|a| &a.id), Some(&bottom.id));
        assert!(find_annotation_at(&all, 1, Point::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_bounds_padded_by_stroke() {
        let line = Annotation::create(Shape::line(Point::new(1.0, 5.0), Point::new(9.0, 3.0)), &stamp(1));
        let (min, max) = bounds(&line).unwrap();
        assert_eq!(min, Point::new(-1.0, 1.0));
        assert_eq!(max, Point::new(11.0, 7.0));
    }
}
