//! Path construction for each shape.
//!
//! Builders return `None` when there aren't enough points, which callers treat
//! as "skip this shape".

use crate::annotation::Point;
use crate::geometry::normalize_rect;

use super::surface::PathCommand;

pub fn segment(a: Point, b: Point) -> Vec<PathCommand> {
    vec![PathCommand::MoveTo(a), PathCommand::LineTo(b)]
}

pub fn rectangle(a: Point, b: Point) -> Vec<PathCommand> {
    let (min, max) = normalize_rect(a, b);
    vec![
        PathCommand::MoveTo(min),
        PathCommand::LineTo(Point::new(max.x, min.y)),
        PathCommand::LineTo(max),
        PathCommand::LineTo(Point::new(min.x, max.y)),
        PathCommand::Close,
    ]
}

pub fn circle(center: Point, radius: f32) -> Option<Vec<PathCommand>> {
    if !radius.is_finite() || radius <= 0.0 {
        return None;
    }
    Some(vec![PathCommand::Circle { center, radius }])
}

/// Straight segments through every point
pub fn polyline(points: &[Point]) -> Option<Vec<PathCommand>> {
    let (first, rest) = points.split_first()?;
    let mut path = Vec::with_capacity(points.len());
    path.push(PathCommand::MoveTo(*first));
    path.extend(rest.iter().map(|p| PathCommand::LineTo(*p)));
    Some(path)
}

/// Closed polygon through at least `min_points` points
pub fn closed(points: &[Point], min_points: usize) -> Option<Vec<PathCommand>> {
    if points.len() < min_points.max(2) {
        return None;
    }
    let mut path = polyline(points)?;
    path.push(PathCommand::Close);
    Some(path)
}

/// Midpoint-chained quadratic smoothing.
///
/// Each interior point is a control point and each curve ends halfway to the
/// next point; a final straight segment reaches the true last point.
pub fn midpoint_chain(points: &[Point]) -> Option<Vec<PathCommand>> {
    match points {
        [] | [_] => None,
        [a, b] => Some(segment(*a, *b)),
        [first, .., last] => {
            let mut path = vec![PathCommand::MoveTo(*first)];
            for pair in points[1..].windows(2) {
                let (current, next) = (pair[0], pair[1]);
                path.push(PathCommand::QuadTo(current, current.midpoint(next)));
            }
            path.push(PathCommand::LineTo(*last));
            Some(path)
        }
    }
}

/// Curve shape: two points draw a segment, three a single quadratic through
/// the middle point, more use [`midpoint_chain`]
pub fn curve(points: &[Point]) -> Option<Vec<PathCommand>> {
    match points {
        [a, b, c] => Some(vec![PathCommand::MoveTo(*a), PathCommand::QuadTo(*b, *c)]),
        _ => midpoint_chain(points),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_rectangle_normalizes_corners() {
        let path = rectangle(p(50.0, 80.0), p(10.0, 10.0));
        assert_eq!(path[0], PathCommand::MoveTo(p(10.0, 10.0)));
        assert_eq!(path[2], PathCommand::LineTo(p(50.0, 80.0)));
        assert_eq!(path.last(), Some(&PathCommand::Close));
    }

    #[test]
    fn test_curve_three_points_single_quadratic() {
        let path = curve(&[p(0.0, 0.0), p(5.0, 10.0), p(10.0, 0.0)]).unwrap();
        assert_eq!(
            path,
            vec![
                PathCommand::MoveTo(p(0.0, 0.0)),
                PathCommand::QuadTo(p(5.0, 10.0), p(10.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_midpoint_chain_four_points() {
        let pts = [p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)];
        let path = midpoint_chain(&pts).unwrap();
        assert_eq!(
            path,
            vec![
                PathCommand::MoveTo(p(0.0, 0.0)),
                PathCommand::QuadTo(p(10.0, 0.0), p(10.0, 5.0)),
                PathCommand::QuadTo(p(10.0, 10.0), p(5.0, 10.0)),
                PathCommand::LineTo(p(0.0, 10.0)),
            ]
        );
    }

    #[test]
    fn test_midpoint_chain_two_points_is_segment() {
        let path = midpoint_chain(&[p(0.0, 0.0), p(3.0, 4.0)]).unwrap();
        assert_eq!(path, segment(p(0.0, 0.0), p(3.0, 4.0)));
    }

    #[test]
    fn test_too_few_points() {
        assert!(midpoint_chain(&[p(0.0, 0.0)]).is_none());
        assert!(closed(&[p(0.0, 0.0), p(1.0, 1.0)], 3).is_none());
        assert!(circle(p(0.0, 0.0), 0.0).is_none());
        assert!(polyline(&[]).is_none());
    }
}
