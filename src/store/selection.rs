use bevy::prelude::*;

use crate::annotation::{Annotation, AnnotationId};

/// Selected annotation ids, kept in selection order.
///
/// Polygons go to their own set, which gates merging.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Selection {
    general: Vec<AnnotationId>,
    polygons: Vec<AnnotationId>,
}

impl Selection {
    /// Add the annotation to its set, or remove it if already there
    pub fn toggle(&mut self, annotation: &Annotation) {
        let set = if annotation.is_polygon() {
            &mut self.polygons
        } else {
            &mut self.general
        };

        if let Some(pos) = set.iter().position(|id| id == &annotation.id) {
            set.remove(pos);
        } else {
            set.push(annotation.id.clone());
        }
    }

    pub fn contains(&self, id: &AnnotationId) -> bool {
        self.general.contains(id) || self.polygons.contains(id)
    }

    pub fn general(&self) -> &[AnnotationId] {
        &self.general
    }

    pub fn polygons(&self) -> &[AnnotationId] {
        &self.polygons
    }

    pub fn total(&self) -> usize {
        self.general.len() + self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn clear(&mut self) {
        self.general.clear();
        self.polygons.clear();
    }

    pub fn clear_polygons(&mut self) {
        self.polygons.clear();
    }

    /// Drop ids that no longer exist (after undo/redo)
    pub fn retain_existing(&mut self, annotations: &[Annotation]) {
        let exists = |id: &AnnotationId| annotations.iter().any(|a| &a.id == id);
        self.general.retain(exists);
        self.polygons.retain(exists);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Point, Shape, Stamp};

    fn stamp() -> Stamp {
        Stamp {
            color: "#000".to_string(),
            stroke_width: 1.0,
            page: 1,
            timestamp_ms: 0,
        }
    }

    #[test]
    fn test_toggle_routes_polygons() {
        let poly = Annotation::create(Shape::Polygon { points: vec![Point::ZERO; 3] }, &stamp());
        let line = Annotation::create(Shape::line(Point::ZERO, Point::new(1.0, 1.0)), &stamp());
        let mut selection = Selection::default();

        selection.toggle(&poly);
        selection.toggle(&line);
        assert_eq!(selection.polygons(), &[poly.id.clone()]);
        assert_eq!(selection.general(), &[line.id.clone()]);
        assert_eq!(selection.total(), 2);

        selection.toggle(&poly);
        assert!(selection.polygons().is_empty());
        assert!(!selection.contains(&poly.id));
    }
}
