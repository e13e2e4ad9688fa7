//! Live annotation collection with its undo/redo history.

use bevy::prelude::*;
use thiserror::Error;

use crate::annotation::{Annotation, AnnotationId, Shape, Stamp};

use super::history::History;
use super::selection::Selection;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeError {
    #[error("select at least two polygons to merge ({0} selected)")]
    NotEnoughPolygons(usize),
}

/// Whether a bulk replacement becomes its own undo step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Record {
    Yes,
    No,
}

/// How an import was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Folded into the initial history entry (nothing to undo)
    Seeded,
    /// Recorded as a new undo step
    Replaced,
}

/// Resource owning the committed annotations and their history.
///
/// Every mutation goes through a method that updates the collection and the
/// history together, so the two are never observed out of step.
#[derive(Resource, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    history: History,
    /// Bumped on every change to the live collection
    revision: u64,
}

impl AnnotationStore {
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn for_page(&self, page: u32) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.page == page)
    }

    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| &a.id == id)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Append a committed annotation and record the new collection
    pub fn add(&mut self, annotation: Annotation) {
        debug!("Committed {} {}", annotation.kind(), annotation.id);
        self.annotations.push(annotation);
        self.history.save(&self.annotations);
        self.revision += 1;
    }

    /// Load annotations from an exported snapshot.
    ///
    /// A store with no history yet takes them as its starting state; otherwise
    /// the import replaces the collection as one undoable step.
    pub fn import(&mut self, annotations: Vec<Annotation>) -> ImportMode {
        // Empty over empty changes nothing and must not become an undo step
        if annotations.is_empty() && self.history.is_pristine() {
            info!("Imported snapshot is empty; nothing to load");
            return ImportMode::Seeded;
        }
        if self.annotations.is_empty() && self.history.seed(&annotations) {
            self.annotations = annotations;
            self.revision += 1;
            info!("Seeded {} annotations", self.annotations.len());
            ImportMode::Seeded
        } else {
            self.replace_all(annotations, Record::Yes);
            info!("Imported {} annotations", self.annotations.len());
            ImportMode::Replaced
        }
    }

    /// Combine the selected polygons into one, in selection order.
    ///
    /// The sources are removed and the merged polygon is appended, as a single
    /// undo step. Clears the polygon selection.
    pub fn merge_polygons(
        &mut self,
        selection: &mut Selection,
        stamp: &Stamp,
    ) -> Result<AnnotationId, MergeError> {
        let sources: Vec<&Annotation> = selection
            .polygons()
            .iter()
            .filter_map(|id| self.get(id))
            .filter(|a| a.is_polygon())
            .collect();

        if sources.len() < 2 {
            return Err(MergeError::NotEnoughPolygons(sources.len()));
        }

        let points = sources
            .iter()
            .flat_map(|a| a.shape.points())
            .collect::<Vec<_>>();
        let merged = Annotation::create(Shape::Polygon { points }, stamp);
        let merged_id = merged.id.clone();

        let source_ids: Vec<AnnotationId> = sources.iter().map(|a| a.id.clone()).collect();
        let mut next: Vec<Annotation> = self
            .annotations
            .iter()
            .filter(|a| !source_ids.contains(&a.id))
            .cloned()
            .collect();
        next.push(merged);

        self.replace_all(next, Record::Yes);
        selection.clear_polygons();
        info!("Merged {} polygons into {}", source_ids.len(), merged_id);
        Ok(merged_id)
    }

    /// Remove everything in either selection set as one undo step.
    /// Clears the selection. Returns how many annotations were removed.
    pub fn delete_selected(&mut self, selection: &mut Selection) -> usize {
        let before = self.annotations.len();
        let next: Vec<Annotation> = self
            .annotations
            .iter()
            .filter(|a| !selection.contains(&a.id))
            .cloned()
            .collect();
        selection.clear();

        let removed = before - next.len();
        if removed > 0 {
            self.replace_all(next, Record::Yes);
            info!("Deleted {} selected annotations", removed);
        }
        removed
    }

    /// Remove a single annotation as one undo step
    pub fn delete(&mut self, id: &AnnotationId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let next = self
            .annotations
            .iter()
            .filter(|a| &a.id != id)
            .cloned()
            .collect();
        self.replace_all(next, Record::Yes);
        debug!("Deleted annotation {}", id);
        true
    }

    /// Remove every annotation on `page` as one undo step
    pub fn clear_page(&mut self, page: u32) -> usize {
        let before = self.annotations.len();
        let next: Vec<Annotation> = self
            .annotations
            .iter()
            .filter(|a| a.page != page)
            .cloned()
            .collect();
        let removed = before - next.len();
        if removed > 0 {
            self.replace_all(next, Record::Yes);
        }
        removed
    }

    /// Returns false when already at the oldest entry
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        let snapshot = snapshot.to_vec();
        self.replace_all(snapshot, Record::No);
        debug!("Undo -> history index {}", self.history.index());
        true
    }

    /// Returns false when already at the newest entry
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        let snapshot = snapshot.to_vec();
        self.replace_all(snapshot, Record::No);
        debug!("Redo -> history index {}", self.history.index());
        true
    }

    /// Forget all annotations and history (new document)
    pub fn reset(&mut self) {
        self.annotations.clear();
        self.history.clear();
        self.revision += 1;
    }

    fn replace_all(&mut self, collection: Vec<Annotation>, record: Record) {
        self.annotations = collection;
        if record == Record::Yes {
            self.history.save(&self.annotations);
        }
        self.revision += 1;
    }
}
