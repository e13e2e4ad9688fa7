//! Linear snapshot history for undo/redo.

use crate::annotation::Annotation;

/// Full-collection snapshots plus the index of the one currently shown.
///
/// Invariant: `index < snapshots.len()`; the first snapshot always exists.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Vec<Annotation>>,
    index: usize,
    seeded: bool,
}

impl Default for History {
    fn default() -> Self {
        Self {
            snapshots: vec![Vec::new()],
            index: 0,
            seeded: false,
        }
    }
}

impl History {
    /// Drop every snapshot after the current one, then append a copy of `collection`
    pub fn save(&mut self, collection: &[Annotation]) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(collection.to_vec());
        self.index = self.snapshots.len() - 1;
    }

    /// Step back, returning the snapshot to show. `None` at the first entry.
    pub fn undo(&mut self) -> Option<&[Annotation]> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.snapshots[self.index])
    }

    /// Step forward, returning the snapshot to show. `None` at the last entry.
    pub fn redo(&mut self) -> Option<&[Annotation]> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        Some(&self.snapshots[self.index])
    }

    /// Fold externally loaded annotations into the first snapshot.
    ///
    /// Only applies once, and only while nothing has been recorded yet, so a
    /// repeated seed can't wipe redo state. Returns whether the seed was taken.
    pub fn seed(&mut self, collection: &[Annotation]) -> bool {
        if self.seeded || !self.is_pristine() || collection.is_empty() {
            return false;
        }
        self.snapshots[0] = collection.to_vec();
        self.seeded = true;
        true
    }

    pub fn is_pristine(&self) -> bool {
        self.snapshots.len() == 1 && self.snapshots[0].is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &[Annotation] {
        &self.snapshots[self.index]
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
