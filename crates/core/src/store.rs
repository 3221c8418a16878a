//! Ordered, in-memory annotation collection.
//!
//! Invariants maintained by every operation:
//! - at most one annotation per identity key `(video_url, start, end)`;
//! - label removal never leaves an empty label set behind (the annotation
//!   is deleted instead);
//! - the most recently created or mutated annotation is first.
//!
//! A failed operation leaves the collection untouched.

use crate::annotation::{Annotation, ClipPayload};
use crate::error::CoreError;
use crate::segment::Segment;

/// What a [`AnnotationStore::toggle_label`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// No annotation existed for the key; one was created with the label.
    Created,
    /// The label was added to an existing annotation.
    Added,
    /// The label was removed and other labels remain.
    Removed,
    /// The last label was removed, so the annotation was deleted.
    Deleted,
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from already-migrated annotations, in the given order.
    ///
    /// Later annotations whose key duplicates an earlier one are dropped.
    pub fn from_annotations(annotations: Vec<Annotation>) -> Self {
        let mut kept: Vec<Annotation> = Vec::with_capacity(annotations.len());
        for ann in annotations {
            if kept.iter().any(|k| k.same_key(&ann)) {
                tracing::warn!(annotation_id = %ann.id, "Dropping annotation with duplicate key");
                continue;
            }
            kept.push(ann);
        }
        Self { annotations: kept }
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Annotations in current order, most recently touched first.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// An owned point-in-time copy of the collection for export or
    /// persistence.
    pub fn snapshot(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }

    /// Exact-match lookup by identity key.
    pub fn find_by_key(&self, segment: &Segment) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.is_keyed_by(segment))
    }

    fn position_of(&self, segment: &Segment) -> Option<usize> {
        self.annotations.iter().position(|a| a.is_keyed_by(segment))
    }

    /// Detach the annotation at `idx` and reinsert it at the front.
    fn move_to_front(&mut self, idx: usize) -> &mut Annotation {
        let ann = self.annotations.remove(idx);
        self.annotations.insert(0, ann);
        &mut self.annotations[0]
    }

    /// Add `label` to the annotation for `segment`, or remove it if present.
    ///
    /// Creates the annotation when the key is unseen. Removing the last
    /// label deletes the annotation; any other change moves it to the front.
    pub fn toggle_label(&mut self, segment: &Segment, label: &str) -> ToggleOutcome {
        let Some(idx) = self.position_of(segment) else {
            let ann = Annotation::new(segment, vec![label.to_string()]);
            tracing::debug!(annotation_id = %ann.id, label, "Annotation created");
            self.annotations.insert(0, ann);
            return ToggleOutcome::Created;
        };

        if self.annotations[idx].has_label(label) && self.annotations[idx].labels.len() == 1 {
            let removed = self.annotations.remove(idx);
            tracing::debug!(annotation_id = %removed.id, label, "Last label removed, annotation deleted");
            return ToggleOutcome::Deleted;
        }

        let ann = self.move_to_front(idx);
        if ann.toggle_label(label) {
            tracing::debug!(annotation_id = %ann.id, label, labels = ann.labels.len(), "Label added");
            ToggleOutcome::Added
        } else {
            tracing::debug!(annotation_id = %ann.id, label, labels = ann.labels.len(), "Label removed");
            ToggleOutcome::Removed
        }
    }

    /// Attach a clip to the annotation for `segment` and move it to the front.
    ///
    /// An unseen key creates an annotation with no labels. This is the only
    /// way an annotation can exist without labels.
    pub fn attach_clip(&mut self, segment: &Segment, filename: impl Into<String>, payload: ClipPayload) {
        let filename = filename.into();
        let ann = match self.position_of(segment) {
            Some(idx) => self.move_to_front(idx),
            None => {
                self.annotations.insert(0, Annotation::new(segment, Vec::new()));
                &mut self.annotations[0]
            }
        };
        tracing::debug!(annotation_id = %ann.id, filename = %filename, "Clip attached");
        ann.clip_filename = Some(filename);
        ann.clip_payload = Some(payload);
    }

    /// Set or clear the notes of the annotation for `segment`.
    ///
    /// Blank notes clear the field. The annotation moves to the front.
    pub fn set_notes(&mut self, segment: &Segment, notes: Option<String>) -> Result<(), CoreError> {
        let idx = self.position_of(segment).ok_or_else(|| {
            CoreError::InvalidSegment(format!(
                "no annotation for {} [{}, {}]",
                segment.video_url, segment.start, segment.end
            ))
        })?;
        let ann = self.move_to_front(idx);
        ann.notes = notes.filter(|n| !n.trim().is_empty());
        Ok(())
    }

    /// Remove and return the annotation at `position` in current order.
    pub fn delete_at(&mut self, position: usize) -> Result<Annotation, CoreError> {
        if position >= self.annotations.len() {
            return Err(CoreError::PositionOutOfRange {
                position,
                len: self.annotations.len(),
            });
        }
        let removed = self.annotations.remove(position);
        tracing::debug!(annotation_id = %removed.id, position, "Annotation deleted");
        Ok(removed)
    }
}
