//! Annotation session: the store and label catalog wired to their external
//! collaborators.
//!
//! Every successful store mutation hands the full snapshot to the
//! [`SnapshotSink`]; sink failures are logged and never roll back or block
//! the mutation. Clip downloads go through a [`ClipFetcher`] and only touch
//! the store once the payload has fully arrived, so a failed or dropped
//! download leaves the store as it was.

use async_trait::async_trait;

use crate::annotation::{Annotation, ClipPayload};
use crate::error::CoreError;
use crate::export::{self, ArchiveExport, EmptyArchivePolicy, ExportFile};
use crate::labels::LabelCatalog;
use crate::migration::MigratedDocument;
use crate::segment::Segment;
use crate::store::{AnnotationStore, ToggleOutcome};

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Receives the current state after each change, for external persistence.
pub trait SnapshotSink {
    fn persist_annotations(&self, snapshot: &[Annotation]) -> anyhow::Result<()>;

    fn persist_labels(&self, labels: &LabelCatalog) -> anyhow::Result<()>;
}

/// Sink that persists nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl SnapshotSink for NoopSink {
    fn persist_annotations(&self, _snapshot: &[Annotation]) -> anyhow::Result<()> {
        Ok(())
    }

    fn persist_labels(&self, _labels: &LabelCatalog) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A clip produced by a [`ClipFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedClip {
    pub bytes: Vec<u8>,
    /// Filename suggested by the fetcher, if any.
    pub filename: Option<String>,
}

/// Produces the binary clip for a segment (download + cut).
#[async_trait]
pub trait ClipFetcher: Send + Sync {
    async fn fetch_clip(&self, segment: &Segment) -> anyhow::Result<FetchedClip>;
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct AnnotationSession<S: SnapshotSink> {
    store: AnnotationStore,
    labels: LabelCatalog,
    sink: S,
}

impl<S: SnapshotSink> AnnotationSession<S> {
    /// Start a session with no annotations and the default label catalog.
    pub fn new(sink: S) -> Self {
        Self {
            store: AnnotationStore::new(),
            labels: LabelCatalog::with_defaults(),
            sink,
        }
    }

    /// Start a session seeded from a migrated persisted document.
    pub fn from_document(document: MigratedDocument, sink: S) -> Self {
        Self {
            store: AnnotationStore::from_annotations(document.annotations),
            labels: document.labels,
            sink,
        }
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn labels(&self) -> &LabelCatalog {
        &self.labels
    }

    fn persist_annotations(&self) {
        if let Err(e) = self.sink.persist_annotations(self.store.annotations()) {
            tracing::warn!(error = %e, annotations = self.store.len(), "Failed to persist annotations");
        }
    }

    fn persist_labels(&self) {
        if let Err(e) = self.sink.persist_labels(&self.labels) {
            tracing::warn!(error = %e, "Failed to persist labels");
        }
    }

    // -- label catalog --

    pub fn add_label(&mut self, name: &str) -> bool {
        let changed = self.labels.add(name);
        if changed {
            self.persist_labels();
        }
        changed
    }

    pub fn remove_label(&mut self, name: &str) -> bool {
        let changed = self.labels.remove(name);
        if changed {
            self.persist_labels();
        }
        changed
    }

    // -- annotations --

    pub fn toggle_label(&mut self, segment: &Segment, label: &str) -> ToggleOutcome {
        let outcome = self.store.toggle_label(segment, label);
        self.persist_annotations();
        outcome
    }

    pub fn attach_clip(&mut self, segment: &Segment, filename: impl Into<String>, payload: ClipPayload) {
        self.store.attach_clip(segment, filename, payload);
        self.persist_annotations();
    }

    pub fn set_notes(&mut self, segment: &Segment, notes: Option<String>) -> Result<(), CoreError> {
        self.store.set_notes(segment, notes)?;
        self.persist_annotations();
        Ok(())
    }

    pub fn delete_at(&mut self, position: usize) -> Result<Annotation, CoreError> {
        let removed = self.store.delete_at(position)?;
        self.persist_annotations();
        Ok(removed)
    }

    /// Fetch the clip for `segment` and attach it.
    ///
    /// Returns the filename the clip was stored under: the fetcher's
    /// suggestion, or `clip_{start}_{end}.mp4`. A name already used by
    /// another annotation's clip gets a ` (n)` suffix.
    pub async fn download_clip<F>(&mut self, fetcher: &F, segment: &Segment) -> Result<String, CoreError>
    where
        F: ClipFetcher + ?Sized,
    {
        let clip = fetcher.fetch_clip(segment).await.map_err(|e| {
            tracing::warn!(video_url = %segment.video_url, error = %e, "Clip download failed");
            CoreError::ClipFetch(e.to_string())
        })?;

        let preferred = clip
            .filename
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| export::default_clip_filename(segment.start, segment.end));
        let filename = export::unique_clip_filename(&preferred, |candidate| {
            self.store.annotations().iter().any(|a| {
                !a.is_keyed_by(segment) && a.clip_filename.as_deref() == Some(candidate)
            })
        });
        tracing::info!(
            video_url = %segment.video_url,
            filename = %filename,
            bytes = clip.bytes.len(),
            "Clip downloaded",
        );
        self.attach_clip(segment, filename.clone(), ClipPayload::Binary(clip.bytes));
        Ok(filename)
    }

    // -- export --

    pub fn export_csv(&self) -> ExportFile {
        export::export_csv(&self.store.snapshot())
    }

    pub fn export_archive(&self, on_empty: EmptyArchivePolicy) -> Result<ArchiveExport, CoreError> {
        export::export_archive(&self.store.snapshot(), on_empty)
    }
}
