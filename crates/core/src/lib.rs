//! `clipmark-core`: time-ranged video annotation model and export encoders.
//!
//! - [`time`] parses operator time expressions into seconds.
//! - [`store::AnnotationStore`] owns annotation identity, label toggling
//!   and most-recently-touched ordering.
//! - [`export`] renders snapshots as CSV or as a ZIP archive with clips.
//! - [`migration`] turns persisted documents into canonical annotations.
//! - [`session::AnnotationSession`] wires the store to persistence and
//!   clip-download collaborators.
//!
//! No module here performs I/O of its own; collaborators are traits.

pub mod annotation;
pub mod error;
pub mod export;
pub mod labels;
pub mod migration;
pub mod segment;
pub mod session;
pub mod store;
pub mod time;
pub mod types;
pub mod video;

pub use annotation::{Annotation, ClipPayload};
pub use error::CoreError;
pub use labels::LabelCatalog;
pub use segment::Segment;
pub use session::{AnnotationSession, ClipFetcher, FetchedClip, NoopSink, SnapshotSink};
pub use store::{AnnotationStore, ToggleOutcome};
