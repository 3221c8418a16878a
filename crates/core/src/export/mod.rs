//! Export encoders for annotation snapshots.
//!
//! Both encoders are pure functions of the snapshot slice they are given:
//! the same annotations always produce the same bytes. Callers pass a
//! snapshot (see [`AnnotationStore::snapshot`](crate::store::AnnotationStore::snapshot)),
//! never a live collection.

pub mod archive;
pub mod csv;

pub use archive::{export_archive, ArchiveExport, EmptyArchivePolicy, SkipReason, SkippedClip};
pub use csv::{export_csv, render_csv, CsvLayout};

use crate::types::Seconds;

/// Suggested filename for the standalone CSV export, and the CSV entry
/// name inside the archive.
pub const CSV_FILENAME: &str = "annotations.csv";

/// Suggested filename for the archive export.
pub const ARCHIVE_FILENAME: &str = "annotations_and_clips.zip";

/// Extension used for generated clip entry names.
pub const CLIP_EXTENSION: &str = "mp4";

/// A completed export payload with the filename it should be saved as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Render a time bound for export. Non-finite values render as an empty
/// string rather than a substitute number.
///
/// Uses `f64`'s `Display`, which never switches to exponent notation:
/// `1e21` renders as `1000000000000000000000`, not `1e+21`. Only bounds far
/// beyond any real video length are affected.
pub fn format_seconds(value: Seconds) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

/// Default clip filename for a segment, e.g. `clip_10_20.5.mp4`.
pub fn default_clip_filename(start: Seconds, end: Seconds) -> String {
    format!(
        "clip_{}_{}.{CLIP_EXTENSION}",
        format_seconds(start),
        format_seconds(end)
    )
}

/// `name` if it is free, otherwise the first free `stem (n).ext` for
/// `n = 2, 3, ...`.
pub fn unique_clip_filename(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };
    let mut n = 2u32;
    loop {
        let candidate = format!("{stem} ({n}){ext}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
