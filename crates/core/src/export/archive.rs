//! ZIP archive export: the CSV document plus one entry per attached clip.
//!
//! When no annotation carries a usable clip the encoder does not decide on
//! its own whether a CSV-only archive is acceptable. With
//! [`EmptyArchivePolicy::Reject`] it returns [`CoreError::NoAttachmentsFound`]
//! and produces nothing; the caller asks the operator and, if they agree,
//! calls again with [`EmptyArchivePolicy::CsvOnly`].
//!
//! Every usable clip gets its own entry. When two clips resolve to the same
//! name the later one is written as `stem (2).ext`, and the embedded CSV
//! names the entry each row's clip was actually written under.

use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::annotation::Annotation;
use crate::error::CoreError;
use crate::types::AnnotationId;

use super::csv::render_archive_csv;
use super::{default_clip_filename, unique_clip_filename, ExportFile, ARCHIVE_FILENAME, CSV_FILENAME};

/// What to do when the snapshot has no usable clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyArchivePolicy {
    /// Return [`CoreError::NoAttachmentsFound`] without producing output.
    Reject,
    /// Produce an archive holding only the CSV document.
    CsvOnly,
}

/// Why an attached clip was left out of the archive.
#[derive(Debug)]
pub enum SkipReason {
    /// The payload could not be normalized to bytes.
    Conversion(CoreError),
}

#[derive(Debug)]
pub struct SkippedClip {
    pub annotation_id: AnnotationId,
    pub reason: SkipReason,
}

/// A finished archive export.
#[derive(Debug)]
pub struct ArchiveExport {
    pub file: ExportFile,
    /// Number of clip entries written.
    pub clip_count: usize,
    /// Clips that were attached but left out.
    pub skipped: Vec<SkippedClip>,
}

/// Preferred entry name for an annotation's clip, before collisions are
/// resolved.
pub fn clip_entry_name(ann: &Annotation) -> String {
    ann.clip_filename
        .clone()
        .unwrap_or_else(|| default_clip_filename(ann.start_time, ann.end_time))
}

struct CollectedClips<'a> {
    entries: Vec<(String, Cow<'a, [u8]>)>,
    /// Entry name per annotation, `None` where no entry was written.
    entry_names: Vec<Option<String>>,
    skipped: Vec<SkippedClip>,
}

/// Collect normalized clip entries in snapshot order, giving each a unique
/// entry name.
fn collect_clips(annotations: &[Annotation]) -> CollectedClips<'_> {
    let mut taken: HashSet<String> = HashSet::from([CSV_FILENAME.to_string()]);
    let mut entries = Vec::new();
    let mut entry_names = Vec::with_capacity(annotations.len());
    let mut skipped = Vec::new();

    for ann in annotations {
        let bytes = match ann.clip_bytes() {
            None => {
                entry_names.push(None);
                continue;
            }
            Some(Ok(bytes)) => bytes,
            Some(Err(e)) => {
                tracing::warn!(annotation_id = %ann.id, error = %e, "Skipping unconvertible clip");
                skipped.push(SkippedClip {
                    annotation_id: ann.id.clone(),
                    reason: SkipReason::Conversion(e),
                });
                entry_names.push(None);
                continue;
            }
        };

        let preferred = clip_entry_name(ann);
        let name = unique_clip_filename(&preferred, |c| taken.contains(c));
        if name != preferred {
            tracing::info!(annotation_id = %ann.id, preferred = %preferred, entry = %name, "Renamed clip entry to avoid a collision");
        }
        taken.insert(name.clone());
        entry_names.push(Some(name.clone()));
        entries.push((name, bytes));
    }

    CollectedClips {
        entries,
        entry_names,
        skipped,
    }
}

/// Entry options with a fixed timestamp so equal input gives equal bytes.
fn entry_options(method: CompressionMethod) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(method)
        .last_modified_time(DateTime::default())
}

fn write_archive(csv: &str, clips: &[(String, Cow<'_, [u8]>)]) -> Result<Vec<u8>, CoreError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file(CSV_FILENAME, entry_options(CompressionMethod::Deflated))?;
    zip.write_all(csv.as_bytes())?;

    // Video clips are already compressed.
    for (name, bytes) in clips {
        zip.start_file(name.as_str(), entry_options(CompressionMethod::Stored))?;
        zip.write_all(bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Encode a snapshot as a ZIP archive of the CSV plus attached clips.
///
/// Unconvertible clips are skipped and reported; the rest of the export
/// continues.
pub fn export_archive(
    annotations: &[Annotation],
    on_empty: EmptyArchivePolicy,
) -> Result<ArchiveExport, CoreError> {
    let CollectedClips {
        entries: clips,
        entry_names,
        skipped,
    } = collect_clips(annotations);

    if clips.is_empty() && on_empty == EmptyArchivePolicy::Reject {
        return Err(CoreError::NoAttachmentsFound);
    }

    let csv = render_archive_csv(annotations, &entry_names);
    let bytes = write_archive(&csv, &clips)?;

    tracing::info!(
        annotations = annotations.len(),
        clips = clips.len(),
        skipped = skipped.len(),
        "Archive export encoded",
    );

    Ok(ArchiveExport {
        file: ExportFile {
            filename: ARCHIVE_FILENAME.to_string(),
            content_type: "application/zip",
            bytes,
        },
        clip_count: clips.len(),
        skipped,
    })
}
