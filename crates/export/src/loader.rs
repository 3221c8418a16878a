//! Reading a persisted snapshot document and its clip files from disk.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clipmark_core::migration::{migrate_document, MigratedDocument};
use clipmark_core::{Annotation, ClipPayload};

/// Read and migrate the document at `path`.
pub async fn load_document(path: &Path) -> anyhow::Result<MigratedDocument> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_slice(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let document = migrate_document(value)?;
    Ok(document)
}

/// Clip filenames must name a file directly inside the clip directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

fn clip_path(dir: &Path, name: &str) -> Option<PathBuf> {
    is_plain_file_name(name).then(|| dir.join(name))
}

/// Load clip binaries for annotations that name a clip but carry no
/// payload. Missing or unreadable files are logged and skipped.
///
/// Returns the number of clips loaded.
pub async fn hydrate_clips(annotations: &mut [Annotation], clip_dir: &Path) -> usize {
    let mut loaded = 0;
    for ann in annotations.iter_mut() {
        if ann.clip_payload.is_some() {
            continue;
        }
        let Some(name) = ann.clip_filename.as_deref() else {
            continue;
        };
        let Some(path) = clip_path(clip_dir, name) else {
            tracing::warn!(annotation_id = %ann.id, filename = %name, "Ignoring unsafe clip filename");
            continue;
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                ann.clip_payload = Some(ClipPayload::Binary(bytes));
                loaded += 1;
            }
            Err(e) => {
                tracing::warn!(
                    annotation_id = %ann.id,
                    path = %path.display(),
                    error = %e,
                    "Clip file unavailable",
                );
            }
        }
    }
    loaded
}
