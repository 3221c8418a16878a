//! One export run: load, hydrate clips, encode, write.

use std::path::PathBuf;

use anyhow::Context;
use clipmark_core::export::{EmptyArchivePolicy, ExportFile};
use clipmark_core::{AnnotationSession, CoreError, NoopSink};

use crate::config::{ExportConfig, ExportFormat};
use crate::loader::{hydrate_clips, load_document};

/// Result of an export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written {
        path: PathBuf,
        annotations: usize,
        clips: usize,
        skipped_clips: usize,
    },
    /// ZIP export found no clips and CSV-only output was not allowed.
    /// Nothing was written.
    NoAttachments,
}

pub async fn run(config: &ExportConfig) -> anyhow::Result<ExportOutcome> {
    let mut document = load_document(&config.input).await?;

    if let Some(clip_dir) = &config.clip_dir {
        let loaded = hydrate_clips(&mut document.annotations, clip_dir).await;
        tracing::info!(loaded, clip_dir = %clip_dir.display(), "Clip files loaded");
    }

    // Read-only session: the exporter never writes the document back.
    let session = AnnotationSession::from_document(document, NoopSink);
    let annotations = session.store().len();

    let (file, clips, skipped_clips) = match config.format {
        ExportFormat::Csv => (session.export_csv(), 0, 0),
        ExportFormat::Zip => {
            let policy = if config.allow_csv_only {
                EmptyArchivePolicy::CsvOnly
            } else {
                EmptyArchivePolicy::Reject
            };
            match session.export_archive(policy) {
                Ok(export) => {
                    for skipped in &export.skipped {
                        tracing::warn!(annotation_id = %skipped.annotation_id, reason = ?skipped.reason, "Clip left out of archive");
                    }
                    (export.file, export.clip_count, export.skipped.len())
                }
                Err(CoreError::NoAttachmentsFound) => return Ok(ExportOutcome::NoAttachments),
                Err(e) => return Err(e.into()),
            }
        }
    };

    let path = write_export(config, &file).await?;
    tracing::info!(path = %path.display(), annotations, clips, "Export written");

    Ok(ExportOutcome::Written {
        path,
        annotations,
        clips,
        skipped_clips,
    })
}

async fn write_export(config: &ExportConfig, file: &ExportFile) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;
    let path = config.output_dir.join(&file.filename);
    tokio::fs::write(&path, &file.bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
