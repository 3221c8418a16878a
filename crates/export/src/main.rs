//! `clipmark-export` -- headless export of a persisted annotation snapshot.
//!
//! Loads the snapshot document, migrates it to the current schema, and
//! writes either `annotations.csv` or `annotations_and_clips.zip`.
//!
//! # Environment variables
//!
//! | Variable                  | Required | Default            | Description                                  |
//! |---------------------------|----------|--------------------|----------------------------------------------|
//! | `CLIPMARK_INPUT`          | no       | `annotations.json` | Persisted snapshot document                  |
//! | `CLIPMARK_OUTPUT_DIR`     | no       | `.`                | Directory the export is written to           |
//! | `CLIPMARK_FORMAT`         | no       | `csv`              | `csv` or `zip`                               |
//! | `CLIPMARK_CLIP_DIR`       | no       | --                 | Directory with clip files by `clip_filename` |
//! | `CLIPMARK_ALLOW_CSV_ONLY` | no       | `false`            | Allow a ZIP export with no clips             |

use clipmark_export::config::ExportConfig;
use clipmark_export::runner::{self, ExportOutcome};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipmark_export=info,clipmark_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ExportConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        input = %config.input.display(),
        output_dir = %config.output_dir.display(),
        format = ?config.format,
        "Starting clipmark-export",
    );

    match runner::run(&config).await {
        Ok(ExportOutcome::Written { path, .. }) => {
            tracing::info!(path = %path.display(), "Export complete");
        }
        Ok(ExportOutcome::NoAttachments) => {
            tracing::error!(
                "No downloaded clips to add to the archive; set CLIPMARK_ALLOW_CSV_ONLY=true to export the CSV alone"
            );
            std::process::exit(2);
        }
        Err(e) => {
            tracing::error!(error = %e, "Export failed");
            std::process::exit(1);
        }
    }
}
