use std::path::PathBuf;

/// Output format requested from the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Zip,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "zip" => Some(Self::Zip),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': expected {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Exporter configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Persisted snapshot document to read.
    pub input: PathBuf,
    /// Directory the export file is written to.
    pub output_dir: PathBuf,
    pub format: ExportFormat,
    /// Directory holding clip binaries named by `clip_filename`.
    pub clip_dir: Option<PathBuf>,
    /// Whether a ZIP export may proceed with no clips.
    pub allow_csv_only: bool,
}

impl ExportConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                   | Default            |
    /// |---------------------------|--------------------|
    /// | `CLIPMARK_INPUT`          | `annotations.json` |
    /// | `CLIPMARK_OUTPUT_DIR`     | `.`                |
    /// | `CLIPMARK_FORMAT`         | `csv`              |
    /// | `CLIPMARK_CLIP_DIR`       | unset              |
    /// | `CLIPMARK_ALLOW_CSV_ONLY` | `false`            |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let input = lookup("CLIPMARK_INPUT")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "annotations.json".into());

        let output_dir = lookup("CLIPMARK_OUTPUT_DIR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| ".".into());

        let format = match lookup("CLIPMARK_FORMAT") {
            None => ExportFormat::Csv,
            Some(value) => ExportFormat::parse(&value).ok_or(ConfigError::Invalid {
                var: "CLIPMARK_FORMAT",
                value,
                expected: "'csv' or 'zip'",
            })?,
        };

        let clip_dir = lookup("CLIPMARK_CLIP_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let allow_csv_only = match lookup("CLIPMARK_ALLOW_CSV_ONLY") {
            None => false,
            Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid {
                var: "CLIPMARK_ALLOW_CSV_ONLY",
                value,
                expected: "a boolean",
            })?,
        };

        Ok(Self {
            input: PathBuf::from(input),
            output_dir: PathBuf::from(output_dir),
            format,
            clip_dir,
            allow_csv_only,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
