use crate::types::AnnotationId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid time format: '{input}'")]
    InvalidTimeFormat { input: String },

    #[error("Invalid segment: {0}")]
    InvalidSegment(String),

    #[error("Position {position} is out of range for {len} annotations")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("No attached clips found for archive export")]
    NoAttachmentsFound,

    #[error("Clip for annotation {annotation_id} could not be converted: {reason}")]
    AttachmentConversionFailed {
        annotation_id: AnnotationId,
        reason: String,
    },

    #[error("Invalid persisted record: {0}")]
    InvalidRecord(String),

    #[error("Clip fetch failed: {0}")]
    ClipFetch(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
