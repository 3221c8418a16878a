//! The annotation entity: a labeled segment of one video with optional
//! notes and an optional attached clip.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::segment::Segment;
use crate::types::{AnnotationId, Seconds};
use crate::video::video_id_or_url;

// ---------------------------------------------------------------------------
// Clip payload
// ---------------------------------------------------------------------------

/// Binary payload of a downloaded clip.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipPayload {
    /// Bytes as returned by the clip fetch collaborator.
    Binary(Vec<u8>),
    /// A payload carried over from a legacy document that has not been
    /// normalized to bytes yet.
    Raw(serde_json::Value),
}

impl ClipPayload {
    /// Normalize the payload to bytes.
    ///
    /// Raw payloads convert from a JSON array of byte values or from a
    /// string (its UTF-8 bytes). Anything else is rejected with a reason.
    pub fn to_bytes(&self) -> Result<Cow<'_, [u8]>, String> {
        match self {
            Self::Binary(bytes) => Ok(Cow::Borrowed(bytes)),
            Self::Raw(serde_json::Value::String(s)) => Ok(Cow::Borrowed(s.as_bytes())),
            Self::Raw(serde_json::Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| format!("element {i} is not a byte value"))
                })
                .collect::<Result<Vec<u8>, String>>()
                .map(Cow::Owned),
            Self::Raw(other) => Err(format!("unsupported payload type: {}", json_kind(other))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// A stored, labeled segment.
///
/// Serializes to the canonical persisted record. The clip payload is
/// never persisted; only its filename is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    /// Derived once from `video_url` at creation. Not part of identity.
    pub video_id: String,
    pub video_url: String,
    pub start_time: Seconds,
    pub end_time: Seconds,
    /// Insertion-ordered, duplicate-free.
    pub labels: Vec<String>,
    pub notes: Option<String>,
    pub clip_filename: Option<String>,
    #[serde(skip)]
    pub clip_payload: Option<ClipPayload>,
}

impl Annotation {
    /// Create a fresh annotation for `segment` with a new id.
    pub fn new(segment: &Segment, labels: Vec<String>) -> Self {
        Self {
            id: AnnotationId::generate(),
            video_id: video_id_or_url(&segment.video_url),
            video_url: segment.video_url.clone(),
            start_time: segment.start,
            end_time: segment.end,
            labels,
            notes: None,
            clip_filename: None,
            clip_payload: None,
        }
    }

    /// Whether this annotation is keyed by `segment`.
    pub fn is_keyed_by(&self, segment: &Segment) -> bool {
        segment.matches(&self.video_url, self.start_time, self.end_time)
    }

    /// Whether two annotations share an identity key.
    pub fn same_key(&self, other: &Annotation) -> bool {
        self.video_url == other.video_url
            && self.start_time == other.start_time
            && self.end_time == other.end_time
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Remove `label` if present, otherwise append it.
    ///
    /// Returns `true` when the label is present afterwards.
    pub fn toggle_label(&mut self, label: &str) -> bool {
        if let Some(pos) = self.labels.iter().position(|l| l == label) {
            self.labels.remove(pos);
            false
        } else {
            self.labels.push(label.to_string());
            true
        }
    }

    pub fn has_clip(&self) -> bool {
        self.clip_payload.is_some()
    }

    /// Normalized clip bytes, if a clip is attached.
    pub fn clip_bytes(&self) -> Option<Result<Cow<'_, [u8]>, CoreError>> {
        self.clip_payload.as_ref().map(|payload| {
            payload
                .to_bytes()
                .map_err(|reason| CoreError::AttachmentConversionFailed {
                    annotation_id: self.id.clone(),
                    reason,
                })
        })
    }
}
