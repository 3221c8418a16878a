//! Time-ranged segment of a single video.
//!
//! A [`Segment`] is the key material for an annotation: two segments are
//! the same annotation key iff URL, start and end are exactly equal.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::time::parse_time_to_seconds;
use crate::types::Seconds;
use crate::video::extract_video_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub video_url: String,
    pub start: Seconds,
    pub end: Seconds,
}

impl Segment {
    /// Build a segment from numeric bounds.
    ///
    /// Requires a non-empty URL, finite bounds, `start >= 0` and
    /// `end > start`.
    pub fn new(video_url: impl Into<String>, start: Seconds, end: Seconds) -> Result<Self, CoreError> {
        let video_url = video_url.into();
        if video_url.is_empty() {
            return Err(CoreError::InvalidSegment("video URL is empty".to_string()));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(CoreError::InvalidSegment(format!(
                "segment bounds must be finite, got {start}..{end}"
            )));
        }
        if start < 0.0 {
            return Err(CoreError::InvalidSegment(format!(
                "start must be >= 0, got {start}"
            )));
        }
        if end <= start {
            return Err(CoreError::InvalidSegment(format!(
                "end ({end}) must be greater than start ({start})"
            )));
        }
        Ok(Self {
            video_url,
            start,
            end,
        })
    }

    /// Build a loadable segment from operator input.
    ///
    /// The URL must resolve to a video identifier and both bounds must be
    /// valid time expressions.
    pub fn parse(video_url: &str, start: &str, end: &str) -> Result<Self, CoreError> {
        let video_url = video_url.trim();
        if extract_video_id(video_url).is_none() {
            return Err(CoreError::InvalidSegment(format!(
                "cannot resolve a video id from '{video_url}'"
            )));
        }
        let start = parse_time_to_seconds(start)?;
        let end = parse_time_to_seconds(end)?;
        Self::new(video_url, start, end)
    }

    /// Exact identity-key comparison against stored annotation fields.
    pub fn matches(&self, video_url: &str, start: Seconds, end: Seconds) -> bool {
        self.video_url == video_url && self.start == start && self.end == end
    }
}
