//! Load-time migration of persisted annotation documents.
//!
//! Older documents carry the same field under several names
//! (`start_time` / `start_seconds` / `start`, `video_url` / `videoUrl`,
//! `id` / `uuid`). Migration resolves each record to the canonical
//! [`Annotation`] shape exactly once, when the document is loaded; the rest
//! of the crate only ever sees canonical fields.
//!
//! A record without labels is only kept when it carries a clip (a stored
//! `clip_filename` or a legacy `clip_blob`); anything else could never have
//! been produced by a toggle or a clip attach.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::annotation::{Annotation, ClipPayload};
use crate::error::CoreError;
use crate::labels::LabelCatalog;
use crate::segment::Segment;
use crate::time::parse_time_to_seconds;
use crate::types::{AnnotationId, Seconds};
use crate::video::video_id_or_url;

/// Schema version written by this crate.
pub const SCHEMA_VERSION: u32 = 2;

/// Version assumed for documents without a `schema_version` field.
pub const LEGACY_SCHEMA_VERSION: u32 = 1;

const VIDEO_URL_KEYS: &[&str] = &["video_url", "videoUrl"];
const START_KEYS: &[&str] = &["start_time", "start_seconds", "start"];
const END_KEYS: &[&str] = &["end_time", "end_seconds", "end"];
const ID_KEYS: &[&str] = &["id", "uuid"];

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    schema_version: Option<u32>,
    #[serde(default)]
    labels: Option<Vec<Value>>,
    #[serde(default)]
    annotations: Vec<Value>,
}

/// A record that could not be migrated.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Index of the record in the source `annotations` array.
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    pub source_version: u32,
    pub migrated: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// Canonical state recovered from a persisted document.
#[derive(Debug, Clone)]
pub struct MigratedDocument {
    pub labels: LabelCatalog,
    /// In document order, duplicate keys removed.
    pub annotations: Vec<Annotation>,
    pub report: MigrationReport,
}

/// Migrate a whole persisted document.
///
/// Invalid records and records repeating an earlier identity key are
/// skipped and listed in the report. Only a document newer than
/// [`SCHEMA_VERSION`] or one that is not a document at all fails.
pub fn migrate_document(document: Value) -> Result<MigratedDocument, CoreError> {
    let raw: RawDocument = serde_json::from_value(document)
        .map_err(|e| CoreError::InvalidRecord(format!("malformed document: {e}")))?;

    let source_version = raw.schema_version.unwrap_or(LEGACY_SCHEMA_VERSION);
    if source_version > SCHEMA_VERSION {
        return Err(CoreError::InvalidRecord(format!(
            "schema_version {source_version} is newer than supported version {SCHEMA_VERSION}"
        )));
    }

    // A document that never stored a catalog starts from the defaults.
    let labels = match &raw.labels {
        Some(names) => LabelCatalog::from_labels(names.iter().filter_map(Value::as_str)),
        None => LabelCatalog::with_defaults(),
    };

    let mut annotations: Vec<Annotation> = Vec::with_capacity(raw.annotations.len());
    let mut skipped = Vec::new();
    for (index, record) in raw.annotations.iter().enumerate() {
        let result = migrate_record(record).and_then(|ann| {
            if annotations.iter().any(|a| a.same_key(&ann)) {
                Err(CoreError::InvalidRecord(format!(
                    "duplicate key {} [{}, {}]",
                    ann.video_url, ann.start_time, ann.end_time
                )))
            } else {
                Ok(ann)
            }
        });
        match result {
            Ok(ann) => annotations.push(ann),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping persisted annotation");
                skipped.push(SkippedRecord {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        source_version,
        migrated = annotations.len(),
        skipped = skipped.len(),
        "Persisted document migrated",
    );

    let report = MigrationReport {
        source_version,
        migrated: annotations.len(),
        skipped,
    };
    Ok(MigratedDocument {
        labels,
        annotations,
        report,
    })
}

/// Migrate a single persisted annotation record to canonical form.
pub fn migrate_record(record: &Value) -> Result<Annotation, CoreError> {
    let obj = record
        .as_object()
        .ok_or_else(|| CoreError::InvalidRecord("record must be a JSON object".to_string()))?;

    let video_url = first_present(obj, VIDEO_URL_KEYS)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::InvalidRecord("missing video_url".to_string()))?
        .to_string();

    let start = resolve_seconds(obj, START_KEYS, "start_time")?;
    let end = resolve_seconds(obj, END_KEYS, "end_time")?;
    let segment = Segment::new(video_url, start, end)
        .map_err(|e| CoreError::InvalidRecord(e.to_string()))?;

    let id = first_present(obj, ID_KEYS)
        .and_then(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .map(AnnotationId::from)
        .unwrap_or_else(AnnotationId::generate);

    let video_id = non_empty_str(obj, "video_id")
        .map(str::to_string)
        .unwrap_or_else(|| video_id_or_url(&segment.video_url));

    let mut labels: Vec<String> = Vec::new();
    if let Some(Value::Array(items)) = obj.get("labels") {
        for label in items.iter().filter_map(Value::as_str) {
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
    }

    let notes = obj
        .get("notes")
        .and_then(Value::as_str)
        .filter(|n| !n.trim().is_empty())
        .map(str::to_string);

    let clip_payload = obj
        .get("clip_blob")
        .filter(|v| !v.is_null())
        .cloned()
        .map(ClipPayload::Raw);
    let clip_filename = non_empty_str(obj, "clip_filename").map(str::to_string);

    if labels.is_empty() && clip_payload.is_none() && clip_filename.is_none() {
        return Err(CoreError::InvalidRecord("record has no labels and no clip".to_string()));
    }

    Ok(Annotation {
        id,
        video_id,
        video_url: segment.video_url,
        start_time: segment.start,
        end_time: segment.end,
        labels,
        notes,
        clip_filename,
        clip_payload,
    })
}

/// Serialize canonical state as a current-version document.
pub fn to_document(labels: &LabelCatalog, annotations: &[Annotation]) -> Result<Value, CoreError> {
    let annotations = serde_json::to_value(annotations)
        .map_err(|e| CoreError::InvalidRecord(format!("cannot serialize annotations: {e}")))?;
    Ok(serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "labels": labels.labels(),
        "annotations": annotations,
    }))
}

/// First key whose value is present and not `null`.
fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
}

fn non_empty_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Resolve a time bound. Absent or blank values are rejected rather than
/// defaulted.
fn resolve_seconds(
    obj: &Map<String, Value>,
    keys: &[&str],
    field: &str,
) -> Result<Seconds, CoreError> {
    match first_present(obj, keys) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| CoreError::InvalidRecord(format!("{field} is not representable"))),
        Some(Value::String(s)) if !s.trim().is_empty() => parse_time_to_seconds(s)
            .map_err(|e| CoreError::InvalidRecord(format!("{field}: {e}"))),
        Some(_) => Err(CoreError::InvalidRecord(format!("{field} has an unsupported value"))),
        None => Err(CoreError::InvalidRecord(format!("missing {field}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    // -- migrate_record --

    #[test]
    fn canonical_record_passes_through() {
        let ann = migrate_record(&json!({
            "id": "a-1",
            "video_id": "dQw4w9WgXcQ",
            "video_url": URL,
            "start_time": 10,
            "end_time": 20.5,
            "labels": ["A", "B"],
            "notes": "hello",
            "clip_filename": "clip_10_20.5.mp4"
        }))
        .unwrap();
        assert_eq!(ann.id.as_str(), "a-1");
        assert_eq!(ann.start_time, 10.0);
        assert_eq!(ann.end_time, 20.5);
        assert_eq!(ann.labels, vec!["A", "B"]);
        assert_eq!(ann.notes.as_deref(), Some("hello"));
        assert_eq!(ann.clip_filename.as_deref(), Some("clip_10_20.5.mp4"));
        assert!(ann.clip_payload.is_none());
    }

    #[test]
    fn legacy_field_names_resolve() {
        let ann = migrate_record(&json!({
            "uuid": "legacy-7",
            "videoUrl": URL,
            "start_seconds": 5,
            "end": "0:15",
            "labels": ["A"],
        }))
        .unwrap();
        assert_eq!(ann.id.as_str(), "legacy-7");
        assert_eq!(ann.video_url, URL);
        assert_eq!(ann.video_id, "dQw4w9WgXcQ");
        assert_eq!(ann.start_time, 5.0);
        assert_eq!(ann.end_time, 15.0);
        assert_eq!(ann.labels, vec!["A"]);
    }

    #[test]
    fn record_without_labels_or_clip_is_rejected() {
        let err = migrate_record(&json!({
            "video_url": URL, "start_time": 0, "end_time": 1, "labels": []
        }))
        .unwrap_err();
        assert_matches!(err, CoreError::InvalidRecord(msg) if msg.contains("no labels"));
    }

    #[test]
    fn record_without_labels_keeps_clip_filename() {
        let ann = migrate_record(&json!({
            "video_url": URL, "start_time": 0, "end_time": 1,
            "labels": [], "clip_filename": "clip_0_1.mp4"
        }))
        .unwrap();
        assert!(ann.labels.is_empty());
        assert_eq!(ann.clip_filename.as_deref(), Some("clip_0_1.mp4"));
    }

    #[test]
    fn null_canonical_field_falls_through_to_legacy() {
        let ann = migrate_record(&json!({
            "video_url": URL,
            "start_time": null,
            "start": 3,
            "end_time": 4,
            "labels": ["A"],
        }))
        .unwrap();
        assert_eq!(ann.start_time, 3.0);
    }

    #[test]
    fn missing_bound_is_rejected_not_zeroed() {
        let err = migrate_record(&json!({"video_url": URL, "end_time": 4})).unwrap_err();
        assert_matches!(err, CoreError::InvalidRecord(msg) if msg.contains("start_time"));
    }

    #[test]
    fn blank_bound_is_rejected() {
        assert!(migrate_record(&json!({"video_url": URL, "start_time": "", "end_time": 4})).is_err());
    }

    #[test]
    fn inverted_range_rejected() {
        assert!(migrate_record(&json!({"video_url": URL, "start_time": 9, "end_time": 4})).is_err());
    }

    #[test]
    fn missing_url_rejected() {
        assert!(migrate_record(&json!({"start_time": 0, "end_time": 4})).is_err());
    }

    #[test]
    fn missing_id_is_generated() {
        let record = json!({"video_url": URL, "start_time": 0, "end_time": 4, "labels": ["A"]});
        let a = migrate_record(&record).unwrap();
        let b = migrate_record(&record).unwrap();
        assert!(!a.id.as_str().is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn labels_are_deduplicated_in_order() {
        let ann = migrate_record(&json!({
            "video_url": URL, "start_time": 0, "end_time": 1,
            "labels": ["B", "A", "B", 3, "C"]
        }))
        .unwrap();
        assert_eq!(ann.labels, vec!["B", "A", "C"]);
    }

    #[test]
    fn legacy_clip_blob_is_carried_raw() {
        let ann = migrate_record(&json!({
            "video_url": URL, "start_time": 0, "end_time": 1,
            "clip_blob": [1, 2, 3]
        }))
        .unwrap();
        assert_eq!(ann.clip_payload, Some(ClipPayload::Raw(json!([1, 2, 3]))));
    }

    #[test]
    fn blank_notes_become_absent() {
        let ann = migrate_record(&json!({
            "video_url": URL, "start_time": 0, "end_time": 1, "labels": ["A"], "notes": "  "
        }))
        .unwrap();
        assert!(ann.notes.is_none());
    }

    // -- migrate_document --

    #[test]
    fn document_skips_bad_and_duplicate_records() {
        let doc = migrate_document(json!({
            "labels": ["funny", "", "ad", "funny"],
            "annotations": [
                {"video_url": URL, "start_time": 0, "end_time": 1, "labels": ["funny"]},
                {"video_url": URL, "start_time": 5},
                {"video_url": URL, "start": 0, "end": 1, "labels": ["ad"]},
                {"video_url": URL, "start_time": 2, "end_time": 3, "labels": ["ad"]},
                {"video_url": URL, "start_time": 4, "end_time": 5, "labels": []}
            ]
        }))
        .unwrap();

        assert_eq!(doc.labels.labels(), ["funny", "ad"]);
        assert_eq!(doc.annotations.len(), 2);
        assert_eq!(doc.annotations[0].labels, vec!["funny"]);
        assert_eq!(doc.report.source_version, LEGACY_SCHEMA_VERSION);
        assert_eq!(doc.report.migrated, 2);
        let skipped: Vec<usize> = doc.report.skipped.iter().map(|s| s.index).collect();
        assert_eq!(skipped, vec![1, 2, 4]);
        assert!(doc.report.skipped[1].reason.contains("duplicate key"));
        assert!(doc.report.skipped[2].reason.contains("no labels"));
    }

    #[test]
    fn document_without_catalog_gets_default_labels() {
        let doc = migrate_document(json!({"annotations": []})).unwrap();
        assert_eq!(doc.labels, LabelCatalog::with_defaults());

        let doc = migrate_document(json!({"labels": [], "annotations": []})).unwrap();
        assert!(doc.labels.labels().is_empty());
    }

    #[test]
    fn newer_schema_version_rejected() {
        let err = migrate_document(json!({"schema_version": 99, "annotations": []})).unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn non_document_rejected() {
        assert!(migrate_document(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn written_document_migrates_back() {
        let labels = LabelCatalog::from_labels(["A"]);
        let ann = migrate_record(&json!({
            "id": "x", "video_url": URL, "start_time": 1.5, "end_time": 2, "labels": ["A"]
        }))
        .unwrap();
        let doc = to_document(&labels, std::slice::from_ref(&ann)).unwrap();
        assert_eq!(doc["schema_version"], SCHEMA_VERSION);

        let back = migrate_document(doc).unwrap();
        assert_eq!(back.report.source_version, SCHEMA_VERSION);
        assert_eq!(back.annotations, vec![ann]);
        assert_eq!(back.labels, labels);
    }
}
