//! CSV rendering of annotation snapshots.
//!
//! Column order is fixed: `video_url, start_time, end_time, labels, notes`,
//! plus `clip_filename` in the archive layout. `video_url` and `notes` are
//! always quoted with `""` escaping. Labels are joined with `;` and are not
//! escaped, so a label containing `;` cannot be split back apart.

use crate::annotation::Annotation;

use super::{format_seconds, ExportFile, CSV_FILENAME};

const BASE_COLUMNS: &[&str] = &["video_url", "start_time", "end_time", "labels", "notes"];
const CLIP_COLUMN: &str = "clip_filename";
const LABEL_SEPARATOR: &str = ";";

/// Which column set to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvLayout {
    /// Standalone CSV export.
    Standard,
    /// CSV embedded in the archive export, with a `clip_filename` column.
    WithClips,
}

/// Wrap in double quotes, doubling any embedded quote.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Quote only when the value contains a comma, quote, or newline.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        quote(value)
    } else {
        value.to_string()
    }
}

fn render_row(ann: &Annotation, layout: CsvLayout, clip_name: Option<&str>) -> String {
    let mut cells = vec![
        quote(&ann.video_url),
        format_seconds(ann.start_time),
        format_seconds(ann.end_time),
        ann.labels.join(LABEL_SEPARATOR),
        quote(ann.notes.as_deref().unwrap_or("")),
    ];
    if layout == CsvLayout::WithClips {
        cells.push(csv_escape(clip_name.unwrap_or("")));
    }
    cells.join(",")
}

fn render_lines<'a, F>(annotations: &'a [Annotation], layout: CsvLayout, clip_name: F) -> String
where
    F: Fn(usize, &'a Annotation) -> Option<&'a str>,
{
    let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
    if layout == CsvLayout::WithClips {
        header.push(CLIP_COLUMN);
    }

    let mut lines = Vec::with_capacity(annotations.len() + 1);
    lines.push(header.join(","));
    lines.extend(
        annotations
            .iter()
            .enumerate()
            .map(|(i, ann)| render_row(ann, layout, clip_name(i, ann))),
    );
    lines.join("\n")
}

/// Render annotations as CSV: header first, then one row per annotation in
/// the given order. Lines are `\n`-separated with no trailing newline.
pub fn render_csv(annotations: &[Annotation], layout: CsvLayout) -> String {
    render_lines(annotations, layout, |_, ann| ann.clip_filename.as_deref())
}

/// CSV for the archive. `entry_names[i]`, when set, is the entry the clip of
/// `annotations[i]` was written under and replaces its stored filename.
pub(super) fn render_archive_csv(annotations: &[Annotation], entry_names: &[Option<String>]) -> String {
    render_lines(annotations, CsvLayout::WithClips, move |i, ann| {
        entry_names
            .get(i)
            .and_then(Option::as_deref)
            .or(ann.clip_filename.as_deref())
    })
}

/// Standalone CSV export of a snapshot.
pub fn export_csv(annotations: &[Annotation]) -> ExportFile {
    ExportFile {
        filename: CSV_FILENAME.to_string(),
        content_type: "text/csv;charset=utf-8",
        bytes: render_csv(annotations, CsvLayout::Standard).into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;

    fn ann(url: &str, start: f64, end: f64, labels: &[&str]) -> Annotation {
        let seg = Segment::new(url, start, end).unwrap();
        Annotation::new(&seg, labels.iter().map(|l| l.to_string()).collect())
    }

    /// Minimal RFC 4180 line splitter for checking recoverability.
    fn split_line(line: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            if in_quotes {
                if ch == '"' {
                    if chars.peek() == Some(&'"') {
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    current.push(ch);
                }
            } else if ch == '"' {
                in_quotes = true;
            } else if ch == ',' {
                result.push(std::mem::take(&mut current));
            } else {
                current.push(ch);
            }
        }
        result.push(current);
        result
    }

    #[test]
    fn header_only_for_empty_snapshot() {
        assert_eq!(
            render_csv(&[], CsvLayout::Standard),
            "video_url,start_time,end_time,labels,notes"
        );
        assert_eq!(
            render_csv(&[], CsvLayout::WithClips),
            "video_url,start_time,end_time,labels,notes,clip_filename"
        );
    }

    #[test]
    fn row_format() {
        let mut a = ann("https://youtu.be/abc", 10.0, 20.5, &["A", "B"]);
        a.notes = Some("nice".into());
        let csv = render_csv(&[a], CsvLayout::Standard);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], r#""https://youtu.be/abc",10,20.5,A;B,"nice""#);
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn absent_notes_render_as_empty_quoted() {
        let csv = render_csv(&[ann("u", 0.0, 1.0, &["A"])], CsvLayout::Standard);
        assert_eq!(csv.lines().nth(1).unwrap(), r#""u",0,1,A,"""#);
    }

    #[test]
    fn quotes_are_doubled_and_recoverable() {
        let mut a = ann("u", 0.0, 1.0, &["A"]);
        a.notes = Some(r#"Quo"te"#.into());
        let csv = render_csv(&[a], CsvLayout::Standard);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.ends_with(r#""Quo""te""#));
        assert_eq!(split_line(row)[4], r#"Quo"te"#);
    }

    #[test]
    fn commas_in_url_stay_in_one_cell() {
        let a = ann("https://x.test/?a=1,2", 0.0, 1.0, &["A"]);
        let csv = render_csv(&[a], CsvLayout::Standard);
        let cells = split_line(csv.lines().nth(1).unwrap());
        assert_eq!(cells.len(), 5);
        assert_eq!(cells[0], "https://x.test/?a=1,2");
    }

    #[test]
    fn label_order_is_preserved_unescaped() {
        let a = ann("u", 0.0, 1.0, &["z", "a;b", "m"]);
        let csv = render_csv(&[a], CsvLayout::Standard);
        assert_eq!(split_line(csv.lines().nth(1).unwrap())[3], "z;a;b;m");
    }

    #[test]
    fn clip_column_only_in_clip_layout() {
        let mut a = ann("u", 0.0, 1.0, &["A"]);
        a.clip_filename = Some("clip_0_1.mp4".into());
        let standard = render_csv(std::slice::from_ref(&a), CsvLayout::Standard);
        let with_clips = render_csv(std::slice::from_ref(&a), CsvLayout::WithClips);
        assert_eq!(split_line(standard.lines().nth(1).unwrap()).len(), 5);
        assert_eq!(with_clips.lines().nth(1).unwrap(), r#""u",0,1,A,"",clip_0_1.mp4"#);
    }

    #[test]
    fn awkward_clip_filename_is_quoted() {
        let mut a = ann("u", 0.0, 1.0, &["A"]);
        a.clip_filename = Some("a,b.mp4".into());
        let csv = render_csv(&[a], CsvLayout::WithClips);
        assert_eq!(split_line(csv.lines().nth(1).unwrap())[5], "a,b.mp4");
    }

    #[test]
    fn rows_follow_snapshot_order() {
        let first = ann("first", 0.0, 1.0, &["A"]);
        let second = ann("second", 0.0, 1.0, &["A"]);
        let csv = render_csv(&[first, second], CsvLayout::Standard);
        let urls: Vec<String> = csv.lines().skip(1).map(|l| split_line(l)[0].clone()).collect();
        assert_eq!(urls, vec!["first", "second"]);
    }

    #[test]
    fn export_csv_names_file() {
        let file = export_csv(&[ann("u", 0.0, 1.0, &["A"])]);
        assert_eq!(file.filename, "annotations.csv");
        assert!(String::from_utf8(file.bytes).unwrap().starts_with("video_url,"));
    }

    #[test]
    fn archive_csv_uses_written_entry_names() {
        let mut stored = ann("u", 0.0, 1.0, &["A"]);
        stored.clip_filename = Some("clip_0_1.mp4".into());
        let renamed = stored.clone();
        let bare = ann("u", 1.0, 2.0, &["B"]);
        let entry_names = vec![None, Some("clip_0_1 (2).mp4".to_string()), Some("clip_1_2.mp4".to_string())];

        let csv = render_archive_csv(&[stored, renamed, bare], &entry_names);
        let clip_cells: Vec<String> = csv.lines().skip(1).map(|l| split_line(l)[5].clone()).collect();
        assert_eq!(clip_cells, vec!["clip_0_1.mp4", "clip_0_1 (2).mp4", "clip_1_2.mp4"]);
    }
}
