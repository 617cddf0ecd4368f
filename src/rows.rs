//! CSV row classification.
//!
//! The manifest interleaves two row shapes: a row with exactly one populated
//! field is a section marker (a grouping label for the rows after it), and a
//! row with multiple populated fields is a content row with the fixed column
//! order `{1: title, 2: body, 3: duration, 4: size, 5: source}` (column 0 is
//! a manifest row number and is ignored).

use anyhow::{bail, Result};
use csv::StringRecord;

use crate::models::{ContentRow, RowKind};

/// Columns a content row must carry: row number, title, body, duration,
/// size, source.
const CONTENT_COLUMNS: usize = 6;

/// Classify one CSV record.
///
/// Fields are trimmed before counting. Returns `None` for a fully blank row,
/// `Some(RowKind::Section)` for a single-field row, and
/// `Some(RowKind::Content)` otherwise.
///
/// # Errors
///
/// A content row with fewer than [`CONTENT_COLUMNS`] columns, or with an
/// empty title or source field, is rejected before any field is used.
pub fn classify(record: &StringRecord) -> Result<Option<RowKind>> {
    let populated: Vec<&str> = record
        .iter()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();

    match populated.len() {
        0 => Ok(None),
        1 => Ok(Some(RowKind::Section(populated[0].to_string()))),
        _ => {
            if record.len() < CONTENT_COLUMNS {
                bail!(
                    "content row has {} columns, expected {} (row number, title, body, duration, size, source)",
                    record.len(),
                    CONTENT_COLUMNS
                );
            }

            let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
            let row = ContentRow {
                title: field(1),
                body: field(2),
                duration: field(3),
                size: field(4),
                source: field(5),
            };

            if row.title.is_empty() {
                bail!("content row is missing a title (column 2)");
            }
            if row.source.is_empty() {
                bail!("content row '{}' is missing a source path (column 6)", row.title);
            }

            Ok(Some(RowKind::Content(row)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn single_field_row_is_a_section_marker() {
        let kind = classify(&record(&["Keynotes"])).unwrap();
        assert_eq!(kind, Some(RowKind::Section("Keynotes".to_string())));
    }

    #[test]
    fn padded_single_field_row_is_still_a_section() {
        let kind = classify(&record(&["", "  Keynotes  ", "", ""])).unwrap();
        assert_eq!(kind, Some(RowKind::Section("Keynotes".to_string())));
    }

    #[test]
    fn blank_row_is_skipped() {
        assert_eq!(classify(&record(&["", "  ", ""])).unwrap(), None);
    }

    #[test]
    fn content_row_maps_named_fields() {
        let kind = classify(&record(&[
            "1",
            "Opening Talk",
            "<p>Welcome</p>",
            "00:10:00",
            "5MB",
            "http://cdn.example.com/opening.mp4",
        ]))
        .unwrap();
        match kind {
            Some(RowKind::Content(row)) => {
                assert_eq!(row.title, "Opening Talk");
                assert_eq!(row.body, "<p>Welcome</p>");
                assert_eq!(row.duration, "00:10:00");
                assert_eq!(row.size, "5MB");
                assert_eq!(row.source, "http://cdn.example.com/opening.mp4");
            }
            other => panic!("expected content row, got {:?}", other),
        }
    }

    #[test]
    fn content_fields_are_trimmed() {
        let kind = classify(&record(&[
            "1",
            "  Opening Talk ",
            " body ",
            " 00:10:00",
            "5MB ",
            " http://cdn.example.com/opening.mp4 ",
        ]))
        .unwrap();
        match kind {
            Some(RowKind::Content(row)) => {
                assert_eq!(row.title, "Opening Talk");
                assert_eq!(row.source, "http://cdn.example.com/opening.mp4");
            }
            other => panic!("expected content row, got {:?}", other),
        }
    }

    #[test]
    fn short_content_row_is_rejected() {
        let err = classify(&record(&["Opening Talk", "<p>Welcome</p>"])).unwrap_err();
        assert!(err.to_string().contains("expected 6"));
    }

    #[test]
    fn content_row_without_source_is_rejected() {
        let err = classify(&record(&[
            "1",
            "Opening Talk",
            "<p>Welcome</p>",
            "00:10:00",
            "5MB",
            "",
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("source"));
    }
}
