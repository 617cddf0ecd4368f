//! Core data types used throughout the import pipeline.
//!
//! These represent the rows read from the CSV manifest, the record payloads
//! sent to the CMS, and the outcome of a storage upload.

/// A content row from the CSV manifest, with the fixed column order
/// {title, body, duration, size, source} mapped to named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRow {
    pub title: String,
    pub body: String,
    /// Video duration as written in the manifest (e.g. `"00:10:00"`).
    pub duration: String,
    /// Video size as written in the manifest (e.g. `"5MB"`).
    pub size: String,
    /// Local path or remote URL of the video file.
    pub source: String,
}

/// Classification of one CSV row.
///
/// A row with exactly one populated field is a section marker; a row with
/// multiple populated fields is a content row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    /// Grouping label for the content rows that follow it.
    Section(String),
    Content(ContentRow),
}

/// Fields for a CMS record upsert.
///
/// `id` is `None` on create; set to an existing record's id, the upsert
/// updates that record in place.
#[derive(Debug, Clone)]
pub struct RecordFields {
    pub id: Option<u64>,
    pub title: String,
    /// Derived slug, the natural key for idempotent upserts.
    pub slug: String,
    pub body: String,
    pub status: String,
    /// Ordered category ids: root, conference, section.
    pub categories: Vec<u64>,
}

/// Result of ensuring a video is present in object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Public URL of the object at its derived key.
    pub url: String,
    /// False when a transfer failed and the URL may not be reachable yet.
    pub verified: bool,
}
