//! Collaborator seams for the import pipeline.
//!
//! The importer talks to three external systems: an object-storage bucket,
//! a content-management system, and plain HTTP for fetching remote videos.
//! Each is consumed through a narrow trait so the pipeline can run
//! end-to-end against in-memory fakes in tests, and so the production
//! implementations ([`crate::storage::S3Store`], [`crate::cms::RestCms`],
//! [`crate::fetch::HttpFetcher`]) stay swappable.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use crate::models::RecordFields;

/// An object-storage bucket holding the uploaded videos.
///
/// Keys are full object paths within the configured bucket (prefix
/// included). The store owns bucket and credential configuration; callers
/// only deal in keys.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether an object already exists at `key`.
    ///
    /// This is the idempotence check: when it returns `true`, the importer
    /// performs no transfer for the row.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Upload a local file to `key` with public-read visibility.
    async fn put_public(&self, key: &str, local_path: &Path) -> Result<()>;

    /// Public URL of the object at `key`, whether or not it exists yet.
    fn public_url(&self, key: &str) -> String;
}

/// The content-management system receiving the imported records.
///
/// All operations are fatal on failure: unlike storage transfers, a CMS
/// error aborts the run (prior rows stay committed — the import is not
/// transactional).
#[async_trait]
pub trait Cms: Send + Sync {
    /// Return the id of the category named `name` under `parent`, creating
    /// it when absent. Idempotent.
    async fn ensure_category(&self, name: &str, parent: Option<u64>) -> Result<u64>;

    /// Look up an existing record by its derived slug.
    async fn find_record_by_slug(&self, slug: &str) -> Result<Option<u64>>;

    /// Create or update a record; `fields.id` selects update-in-place.
    /// Returns the record id.
    async fn upsert_record(&self, fields: &RecordFields) -> Result<u64>;

    /// Tag a record with the given tag names (terms created as needed).
    async fn set_tags(&self, record_id: u64, tags: &[String]) -> Result<()>;

    /// Attach one metadata key/value pair to a record.
    async fn set_metadata(&self, record_id: u64, key: &str, value: &str) -> Result<()>;
}

/// HTTP fetch used when a row's source path is a remote URL.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download `url` to `dest`, overwriting any partial file there.
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;
}
