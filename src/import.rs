//! Import pipeline orchestration.
//!
//! Coordinates the full run: CSV manifest → row classification → storage
//! upload → record upsert → tags and metadata. Processing is strictly
//! sequential; one row (including its network transfers) completes before
//! the next begins. The current section is a loop-local accumulator, set by
//! section marker rows and consumed by the content rows after them.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::cms::RestCms;
use crate::config::Config;
use crate::fetch::HttpFetcher;
use crate::markup;
use crate::models::{RecordFields, RowKind};
use crate::rows;
use crate::slug::slugify;
use crate::storage::S3Store;
use crate::traits::{Cms, MediaFetcher, ObjectStore};
use crate::uploader::ensure_stored;

/// The section a content row belongs to.
struct Section {
    name: String,
    category_id: u64,
}

/// Run the import with the production collaborators (S3, REST CMS, HTTP).
pub async fn run_import(config: &Config, csv_path: &Path) -> Result<()> {
    let store = S3Store::from_env(config.storage.clone())?;
    let cms = RestCms::from_env(&config.cms)?;
    let fetcher = HttpFetcher::new();
    run_import_with(config, csv_path, &store, &cms, &fetcher).await
}

/// Run the import against explicit collaborators.
///
/// This is the seam the integration tests drive with in-memory fakes.
pub async fn run_import_with(
    config: &Config,
    csv_path: &Path,
    store: &dyn ObjectStore,
    cms: &dyn Cms,
    fetcher: &dyn MediaFetcher,
) -> Result<()> {
    // Fail fast, before any category or network work.
    if !csv_path.exists() {
        bail!("{} does not exist", csv_path.display());
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open {}", csv_path.display()))?;

    // The fixed parents of every section category, ensured once per run.
    let root_id = cms
        .ensure_category(&config.import.root_category, None)
        .await?;
    let conference_id = cms
        .ensure_category(&config.import.conference, Some(root_id))
        .await?;

    let mut section: Option<Section> = None;
    let mut sections = 0u64;
    let mut created = 0u64;
    let mut updated = 0u64;
    let mut unverified = 0u64;

    for (idx, result) in reader.records().enumerate() {
        let row_no = idx + 1;
        let record = result.with_context(|| format!("Failed to parse CSV row {}", row_no))?;
        let kind = match rows::classify(&record).with_context(|| format!("CSV row {}", row_no))? {
            Some(kind) => kind,
            None => continue,
        };

        match kind {
            RowKind::Section(label) => {
                let category_id = cms.ensure_category(&label, Some(conference_id)).await?;
                println!("New section: {}", label);
                section = Some(Section {
                    name: label,
                    category_id,
                });
                sections += 1;
            }
            RowKind::Content(row) => {
                let Some(sec) = section.as_ref() else {
                    bail!(
                        "row {} ('{}') appears before any section marker; \
                         the manifest must open with a section row",
                        row_no,
                        row.title
                    );
                };

                let slug = slugify(&row.title);
                println!("Processing {} (section: {})", row.title, sec.name);

                let existing = cms.find_record_by_slug(&slug).await?;
                if let Some(id) = existing {
                    println!("Record already exists, updating in place (id {})", id);
                }

                let stored = ensure_stored(
                    store,
                    fetcher,
                    &config.storage.key_prefix,
                    &row.source,
                    Some(&slug),
                )
                .await?;
                if !stored.verified {
                    unverified += 1;
                }

                let fields = RecordFields {
                    id: existing,
                    title: row.title.clone(),
                    slug,
                    body: markup::append_embed(&row.body, &stored.url),
                    status: "publish".to_string(),
                    categories: vec![root_id, conference_id, sec.category_id],
                };

                let record_id = cms
                    .upsert_record(&fields)
                    .await
                    .with_context(|| format!("Failed to upsert record '{}'", row.title))?;

                if let Some(series) = markup::series_tag(&row.title) {
                    cms.set_tags(record_id, &[series]).await?;
                }

                cms.set_metadata(record_id, "video_duration", &row.duration).await?;
                cms.set_metadata(record_id, "video_size", &row.size).await?;
                cms.set_metadata(record_id, "video_source_url", &row.source).await?;
                cms.set_metadata(record_id, "video_url", &stored.url).await?;

                if existing.is_some() {
                    updated += 1;
                } else {
                    created += 1;
                }
            }
        }
    }

    println!("import {}", csv_path.display());
    println!("  sections: {}", sections);
    println!("  records created: {}", created);
    println!("  records updated: {}", updated);
    if unverified > 0 {
        println!("  unverified uploads: {}", unverified);
    }
    println!("ok");

    Ok(())
}
