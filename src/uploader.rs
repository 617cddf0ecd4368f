//! Storage uploader.
//!
//! `ensure_stored` is the idempotent half of the import: it derives the
//! object key for a row's video, checks whether the object is already in the
//! bucket, and only then transfers anything. Remote sources are downloaded
//! to a temp file first; a same-named temp file left by an interrupted run
//! is reused as-is (a filename-based resume heuristic, not content-verified).
//!
//! Transfer failures (download or upload) do not abort the run: the row
//! proceeds with the object's would-be public URL flagged as unverified, and
//! the temp file is kept so the next run can resume. Existence-check
//! failures and missing local source files are hard errors.

use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::models::StoredObject;
use crate::slug::{derive_storage_key, desired_stem};
use crate::traits::{MediaFetcher, ObjectStore};

/// Ensure the video at `source_path` is present in the bucket under the
/// derived key, returning its public URL.
pub async fn ensure_stored(
    store: &dyn ObjectStore,
    fetcher: &dyn MediaFetcher,
    key_prefix: &str,
    source_path: &str,
    desired_filename: Option<&str>,
) -> Result<StoredObject> {
    let key = derive_storage_key(key_prefix, source_path, desired_filename);
    let url = store.public_url(&key);

    println!("{}: determining whether upload is needed...", key);
    if store.exists(&key).await? {
        println!("{}: object already exists, nothing to do", key);
        return Ok(StoredObject { url, verified: true });
    }

    let (local_path, downloaded) = if is_remote(source_path) {
        let dest = temp_download_path(source_path, desired_filename);
        if dest.exists() {
            println!(
                "{}: temporary file exists from a previous run, nothing to download",
                key
            );
        } else {
            println!("{}: downloading a local copy of the object...", key);
            if let Err(e) = fetcher.download(source_path, &dest).await {
                eprintln!(
                    "Warning: download of {} failed: {:#}; continuing with unverified URL",
                    source_path, e
                );
                return Ok(StoredObject {
                    url,
                    verified: false,
                });
            }
            println!("{}: download complete", key);
        }
        (dest, true)
    } else {
        let path = PathBuf::from(source_path);
        if !path.exists() {
            bail!("source file {} does not exist", source_path);
        }
        (path, false)
    };

    println!("{}: uploading...", key);
    if let Err(e) = store.put_public(&key, &local_path).await {
        // Temp file is deliberately kept so the next run can resume.
        eprintln!(
            "Warning: upload of {} failed: {:#}; continuing with unverified URL",
            key, e
        );
        return Ok(StoredObject {
            url,
            verified: false,
        });
    }

    if downloaded {
        if let Err(e) = std::fs::remove_file(&local_path) {
            eprintln!(
                "Warning: could not remove temp file {}: {}",
                local_path.display(),
                e
            );
        }
    }

    println!("{}: upload complete", key);
    Ok(StoredObject { url, verified: true })
}

/// Where a remote source is downloaded to before upload.
///
/// Named after the desired filename's stem, matching the resume heuristic:
/// an interrupted run leaves this file behind and the next run picks it up.
fn temp_download_path(source_path: &str, desired_filename: Option<&str>) -> PathBuf {
    std::env::temp_dir().join(desired_stem(source_path, desired_filename))
}

/// Whether the source path is a remote URL rather than a local file.
fn is_remote(source_path: &str) -> bool {
    matches!(
        url::Url::parse(source_path).map(|u| u.scheme().to_string()),
        Ok(scheme) if scheme == "http" || scheme == "https"
    )
}
